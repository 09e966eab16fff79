pub const REVERSE_ENGINEER_PROMPT: &str = r#"You are a business analyst explaining database procedures to functional users. Analyze this stored procedure:

Stored Procedure: {name}

SQL Code:
{code}

Provide a concise 3-sentence summary for a moderately technical functional reader covering:
1. The business function this procedure serves
2. The data it reads or produces
3. Key business rules it applies

Stay business-focused and avoid SQL details.
"#;

pub const TECHNICAL_ANALYSIS_PROMPT: &str = r#"You are a senior database engineer reviewing a stored procedure flagged for refactoring.

Stored Procedure: {name}
Complexity Score: {complexity}/10

SQL Code:
{code}

Provide a technical analysis covering:
1. The main sources of complexity (cursors, loops, nested conditionals, dynamic SQL)
2. Performance and maintainability risks
3. Concrete refactoring recommendations, most valuable first

Be specific and reference the constructs you see in the code.
"#;

pub fn render_summary_prompt(name: &str, code: &str) -> String {
    REVERSE_ENGINEER_PROMPT
        .replace("{name}", name)
        .replace("{code}", code)
}

pub fn render_technical_prompt(name: &str, code: &str, complexity: u32) -> String {
    // {code} last so placeholders inside the SQL text are left alone
    TECHNICAL_ANALYSIS_PROMPT
        .replace("{name}", name)
        .replace("{complexity}", &complexity.to_string())
        .replace("{code}", code)
}
