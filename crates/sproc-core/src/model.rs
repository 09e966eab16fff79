use serde::{Deserialize, Serialize};

pub const NEVER_EXECUTED: &str = "Never executed";

/// One stored procedure as produced by a schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub name: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default = "default_last_execution_time")]
    pub last_execution_time: String,
}

fn default_last_execution_time() -> String {
    NEVER_EXECUTED.to_string()
}

impl ProcedureRecord {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: Some(definition.into()),
            last_execution_time: default_last_execution_time(),
        }
    }

    /// SQL text of the routine; a null definition reads as empty.
    pub fn definition_text(&self) -> &str {
        self.definition.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityResult {
    pub complexity: u32,
    pub lines_of_code: usize,
    pub complexity_factors: String,
}

/// Per-procedure record merged from scoring, summary and optional technical analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub sp_name: String,
    pub summary: String,
    pub complexity: u32,
    pub lines_of_code: usize,
    pub complexity_factors: String,
    pub last_execution_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_analysis: Option<String>,
}

impl CombinedRecord {
    pub fn assemble(
        proc: &ProcedureRecord,
        summary: String,
        result: ComplexityResult,
        technical_analysis: Option<String>,
    ) -> Self {
        Self {
            sp_name: proc.name.clone(),
            summary,
            complexity: result.complexity,
            lines_of_code: result.lines_of_code,
            complexity_factors: result.complexity_factors,
            last_execution_time: proc.last_execution_time.clone(),
            technical_analysis,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub cached: bool,
    #[serde(default)]
    pub meta: serde_json::Value,
}
