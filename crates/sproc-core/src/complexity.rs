//! Static complexity heuristic for stored procedure source.
//!
//! Keyword detection is a case-insensitive substring search over the whole
//! definition. It is not tokenized: a keyword inside an identifier, comment or
//! string literal still counts (`EXECUTIVE_ID` triggers the `EXEC` rule).

use crate::model::{ComplexityResult, ProcedureRecord};

pub const MAX_COMPLEXITY: u32 = 10;
pub const LINES_PER_POINT: f64 = 20.0;
pub const LARGE_PROCEDURE_LINES: usize = 100;
pub const MEDIUM_PROCEDURE_LINES: usize = 50;

/// Only reachable if the size bucket ever becomes conditional; today every
/// score carries exactly one size factor, so this string is never emitted.
pub const SIMPLE_PROCEDURE_FACTOR: &str = "Simple procedure with basic operations";

const FACTOR_SEPARATOR: &str = "; ";

/// Multiplier applied to the size-derived score. At most one applies; CURSOR wins over JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Cursor,
    Join,
    Plain,
}

impl Weight {
    pub fn detect(upper: &str) -> Self {
        if upper.contains("CURSOR") {
            Weight::Cursor
        } else if upper.contains("JOIN") {
            Weight::Join
        } else {
            Weight::Plain
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Weight::Cursor => 2.0,
            Weight::Join => 1.5,
            Weight::Plain => 1.0,
        }
    }

    pub fn factor(&self) -> Option<&'static str> {
        match self {
            Weight::Cursor => Some("Contains CURSOR (2x multiplier)"),
            Weight::Join => Some("Contains JOIN operations (1.5x multiplier)"),
            Weight::Plain => None,
        }
    }
}

struct Rule {
    factor: &'static str,
    applies: fn(&str) -> bool,
}

// Evaluation order is part of the output format.
const RULES: &[Rule] = &[
    Rule {
        factor: "Contains loops",
        applies: |s| s.contains("WHILE") || s.contains("LOOP"),
    },
    Rule {
        factor: "Contains conditional logic",
        applies: |s| s.contains("IF") || s.contains("CASE"),
    },
    Rule {
        factor: "Contains error handling",
        applies: |s| s.contains("TRY") && s.contains("CATCH"),
    },
    Rule {
        factor: "Contains transaction management",
        applies: |s| s.contains("TRANSACTION") || s.contains("BEGIN TRAN"),
    },
    Rule {
        factor: "Calls other procedures/functions",
        applies: |s| s.contains("EXEC") || s.contains("EXECUTE"),
    },
    Rule {
        factor: "Creates database objects",
        applies: |s| s.contains("CREATE") && (s.contains("TABLE") || s.contains("VIEW")),
    },
];

/// Scores one procedure. Total over all input, including empty text.
pub fn score(_name: &str, definition: &str) -> ComplexityResult {
    let upper = definition.to_uppercase();
    let lines = definition.matches('\n').count();

    let mut factors: Vec<String> = Vec::new();

    let weight = Weight::detect(&upper);
    if let Some(f) = weight.factor() {
        factors.push(f.to_string());
    }

    for rule in RULES {
        if (rule.applies)(&upper) {
            factors.push(rule.factor.to_string());
        }
    }

    factors.push(size_factor(lines));

    ComplexityResult {
        complexity: weighted_score(lines, weight),
        lines_of_code: lines,
        complexity_factors: explain(&factors),
    }
}

pub fn score_record(proc: &ProcedureRecord) -> ComplexityResult {
    score(&proc.name, proc.definition_text())
}

/// `min(10, trunc((lines / 20) * weight))`; truncates, never rounds.
pub fn weighted_score(lines: usize, weight: Weight) -> u32 {
    let raw = (lines as f64 / LINES_PER_POINT) * weight.multiplier();
    (raw.trunc() as u32).min(MAX_COMPLEXITY)
}

fn size_factor(lines: usize) -> String {
    if lines > LARGE_PROCEDURE_LINES {
        format!("Large procedure ({} lines)", lines)
    } else if lines > MEDIUM_PROCEDURE_LINES {
        format!("Medium-sized procedure ({} lines)", lines)
    } else {
        format!("Small procedure ({} lines)", lines)
    }
}

pub fn explain(factors: &[String]) -> String {
    if factors.is_empty() {
        SIMPLE_PROCEDURE_FACTOR.to_string()
    } else {
        factors.join(FACTOR_SEPARATOR)
    }
}

/// Splits a joined factor string back into its parts.
pub fn split_factors(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(FACTOR_SEPARATOR).filter(|s| !s.is_empty())
}
