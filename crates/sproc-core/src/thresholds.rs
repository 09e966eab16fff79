use serde::{Deserialize, Serialize};

/// Procedures scoring above this are flagged for refactoring review.
pub const DEFAULT_REFACTOR_ABOVE: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refactor_above: Option<u32>,
}

impl ThresholdConfig {
    pub fn refactor_above(&self) -> u32 {
        self.refactor_above.unwrap_or(DEFAULT_REFACTOR_ABOVE)
    }

    /// Strictly greater than the threshold; a score equal to it is not flagged.
    pub fn needs_refactoring(&self, complexity: u32) -> bool {
        complexity > self.refactor_above()
    }
}
