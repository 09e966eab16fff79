// on_error.rs - Collaborator failure policy
//
// Decides what happens when the summarizer or the technical analyzer fails
// for one procedure.

use serde::{Deserialize, Serialize};

/// Error handling policy for LLM collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Substitute a fallback text and keep processing the remaining procedures (default)
    #[default]
    Fallback,

    /// Stop the run on the first collaborator failure
    Abort,
}

impl ErrorPolicy {
    pub fn aborts_on_error(&self) -> bool {
        matches!(self, ErrorPolicy::Abort)
    }

    /// Apply the policy to a failed call. `fallback` is the text used when the run continues.
    pub fn apply_to_error(&self, error: &anyhow::Error, fallback: String) -> ErrorPolicyResult {
        match self {
            ErrorPolicy::Abort => ErrorPolicyResult::Aborted {
                reason: format!("collaborator error (abort): {}", error),
            },
            ErrorPolicy::Fallback => ErrorPolicyResult::Substituted { text: fallback },
        }
    }
}

#[derive(Debug, Clone)]
pub enum ErrorPolicyResult {
    Aborted { reason: String },
    Substituted { text: String },
}

impl ErrorPolicyResult {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ErrorPolicyResult::Aborted { .. })
    }

    pub fn into_result(self) -> anyhow::Result<String> {
        match self {
            ErrorPolicyResult::Aborted { reason } => Err(anyhow::anyhow!(reason)),
            ErrorPolicyResult::Substituted { text } => Ok(text),
        }
    }
}

/// Structured audit event for a substituted collaborator result.
pub fn log_fallback(stage: &str, procedure: &str, error: &anyhow::Error) {
    tracing::warn!(
        event = "sproc.fallback.used",
        stage = %stage,
        procedure = %procedure,
        error = %error,
        "{} failed for {}, using fallback text", stage, procedure
    );
}
