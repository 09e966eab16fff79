use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorReport {
    pub schema_version: u32,
    pub generated_at: String,
    pub sproc_version: String,
    pub platform: PlatformInfo,

    pub inputs: DoctorInputs,
    pub config: Option<ConfigSummary>,
    pub source: Option<SourceSummary>,
    pub env: EnvSummary,
    pub output: OutputSummary,
    pub cache: Option<CacheSummary>,

    pub diagnostics: Vec<Diagnostic>,
    pub suggested_actions: Vec<SuggestedAction>,
}

impl DoctorReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorInputs {
    pub config_path: String,
    pub config_exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub version: u32,
    pub source_type: String,
    pub source_path: String,
    pub provider: String,
    pub model: String,
    pub refactor_above: u32,
    pub parallel: usize,
    pub on_error: String,
    pub tickets_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub description: String,
    pub reachable: bool,
    pub procedures: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvSummary {
    pub openai_api_key: bool,
    pub jira_server: bool,
    pub jira_user: bool,
    pub jira_token: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSummary {
    pub dir: String,
    pub writable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSummary {
    pub path: String,
    pub size_bytes: Option<u64>,
    pub runs: u64,
    pub cached_responses: u64,
    pub last_run_id: Option<i64>,
    pub last_run_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warn(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warn,
            message: message.into(),
        }
    }
}

pub mod codes {
    pub const E_CFG_PARSE: &str = "E_CFG_PARSE";
    pub const E_SOURCE_UNREACHABLE: &str = "E_SOURCE_UNREACHABLE";
    pub const W_SOURCE_EMPTY: &str = "W_SOURCE_EMPTY";
    pub const E_API_KEY_MISSING: &str = "E_API_KEY_MISSING";
    pub const W_JIRA_ENV_MISSING: &str = "W_JIRA_ENV_MISSING";
    pub const E_OUTPUT_NOT_WRITABLE: &str = "E_OUTPUT_NOT_WRITABLE";
    pub const W_CACHE_UNREADABLE: &str = "W_CACHE_UNREADABLE";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub title: String,
    pub relates_to: String,
    pub why: String,
    pub steps: Vec<String>,
}
