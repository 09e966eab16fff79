use crate::errors::ConfigError;
use crate::on_error::ErrorPolicy;
use crate::thresholds::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const CATALOG_ENV: &str = "SPROC_CATALOG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tickets: TicketConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Sqlite,
    Directory,
    Manifest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: default_source_path(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("catalog.db")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_seconds() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_db: Option<PathBuf>,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Settings {
    pub fn parallel(&self) -> usize {
        self.parallel.unwrap_or(1).max(1)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.unwrap_or(true)
    }

    pub fn cache_db(&self) -> PathBuf {
        self.cache_db
            .clone()
            .unwrap_or_else(|| PathBuf::from(".sproc/cache.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_csv_name")]
    pub csv: String,
    #[serde(default = "default_document_name")]
    pub document: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            csv: default_csv_name(),
            document: default_document_name(),
        }
    }
}

impl OutputConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(&self.csv)
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(&self.document)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_csv_name() -> String {
    "analysis.csv".to_string()
}

fn default_document_name() -> String {
    "summary.md".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project: default_project(),
            issue_type: default_issue_type(),
        }
    }
}

fn default_project() -> String {
    "APP".to_string()
}

fn default_issue_type() -> String {
    "Story".to_string()
}

pub fn load_config(path: &Path, strict: bool) -> Result<AnalyzerConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut cfg = parse_config(&raw, strict)
        .map_err(|ConfigError(msg)| ConfigError(format!("{} (file: {})", msg, path.display())))?;

    let r = path_resolver::PathResolver::new(path);
    r.resolve_in_place(&mut cfg.source.path);
    r.resolve_in_place(&mut cfg.output.dir);
    // the default cache location lives next to the config, like every other path
    cfg.settings.cache_db = Some(r.resolve(&cfg.settings.cache_db()));

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Parses and validates YAML without touching the filesystem.
pub fn parse_config(raw: &str, strict: bool) -> Result<AnalyzerConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: AnalyzerConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // YAML anchors and extension keys are allowed anywhere
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(
            event = "sproc.config.unknown_fields",
            fields = ?meaningful_unknowns,
            "ignored unknown config fields"
        );
    }

    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if cfg.source.path.as_os_str().is_empty() {
        return Err(ConfigError("source.path must not be empty".into()));
    }

    Ok(cfg)
}

pub fn apply_env_overrides(cfg: &mut AnalyzerConfig) {
    if let Ok(v) = std::env::var(CATALOG_ENV) {
        if !v.trim().is_empty() {
            cfg.source.path = PathBuf::from(v);
        }
    }
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
source:
  type: sqlite          # sqlite | directory | manifest
  path: catalog.db
llm:
  provider: openai      # openai | fake
  model: gpt-4
  temperature: 0.0
  timeout_seconds: 60
settings:
  parallel: 1
  cache: true
  on_error: fallback    # fallback | abort
thresholds:
  refactor_above: 3
output:
  dir: outputs
  csv: analysis.csv
  document: summary.md
tickets:
  enabled: false
  project: APP
  issue_type: Story
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
