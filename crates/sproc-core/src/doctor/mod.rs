pub mod model;

use chrono::Utc;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::{load_config, AnalyzerConfig, SourceKind};
use crate::providers::llm::openai::API_KEY_ENV;
use crate::providers::schema::{build_source, sqlite::SqliteCatalog};
use crate::storage::Store;
use crate::tickets::jira::{SERVER_ENV, TOKEN_ENV, USER_ENV};

use model::*;

#[derive(Debug, Clone)]
pub struct DoctorOptions {
    pub config_path: PathBuf,
    pub strict: bool,
}

/// Collects a troubleshooting report. Individual checks are best-effort and
/// land in `diagnostics`; only unexpected failures return `Err`.
pub fn doctor(opts: &DoctorOptions) -> anyhow::Result<DoctorReport> {
    let mut diagnostics = vec![];
    let config_exists = opts.config_path.exists();

    let cfg = match load_config(&opts.config_path, opts.strict) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            diagnostics.push(Diagnostic::error(codes::E_CFG_PARSE, e.to_string()));
            None
        }
    };

    let env = summarize_env();
    let source = cfg.as_ref().map(|c| summarize_source(c, &mut diagnostics));
    let output = match &cfg {
        Some(c) => summarize_output(&c.output.dir, &mut diagnostics),
        None => OutputSummary {
            dir: String::new(),
            writable: false,
        },
    };
    let cache = cfg
        .as_ref()
        .filter(|c| c.settings.cache_enabled())
        .and_then(|c| summarize_cache(&c.settings.cache_db(), &mut diagnostics));

    if let Some(c) = &cfg {
        if c.llm.provider == "openai" && !env.openai_api_key {
            diagnostics.push(Diagnostic::error(
                codes::E_API_KEY_MISSING,
                format!("{} is not set (required for provider 'openai')", API_KEY_ENV),
            ));
        }
        if c.tickets.enabled && !(env.jira_server && env.jira_user && env.jira_token) {
            diagnostics.push(Diagnostic::warn(
                codes::W_JIRA_ENV_MISSING,
                format!(
                    "tickets are enabled but {}, {} or {} is not set",
                    SERVER_ENV, USER_ENV, TOKEN_ENV
                ),
            ));
        }
    }

    let suggested_actions = suggest_from(&diagnostics);

    Ok(DoctorReport {
        schema_version: 1,
        generated_at: Utc::now().to_rfc3339(),
        sproc_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        inputs: DoctorInputs {
            config_path: opts.config_path.display().to_string(),
            config_exists,
        },
        config: cfg.as_ref().map(summarize_config),
        source,
        env,
        output,
        cache,
        diagnostics,
        suggested_actions,
    })
}

fn summarize_config(cfg: &AnalyzerConfig) -> ConfigSummary {
    ConfigSummary {
        version: cfg.version,
        source_type: source_type(cfg.source.kind).to_string(),
        source_path: cfg.source.path.display().to_string(),
        provider: cfg.llm.provider.clone(),
        model: cfg.llm.model.clone(),
        refactor_above: cfg.thresholds.refactor_above(),
        parallel: cfg.settings.parallel(),
        on_error: if cfg.settings.on_error.aborts_on_error() {
            "abort".into()
        } else {
            "fallback".into()
        },
        tickets_enabled: cfg.tickets.enabled,
    }
}

fn source_type(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Sqlite => "sqlite",
        SourceKind::Directory => "directory",
        SourceKind::Manifest => "manifest",
    }
}

fn summarize_source(cfg: &AnalyzerConfig, diags: &mut Vec<Diagnostic>) -> SourceSummary {
    let source = build_source(&cfg.source);
    // sqlite can be counted without pulling every definition
    let counted = match cfg.source.kind {
        SourceKind::Sqlite => SqliteCatalog::new(cfg.source.path.clone()).count_procedures(),
        _ => source.extract().map(|r| r.len() as u64),
    };

    match counted {
        Ok(n) => {
            if n == 0 {
                diags.push(Diagnostic::warn(
                    codes::W_SOURCE_EMPTY,
                    format!("{} contains no procedures", source.describe()),
                ));
            }
            SourceSummary {
                description: source.describe(),
                reachable: true,
                procedures: Some(n),
            }
        }
        Err(e) => {
            diags.push(Diagnostic::error(
                codes::E_SOURCE_UNREACHABLE,
                format!("{}: {}", source.describe(), e),
            ));
            SourceSummary {
                description: source.describe(),
                reachable: false,
                procedures: None,
            }
        }
    }
}

fn summarize_env() -> EnvSummary {
    let set = |k: &str| std::env::var(k).map(|v| !v.is_empty()).unwrap_or(false);
    EnvSummary {
        openai_api_key: set(API_KEY_ENV),
        jira_server: set(SERVER_ENV),
        jira_user: set(USER_ENV),
        jira_token: set(TOKEN_ENV),
    }
}

fn summarize_output(dir: &Path, diags: &mut Vec<Diagnostic>) -> OutputSummary {
    let writable = match check_writable(dir) {
        Ok(()) => true,
        Err(e) => {
            diags.push(Diagnostic::error(
                codes::E_OUTPUT_NOT_WRITABLE,
                format!("{}: {}", dir.display(), e),
            ));
            false
        }
    };
    OutputSummary {
        dir: dir.display().to_string(),
        writable,
    }
}

fn check_writable(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let marker = dir.join(".sproc-doctor-write-check");
    std::fs::write(&marker, b"ok")?;
    std::fs::remove_file(&marker)
}

fn summarize_cache(path: &Path, diags: &mut Vec<Diagnostic>) -> Option<CacheSummary> {
    // don't create a cache db just to report on it
    if !path.exists() {
        return None;
    }
    let size_bytes = std::fs::metadata(path).ok().map(|m| m.len());
    let stats = Store::open(path).and_then(|s| {
        s.init_schema()?;
        s.stats()
    });
    match stats {
        Ok(stats) => Some(CacheSummary {
            path: path.display().to_string(),
            size_bytes,
            runs: stats.runs,
            cached_responses: stats.cached_responses,
            last_run_id: stats.last_run_id,
            last_run_at: stats.last_run_at,
        }),
        Err(e) => {
            diags.push(Diagnostic::warn(
                codes::W_CACHE_UNREADABLE,
                format!("{}: {}", path.display(), e),
            ));
            None
        }
    }
}

fn suggest_from(diags: &[Diagnostic]) -> Vec<SuggestedAction> {
    let mut out = vec![];
    let has = |code: &str| diags.iter().any(|d| d.code == code);

    if has(codes::E_CFG_PARSE) {
        out.push(SuggestedAction {
            title: "Fix or create the config file".into(),
            relates_to: codes::E_CFG_PARSE.into(),
            why: "Every command except `score` needs a readable sproc.yaml.".into(),
            steps: vec![
                "Run: sproc init --config sproc.yaml".into(),
                "Edit source.path to point at your catalog.".into(),
            ],
        });
    }

    if has(codes::E_SOURCE_UNREACHABLE) {
        out.push(SuggestedAction {
            title: "Make the procedure source reachable".into(),
            relates_to: codes::E_SOURCE_UNREACHABLE.into(),
            why: "Procedures are read from source.path before any analysis runs.".into(),
            steps: vec![
                "Check source.type (sqlite|directory|manifest) matches source.path.".into(),
                "Or set SPROC_CATALOG to the catalog location.".into(),
            ],
        });
    }

    if has(codes::E_API_KEY_MISSING) {
        out.push(SuggestedAction {
            title: "Provide an OpenAI API key".into(),
            relates_to: codes::E_API_KEY_MISSING.into(),
            why: "Summaries and technical analysis call the configured LLM provider.".into(),
            steps: vec![
                "Add OPENAI_API_KEY=... to config/settings.env".into(),
                "Or run offline: sproc run --provider fake".into(),
            ],
        });
    }

    if has(codes::W_JIRA_ENV_MISSING) {
        out.push(SuggestedAction {
            title: "Configure Jira credentials".into(),
            relates_to: codes::W_JIRA_ENV_MISSING.into(),
            why: "Ticket creation authenticates with basic auth against JIRA_SERVER.".into(),
            steps: vec!["Set JIRA_SERVER, JIRA_USER and JIRA_TOKEN in config/settings.env".into()],
        });
    }

    if has(codes::E_OUTPUT_NOT_WRITABLE) {
        out.push(SuggestedAction {
            title: "Choose a writable output directory".into(),
            relates_to: codes::E_OUTPUT_NOT_WRITABLE.into(),
            why: "The CSV and review document are written to output.dir.".into(),
            steps: vec!["Change output.dir in sproc.yaml".into()],
        });
    }

    out
}

pub fn render_text(report: &DoctorReport) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "sproc doctor {} ({}/{})",
        report.sproc_version, report.platform.os, report.platform.arch
    );
    let _ = writeln!(
        s,
        "config: {}{}",
        report.inputs.config_path,
        if report.inputs.config_exists { "" } else { " (missing)" }
    );

    if let Some(c) = &report.config {
        let _ = writeln!(
            s,
            "  provider={} model={} refactor_above={} parallel={} on_error={}",
            c.provider, c.model, c.refactor_above, c.parallel, c.on_error
        );
    }

    if let Some(src) = &report.source {
        match src.procedures {
            Some(n) => {
                let _ = writeln!(s, "source: {} ({} procedures)", src.description, n);
            }
            None => {
                let _ = writeln!(s, "source: {} (unreachable)", src.description);
            }
        }
    }

    let flag = |b: bool| if b { "set" } else { "missing" };
    let _ = writeln!(
        s,
        "env: OPENAI_API_KEY {}, JIRA_SERVER {}, JIRA_USER {}, JIRA_TOKEN {}",
        flag(report.env.openai_api_key),
        flag(report.env.jira_server),
        flag(report.env.jira_user),
        flag(report.env.jira_token)
    );

    if !report.output.dir.is_empty() {
        let _ = writeln!(
            s,
            "output: {} ({})",
            report.output.dir,
            if report.output.writable { "writable" } else { "not writable" }
        );
    }

    if let Some(c) = &report.cache {
        let _ = writeln!(
            s,
            "cache: {} ({} runs, {} cached responses)",
            c.path, c.runs, c.cached_responses
        );
    }

    if report.diagnostics.is_empty() {
        s.push_str("\nNo problems found.\n");
    } else {
        s.push_str("\nDiagnostics:\n");
        for d in &report.diagnostics {
            let sev = match d.severity {
                Severity::Error => "error",
                Severity::Warn => "warn",
            };
            let _ = writeln!(s, "  [{}] {}: {}", sev, d.code, d.message);
        }
    }

    for a in &report.suggested_actions {
        let _ = writeln!(s, "\n> {}\n  {}", a.title, a.why);
        for step in &a.steps {
            let _ = writeln!(s, "  - {}", step);
        }
    }

    s
}
