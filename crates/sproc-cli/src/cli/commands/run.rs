use crate::cli::args::RunArgs;
use sproc_core::analysis::{LlmCollaborator, LlmSummarizer, LlmTechnicalAnalyzer};
use sproc_core::catalog::ProcedureCatalog;
use sproc_core::config::{load_config, AnalyzerConfig};
use sproc_core::engine::{RunArtifacts, RunPolicy, Runner};
use sproc_core::errors::is_config_error;
use sproc_core::providers::{llm::build_client, schema::build_source};
use sproc_core::report::{console, csv, document};
use sproc_core::storage::{llm_cache::LlmCache, Store};
use sproc_core::tickets::{file_tickets, jira::JiraClient};
use std::sync::Arc;
use std::time::Duration;

use super::exit_codes;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, args.strict_config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let client = match build_client(&cfg.llm, args.provider.as_deref()) {
        Ok(c) => c,
        Err(e) if is_config_error(&e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
        Err(e) => return Err(e),
    };

    let source = build_source(&cfg.source);
    tracing::info!(event = "sproc.run.start", source = %source.describe(), provider = client.provider_name());
    let catalog = ProcedureCatalog::from_records(source.extract()?);
    if catalog.is_empty() {
        eprintln!("no procedures found in {}", source.describe());
    }

    let store = if cfg.settings.cache_enabled() && !args.no_cache {
        let store = Store::open(&cfg.settings.cache_db())?;
        store.init_schema()?;
        Some(store)
    } else {
        None
    };
    let run_id = match &store {
        Some(s) => Some(s.create_run(&source.describe())?),
        None => None,
    };

    let mut collab = LlmCollaborator::new(client, Duration::from_secs(cfg.llm.timeout_seconds));
    if let Some(s) = &store {
        collab = collab.with_cache(LlmCache::new(s.clone()));
    }

    let runner = Runner::new(
        Arc::new(LlmSummarizer::new(collab.clone())),
        Arc::new(LlmTechnicalAnalyzer::new(collab)),
        RunPolicy {
            on_error: cfg.settings.on_error,
            thresholds: cfg.thresholds.clone(),
            parallel: cfg.settings.parallel(),
        },
    );

    let artifacts = match runner.run(&catalog).await {
        Ok(a) => a,
        Err(e) => {
            finalize(store.as_ref(), run_id, "aborted", 0, 0);
            return Err(e);
        }
    };

    if let Err(e) = write_reports(&cfg, &artifacts) {
        finalize(
            store.as_ref(),
            run_id,
            "failed",
            artifacts.records.len(),
            artifacts.flagged_count(),
        );
        return Err(e);
    }
    console::print_summary(&artifacts);

    if args.create_tickets || cfg.tickets.enabled {
        create_tickets(&cfg, &artifacts).await;
    }

    let flagged = artifacts.flagged_count();
    finalize(
        store.as_ref(),
        run_id,
        "completed",
        artifacts.records.len(),
        flagged,
    );

    Ok(if args.fail_on_flagged && flagged > 0 {
        exit_codes::FLAGGED
    } else {
        exit_codes::OK
    })
}

/// Records the run outcome. A bookkeeping failure never changes the exit code.
fn finalize(
    store: Option<&Store>,
    run_id: Option<i64>,
    status: &str,
    procedures: usize,
    flagged: usize,
) {
    let (Some(store), Some(id)) = (store, run_id) else {
        return;
    };
    if let Err(e) = store.finalize_run(id, status, procedures, flagged) {
        tracing::warn!(event = "sproc.run.finalize_failed", run_id = id, status, error = %e);
    }
}

fn write_reports(cfg: &AnalyzerConfig, artifacts: &RunArtifacts) -> anyhow::Result<()> {
    let csv_path = cfg.output.csv_path();
    csv::write_csv(&artifacts.records, &csv_path)?;
    eprintln!("wrote {}", csv_path.display());

    let doc_path = cfg.output.document_path();
    document::write_document(&artifacts.records, artifacts.refactor_above, &doc_path)?;
    eprintln!("wrote {}", doc_path.display());
    Ok(())
}

async fn create_tickets(cfg: &AnalyzerConfig, artifacts: &RunArtifacts) {
    let jira = match JiraClient::from_env() {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(event = "sproc.ticket.disabled", error = %e, "skipping ticket creation");
            eprintln!("warning: tickets not created: {}", e);
            return;
        }
    };

    for outcome in file_tickets(&jira, artifacts, &cfg.tickets).await {
        match outcome.result {
            Ok(key) => eprintln!("ticket {} created for {}", key, outcome.procedure),
            Err(e) => eprintln!("warning: ticket for {} failed: {}", outcome.procedure, e),
        }
    }
}
