use sproc_core::analysis::{LlmCollaborator, LlmSummarizer, LlmTechnicalAnalyzer};
use sproc_core::catalog::ProcedureCatalog;
use sproc_core::config::parse_config;
use sproc_core::engine::{RunPolicy, Runner};
use sproc_core::model::ProcedureRecord;
use sproc_core::providers::llm::build_client;
use sproc_core::providers::schema::build_source;
use sproc_core::providers::schema::sqlite::seed_catalog;
use sproc_core::report::{csv::write_csv, document::write_document};
use sproc_core::storage::llm_cache::LlmCache;
use sproc_core::storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn cursor_proc() -> String {
    let mut s = String::from("CREATE PROCEDURE usp_Post AS\nDECLARE c CURSOR FOR SELECT id FROM t\n");
    s.push_str("WHILE @@FETCH_STATUS = 0\nBEGIN\n");
    for i in 0..100 {
        s.push_str(&format!("  UPDATE t SET v = {} WHERE id = @id\n", i));
    }
    s.push_str("END\n");
    s
}

#[tokio::test]
async fn sqlite_catalog_to_reports_offline() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("catalog.db");
    {
        let conn = rusqlite::Connection::open(&db)?;
        let mut executed = ProcedureRecord::new("usp_Lookup", "SELECT name FROM customers");
        executed.last_execution_time = "2024-03-01 12:00:00".into();
        seed_catalog(&conn, &[ProcedureRecord::new("usp_Post", cursor_proc()), executed])?;
    }

    let cfg = parse_config(
        &format!(
            "version: 1\nsource:\n  type: sqlite\n  path: {}\nllm:\n  provider: fake\n  model: m1\n",
            db.display()
        ),
        true,
    )?;

    let records = build_source(&cfg.source).extract()?;
    let catalog = ProcedureCatalog::from_records(records);
    assert_eq!(catalog.len(), 2);

    let client = build_client(&cfg.llm, None)?;
    let store = Store::open(&dir.path().join(".sproc/cache.db"))?;
    store.init_schema()?;
    let collab = LlmCollaborator::new(client, Duration::from_secs(5))
        .with_cache(LlmCache::new(store.clone()));

    let runner = Runner::new(
        Arc::new(LlmSummarizer::new(collab.clone())),
        Arc::new(LlmTechnicalAnalyzer::new(collab)),
        RunPolicy::default(),
    );
    let artifacts = runner.run(&catalog).await?;

    // ordered by name
    assert_eq!(artifacts.records[0].sp_name, "usp_Lookup");
    assert_eq!(artifacts.records[0].last_execution_time, "2024-03-01 12:00:00");
    assert_eq!(artifacts.records[1].sp_name, "usp_Post");
    assert_eq!(artifacts.records[1].complexity, 10);
    assert!(artifacts.records[1]
        .complexity_factors
        .starts_with("Contains CURSOR (2x multiplier); Contains loops; "));
    assert!(artifacts.records[1].summary.contains("usp_Post"));

    let csv_path = dir.path().join("outputs/analysis.csv");
    write_csv(&artifacts.records, &csv_path)?;
    let csv_text = std::fs::read_to_string(&csv_path)?;
    let mut lines = csv_text.lines();
    assert_eq!(
        lines.next(),
        Some("sp_name,summary,complexity,lines_of_code,complexity_factors,last_execution_time")
    );
    assert_eq!(csv_text.lines().count(), 3);

    let doc_path = dir.path().join("outputs/summary.md");
    let flagged = write_document(&artifacts.records, artifacts.refactor_above, &doc_path)?;
    assert_eq!(flagged, 1);
    let doc = std::fs::read_to_string(&doc_path)?;
    assert!(doc.contains("## usp_Post"));
    assert!(!doc.contains("## usp_Lookup"));
    assert!(doc.contains("1 of 2 procedures flagged for refactoring (50.0%)"));

    // summaries for both + technical analysis for the flagged one
    assert_eq!(store.stats()?.cached_responses, 3);
    Ok(())
}
