use async_trait::async_trait;
use sproc_core::analysis::{Summarizer, TechnicalAnalyzer};
use sproc_core::catalog::ProcedureCatalog;
use sproc_core::engine::{RunPolicy, Runner};
use sproc_core::model::ProcedureRecord;
use sproc_core::on_error::ErrorPolicy;
use sproc_core::progress::ProcState;
use sproc_core::thresholds::ThresholdConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubSummarizer {
    fail_on: Option<&'static str>,
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, name: &str, _definition: &str) -> anyhow::Result<String> {
        if self.fail_on == Some(name) {
            anyhow::bail!("rate limited");
        }
        Ok(format!("{} keeps the books balanced.", name))
    }
}

#[derive(Default)]
struct StubAnalyzer {
    calls: AtomicUsize,
}

#[async_trait]
impl TechnicalAnalyzer for StubAnalyzer {
    async fn analyze(&self, name: &str, _definition: &str, complexity: u32) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} ({}/10): split into smaller procedures.", name, complexity))
    }
}

fn lines(n: usize, keywords: &str) -> String {
    let mut s = format!("CREATE PROCEDURE p AS {}\n", keywords);
    for _ in 1..n {
        s.push_str("SELECT 1\n");
    }
    s
}

fn catalog() -> ProcedureCatalog {
    ProcedureCatalog::from_records(vec![
        // 200 plain lines -> 10
        ProcedureRecord::new("usp_Big", lines(200, "")),
        // 60 lines with JOIN -> trunc(3 * 1.5) = 4
        ProcedureRecord::new("usp_Join", lines(60, "INNER JOIN")),
        // 60 plain lines -> 3, not flagged at the default threshold
        ProcedureRecord::new("usp_Edge", lines(60, "")),
        ProcedureRecord::new("usp_Tiny", "SELECT 1"),
    ])
}

fn runner(fail_on: Option<&'static str>, policy: RunPolicy) -> (Runner, Arc<StubAnalyzer>) {
    let analyzer = Arc::new(StubAnalyzer::default());
    let r = Runner::new(
        Arc::new(StubSummarizer { fail_on }),
        analyzer.clone(),
        policy,
    );
    (r, analyzer)
}

#[tokio::test]
async fn records_follow_source_order_and_threshold() -> anyhow::Result<()> {
    let (r, analyzer) = runner(None, RunPolicy::default());
    let artifacts = r.run(&catalog()).await?;

    let names: Vec<_> = artifacts.records.iter().map(|r| r.sp_name.as_str()).collect();
    assert_eq!(names, vec!["usp_Big", "usp_Join", "usp_Edge", "usp_Tiny"]);

    let scores: Vec<_> = artifacts.records.iter().map(|r| r.complexity).collect();
    assert_eq!(scores, vec![10, 4, 3, 0]);

    assert!(artifacts.records[0].technical_analysis.is_some());
    assert!(artifacts.records[1].technical_analysis.is_some());
    assert!(artifacts.records[2].technical_analysis.is_none());
    assert!(artifacts.records[3].technical_analysis.is_none());
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);

    assert_eq!(artifacts.flagged_count(), 2);
    assert_eq!(artifacts.fallbacks, 0);
    assert_eq!(artifacts.records[3].lines_of_code, 0);
    assert_eq!(artifacts.records[3].last_execution_time, "Never executed");
    Ok(())
}

#[tokio::test]
async fn custom_threshold_changes_what_is_flagged() -> anyhow::Result<()> {
    let policy = RunPolicy {
        thresholds: ThresholdConfig {
            refactor_above: Some(2),
        },
        ..RunPolicy::default()
    };
    let (r, analyzer) = runner(None, policy);
    let artifacts = r.run(&catalog()).await?;

    assert_eq!(artifacts.refactor_above, 2);
    assert_eq!(artifacts.flagged_count(), 3);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn summary_failure_falls_back_and_continues() -> anyhow::Result<()> {
    let (r, _) = runner(Some("usp_Join"), RunPolicy::default());
    let artifacts = r.run(&catalog()).await?;

    assert_eq!(artifacts.records.len(), 4);
    assert_eq!(artifacts.fallbacks, 1);
    assert_eq!(
        artifacts.records[1].summary,
        "Summary unavailable for usp_Join: rate limited"
    );
    // scoring is unaffected by the failed summary
    assert_eq!(artifacts.records[1].complexity, 4);
    assert!(artifacts.records[1].technical_analysis.is_some());
    Ok(())
}

struct CountingSummarizer {
    fail_on: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, name: &str, _definition: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if name == self.fail_on {
            anyhow::bail!("rate limited");
        }
        Ok(format!("{} summary", name))
    }
}

fn aborting_runner(
    fail_on: &'static str,
    parallel: usize,
) -> (Runner, Arc<CountingSummarizer>, Arc<StubAnalyzer>) {
    let summarizer = Arc::new(CountingSummarizer {
        fail_on,
        calls: AtomicUsize::new(0),
    });
    let analyzer = Arc::new(StubAnalyzer::default());
    let r = Runner::new(
        summarizer.clone(),
        analyzer.clone(),
        RunPolicy {
            on_error: ErrorPolicy::Abort,
            parallel,
            ..RunPolicy::default()
        },
    );
    (r, summarizer, analyzer)
}

#[tokio::test]
async fn abort_policy_stops_the_run() {
    let (r, summarizer, analyzer) = aborting_runner("usp_Edge", 0);
    let err = r.run(&catalog()).await.unwrap_err();
    assert!(err.to_string().contains("rate limited"));
    // usp_Big, usp_Join, then the failing usp_Edge; usp_Tiny is never started
    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 3);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(r.progress().state("usp_Tiny"), Some(ProcState::Pending));
}

#[tokio::test]
async fn abort_on_first_procedure_makes_no_further_calls() {
    let (r, summarizer, analyzer) = aborting_runner("usp_Big", 1);
    assert!(r.run(&catalog()).await.is_err());

    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);

    let progress = r.progress();
    assert_eq!(progress.state("usp_Big"), Some(ProcState::Skipped));
    assert_eq!(progress.count(ProcState::Completed), 0);
    assert_eq!(progress.count(ProcState::Active), 0);
    assert_eq!(progress.count(ProcState::Pending), 3);
}

#[tokio::test]
async fn duplicates_are_skipped_and_reported() -> anyhow::Result<()> {
    let catalog = ProcedureCatalog::from_records(vec![
        ProcedureRecord::new("usp_A", "SELECT 1"),
        ProcedureRecord::new("usp_A", lines(200, "CURSOR")),
        ProcedureRecord::new("usp_B", "SELECT 2"),
    ]);
    let (r, _) = runner(None, RunPolicy::default());
    let artifacts = r.run(&catalog).await?;

    assert_eq!(artifacts.records.len(), 2);
    assert_eq!(artifacts.records[0].complexity, 0);
    assert_eq!(artifacts.skipped, vec!["usp_A".to_string()]);

    let progress = r.progress();
    assert_eq!(progress.total(), 3);
    assert_eq!(progress.count(ProcState::Completed), 2);
    assert_eq!(progress.count(ProcState::Skipped), 1);
    // the repeat is listed where it appeared in the source
    let listed: Vec<_> = progress.entries().collect();
    assert_eq!(
        listed,
        vec![
            ("usp_A", ProcState::Completed),
            ("usp_A", ProcState::Skipped),
            ("usp_B", ProcState::Completed),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn parallel_run_keeps_source_order() -> anyhow::Result<()> {
    let policy = RunPolicy {
        parallel: 4,
        ..RunPolicy::default()
    };
    let (r, _) = runner(None, policy);
    let artifacts = r.run(&catalog()).await?;
    let names: Vec<_> = artifacts.records.iter().map(|r| r.sp_name.as_str()).collect();
    assert_eq!(names, vec!["usp_Big", "usp_Join", "usp_Edge", "usp_Tiny"]);
    Ok(())
}

#[tokio::test]
async fn summarize_by_name_reports_misses() {
    let (r, _) = runner(None, RunPolicy::default());
    let c = catalog();

    let hit = r.summarize_by_name(&c, "usp_Tiny trailing").await;
    assert_eq!(hit, "usp_Tiny keeps the books balanced.");

    let miss = r.summarize_by_name(&c, "  usp_Ghost").await;
    assert_eq!(miss, "Could not find procedure usp_Ghost in current context");
}
