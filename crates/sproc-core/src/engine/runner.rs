use crate::analysis::{summary_fallback, technical_fallback, Summarizer, TechnicalAnalyzer};
use crate::catalog::{missing_procedure_message, ProcedureCatalog};
use crate::complexity;
use crate::model::{CombinedRecord, ProcedureRecord};
use crate::on_error::{log_fallback, ErrorPolicy};
use crate::progress::{ProcState, ProgressTracker};
use crate::thresholds::ThresholdConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Default)]
pub struct RunPolicy {
    pub on_error: ErrorPolicy,
    pub thresholds: ThresholdConfig,
    /// Procedures analyzed concurrently; 0 and 1 both mean sequential.
    pub parallel: usize,
}

#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// One record per unique procedure, in source order.
    pub records: Vec<CombinedRecord>,
    pub skipped: Vec<String>,
    pub fallbacks: usize,
    pub refactor_above: u32,
}

impl RunArtifacts {
    pub fn flagged(&self) -> impl Iterator<Item = &CombinedRecord> {
        let limit = self.refactor_above;
        self.records.iter().filter(move |r| r.complexity > limit)
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged().count()
    }
}

struct Analyzed {
    record: CombinedRecord,
    fallbacks: usize,
}

/// Scores every procedure and attaches the collaborator texts.
#[derive(Clone)]
pub struct Runner {
    pub summarizer: Arc<dyn Summarizer>,
    pub analyzer: Arc<dyn TechnicalAnalyzer>,
    pub policy: RunPolicy,
    progress: Arc<Mutex<ProgressTracker>>,
}

impl Runner {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        analyzer: Arc<dyn TechnicalAnalyzer>,
        policy: RunPolicy,
    ) -> Self {
        Self {
            summarizer,
            analyzer,
            policy,
            progress: Arc::new(Mutex::new(ProgressTracker::default())),
        }
    }

    /// Snapshot of per-procedure progress for the current or last run.
    pub fn progress(&self) -> ProgressTracker {
        self.progress
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn mark(&self, name: &str, state: ProcState) {
        if let Ok(mut t) = self.progress.lock() {
            t.set(name, state);
        }
    }

    pub async fn run(&self, catalog: &ProcedureCatalog) -> anyhow::Result<RunArtifacts> {
        {
            let mut t = self
                .progress
                .lock()
                .map_err(|_| anyhow::anyhow!("progress mutex poisoned"))?;
            *t = ProgressTracker::new(catalog.source_order());
        }

        let total = catalog.len();
        let sem = Arc::new(Semaphore::new(self.policy.parallel.max(1)));
        // set by the first failing task; nothing new is started afterwards
        let halted = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(total);

        for (i, proc) in catalog.procedures().iter().enumerate() {
            let permit = sem.clone().acquire_owned().await?;
            if halted.load(Ordering::SeqCst) {
                break;
            }
            let this = self.clone();
            let proc = proc.clone();
            let halted = halted.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                if halted.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                tracing::info!(
                    event = "sproc.procedure.start",
                    index = i + 1,
                    total,
                    procedure = %proc.name,
                    "analyzing procedure {}/{}: {}", i + 1, total, proc.name
                );
                match this.analyze_procedure(&proc).await {
                    Ok(a) => Ok(Some(a)),
                    Err(e) => {
                        halted.store(true, Ordering::SeqCst);
                        this.mark(&proc.name, ProcState::Skipped);
                        Err(e)
                    }
                }
            }));
        }

        let mut records = Vec::with_capacity(total);
        let mut fallbacks = 0;
        let mut failure = None;
        let mut pending = handles.into_iter();
        for h in pending.by_ref() {
            let outcome = match h.await {
                Ok(res) => res,
                Err(e) => Err(anyhow::anyhow!("analysis task failed: {}", e)),
            };
            match outcome {
                Ok(Some(a)) => {
                    fallbacks += a.fallbacks;
                    records.push(a.record);
                }
                Ok(None) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            for rest in pending {
                rest.abort();
            }
            tracing::warn!(event = "sproc.run.aborted", error = %e, "run stopped by collaborator error");
            return Err(e);
        }

        Ok(RunArtifacts {
            records,
            skipped: catalog.duplicates().to_vec(),
            fallbacks,
            refactor_above: self.policy.thresholds.refactor_above(),
        })
    }

    async fn analyze_procedure(&self, proc: &ProcedureRecord) -> anyhow::Result<Analyzed> {
        self.mark(&proc.name, ProcState::Active);
        let definition = proc.definition_text();
        let mut fallbacks = 0;

        let summary = match self.summarizer.summarize(&proc.name, definition).await {
            Ok(s) => s,
            Err(e) => {
                fallbacks += 1;
                log_fallback("summary", &proc.name, &e);
                self.policy
                    .on_error
                    .apply_to_error(&e, summary_fallback(&proc.name, &e))
                    .into_result()?
            }
        };

        let result = complexity::score(&proc.name, definition);

        let technical = if self.policy.thresholds.needs_refactoring(result.complexity) {
            match self
                .analyzer
                .analyze(&proc.name, definition, result.complexity)
                .await
            {
                Ok(t) => Some(t),
                Err(e) => {
                    fallbacks += 1;
                    log_fallback("technical_analysis", &proc.name, &e);
                    Some(
                        self.policy
                            .on_error
                            .apply_to_error(&e, technical_fallback(&proc.name, &e))
                            .into_result()?,
                    )
                }
            }
        } else {
            None
        };

        tracing::info!(
            event = "sproc.procedure.done",
            procedure = %proc.name,
            complexity = result.complexity,
            lines_of_code = result.lines_of_code,
            flagged = technical.is_some(),
            "completed {} - complexity {}/10", proc.name, result.complexity
        );

        self.mark(&proc.name, ProcState::Completed);
        Ok(Analyzed {
            record: CombinedRecord::assemble(proc, summary, result, technical),
            fallbacks,
        })
    }

    /// Summarizes a procedure by name; a miss yields a descriptive message, not an error.
    pub async fn summarize_by_name(&self, catalog: &ProcedureCatalog, name: &str) -> String {
        let proc = match catalog.get(name) {
            Some(p) => p,
            None => return missing_procedure_message(name),
        };
        match self
            .summarizer
            .summarize(&proc.name, proc.definition_text())
            .await
        {
            Ok(s) => s,
            Err(e) => {
                log_fallback("summary", &proc.name, &e);
                summary_fallback(&proc.name, &e)
            }
        }
    }
}
