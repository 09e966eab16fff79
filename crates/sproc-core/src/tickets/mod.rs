use crate::config::TicketConfig;
use crate::engine::RunArtifacts;
use crate::model::CombinedRecord;
use async_trait::async_trait;
use serde::Serialize;

pub mod jira;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRequest {
    pub project: String,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns its key (e.g. `APP-123`).
    async fn create_ticket(&self, ticket: &TicketRequest) -> anyhow::Result<String>;
}

pub fn ticket_for(record: &CombinedRecord, cfg: &TicketConfig) -> TicketRequest {
    let mut description = format!(
        "Stored procedure {} scored {}/10 ({} lines).\n\nComplexity factors: {}\n\nBusiness summary:\n{}\n",
        record.sp_name,
        record.complexity,
        record.lines_of_code,
        record.complexity_factors,
        record.summary.trim()
    );
    if let Some(tech) = &record.technical_analysis {
        description.push_str("\nTechnical analysis:\n");
        description.push_str(tech.trim());
        description.push('\n');
    }

    TicketRequest {
        project: cfg.project.clone(),
        issue_type: cfg.issue_type.clone(),
        summary: format!(
            "Refactor stored procedure {} (complexity {}/10)",
            record.sp_name, record.complexity
        ),
        description,
    }
}

#[derive(Debug, Clone)]
pub struct TicketOutcome {
    pub procedure: String,
    pub result: Result<String, String>,
}

/// Files one ticket per flagged procedure. Failures are reported per ticket and never abort.
pub async fn file_tickets(
    tracker: &dyn IssueTracker,
    artifacts: &RunArtifacts,
    cfg: &TicketConfig,
) -> Vec<TicketOutcome> {
    let mut out = Vec::new();
    for record in artifacts.flagged() {
        let ticket = ticket_for(record, cfg);
        let result = match tracker.create_ticket(&ticket).await {
            Ok(key) => {
                tracing::info!(event = "sproc.ticket.created", procedure = %record.sp_name, key = %key);
                Ok(key)
            }
            Err(e) => {
                tracing::warn!(event = "sproc.ticket.failed", procedure = %record.sp_name, error = %e);
                Err(e.to_string())
            }
        };
        out.push(TicketOutcome {
            procedure: record.sp_name.clone(),
            result,
        });
    }
    out
}
