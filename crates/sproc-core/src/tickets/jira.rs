use super::{IssueTracker, TicketRequest};
use crate::errors::ConfigError;
use async_trait::async_trait;
use serde_json::json;

pub const SERVER_ENV: &str = "JIRA_SERVER";
pub const USER_ENV: &str = "JIRA_USER";
pub const TOKEN_ENV: &str = "JIRA_TOKEN";

pub struct JiraClient {
    pub server: String,
    pub user: String,
    pub token: String,
    pub client: reqwest::Client,
}

impl JiraClient {
    pub fn new(server: String, user: String, token: String) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            user,
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let var = |k: &str| {
            std::env::var(k).map_err(|_| ConfigError(format!("{} is not set", k)))
        };
        Ok(Self::new(var(SERVER_ENV)?, var(USER_ENV)?, var(TOKEN_ENV)?))
    }

    pub fn issue_payload(ticket: &TicketRequest) -> serde_json::Value {
        json!({
            "fields": {
                "project": { "key": ticket.project },
                "summary": ticket.summary,
                "description": ticket.description,
                "issuetype": { "name": ticket.issue_type },
            }
        })
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn create_ticket(&self, ticket: &TicketRequest) -> anyhow::Result<String> {
        let url = format!("{}/rest/api/2/issue", self.server);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.token))
            .json(&Self::issue_payload(ticket))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Jira create issue error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        json.get("key")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow::anyhow!("Jira response missing issue key"))
    }
}
