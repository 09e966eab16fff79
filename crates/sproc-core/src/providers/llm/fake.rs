use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;

/// Offline client with deterministic output, for dry runs and tests.
pub struct FakeClient {
    pub model: String,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self { model }
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse> {
        let subject = prompt
            .lines()
            .find_map(|l| l.trim().strip_prefix("Stored Procedure:"))
            .map(str::trim)
            .unwrap_or("input");

        Ok(LlmResponse {
            text: format!(
                "[fake:{}] Offline analysis of {} ({} prompt chars).",
                self.model,
                subject,
                prompt.len()
            ),
            provider: "fake".to_string(),
            model: self.model.clone(),
            cached: false,
            meta: json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn names_the_procedure_from_the_prompt() {
        let client = FakeClient::new("m".into());
        let resp = client
            .complete("Analyze:\nStored Procedure: usp_Orders\nSQL Code:\nSELECT 1")
            .await
            .unwrap();
        assert!(resp.text.starts_with("[fake:m] Offline analysis of usp_Orders"));
        assert_eq!(resp.provider, "fake");
    }

    #[tokio::test]
    async fn output_is_deterministic() {
        let client = FakeClient::new("m".into());
        let a = client.complete("hello").await.unwrap();
        let b = client.complete("hello").await.unwrap();
        assert_eq!(a.text, b.text);
    }
}
