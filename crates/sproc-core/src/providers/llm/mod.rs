use crate::config::LlmConfig;
use crate::errors::ConfigError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse>;
    fn provider_name(&self) -> &'static str;
    fn model(&self) -> &str;
}

pub mod fake;
pub mod openai;

/// Builds the configured client. `provider_override` wins over `cfg.provider`.
pub fn build_client(
    cfg: &LlmConfig,
    provider_override: Option<&str>,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    let provider = provider_override.unwrap_or(&cfg.provider);
    match provider {
        "fake" => Ok(Arc::new(fake::FakeClient::new(cfg.model.clone()))),
        "openai" => {
            let api_key = std::env::var(openai::API_KEY_ENV).map_err(|_| {
                ConfigError(format!(
                    "{} is not set (required for provider 'openai')",
                    openai::API_KEY_ENV
                ))
            })?;
            let mut client = openai::OpenAIClient::new(
                cfg.model.clone(),
                api_key,
                cfg.temperature,
                cfg.max_tokens,
            );
            if let Some(url) = &cfg.base_url {
                client = client.with_base_url(url.clone());
            }
            Ok(Arc::new(client))
        }
        other => Err(ConfigError(format!(
            "unknown llm provider '{}' (expected openai|fake)",
            other
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_fake_provider() {
        let cfg = LlmConfig::default();
        let client = build_client(&cfg, Some("fake")).unwrap();
        assert_eq!(client.provider_name(), "fake");
        assert_eq!(client.model(), "gpt-4");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cfg = LlmConfig::default();
        let err = build_client(&cfg, Some("ollama")).err().unwrap();
        assert!(err.to_string().contains("unknown llm provider"));
        assert!(crate::errors::is_config_error(&err));
    }
}
