//! Natural-language collaborators: business summary and technical refactoring analysis.

use crate::cache::key::cache_key;
use crate::prompts::{render_summary_prompt, render_technical_prompt};
use crate::providers::llm::LlmClient;
use crate::storage::llm_cache::{CacheEntry, LlmCache};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, name: &str, definition: &str) -> anyhow::Result<String>;
}

#[async_trait]
pub trait TechnicalAnalyzer: Send + Sync {
    async fn analyze(&self, name: &str, definition: &str, complexity: u32)
        -> anyhow::Result<String>;
}

/// Shared plumbing: timeout, optional response cache, one LLM call.
#[derive(Clone)]
pub struct LlmCollaborator {
    pub client: Arc<dyn LlmClient>,
    pub cache: Option<LlmCache>,
    pub timeout: Duration,
}

impl LlmCollaborator {
    pub fn new(client: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            client,
            cache: None,
            timeout,
        }
    }

    pub fn with_cache(mut self, cache: LlmCache) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn ask(&self, stage: &str, procedure: &str, prompt: &str) -> anyhow::Result<String> {
        let key = cache_key(self.client.provider_name(), self.client.model(), prompt);

        if let Some(cache) = &self.cache {
            match cache.get(&key) {
                Ok(Some(text)) => {
                    tracing::debug!(event = "sproc.llm.cache_hit", stage, procedure);
                    return Ok(text);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "llm cache read failed"),
            }
        }

        let resp = timeout(self.timeout, self.client.complete(prompt))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} call for {} timed out after {}s",
                    stage,
                    procedure,
                    self.timeout.as_secs()
                )
            })??;

        if resp.text.trim().is_empty() {
            anyhow::bail!("{} call for {} returned empty text", stage, procedure);
        }

        if let Some(cache) = &self.cache {
            let entry = CacheEntry {
                stage,
                procedure,
                provider: self.client.provider_name(),
                model: self.client.model(),
            };
            if let Err(e) = cache.put(&key, &entry, &resp.text) {
                tracing::warn!(error = %e, "llm cache write failed");
            }
        }

        Ok(resp.text)
    }
}

pub struct LlmSummarizer {
    pub inner: LlmCollaborator,
}

impl LlmSummarizer {
    pub fn new(inner: LlmCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, name: &str, definition: &str) -> anyhow::Result<String> {
        let prompt = render_summary_prompt(name, definition);
        self.inner.ask("summary", name, &prompt).await
    }
}

pub struct LlmTechnicalAnalyzer {
    pub inner: LlmCollaborator,
}

impl LlmTechnicalAnalyzer {
    pub fn new(inner: LlmCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TechnicalAnalyzer for LlmTechnicalAnalyzer {
    async fn analyze(
        &self,
        name: &str,
        definition: &str,
        complexity: u32,
    ) -> anyhow::Result<String> {
        let prompt = render_technical_prompt(name, definition, complexity);
        self.inner.ask("technical_analysis", name, &prompt).await
    }
}

pub fn summary_fallback(name: &str, error: &anyhow::Error) -> String {
    format!("Summary unavailable for {}: {}", name, error)
}

pub fn technical_fallback(name: &str, error: &anyhow::Error) -> String {
    format!("Technical analysis unavailable for {}: {}", name, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LlmResponse;
    use crate::providers::llm::fake::FakeClient;
    use crate::storage::Store;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CountingClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<LlmResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LlmResponse {
                text: format!("answer #{}", n),
                provider: "counting".into(),
                model: "m".into(),
                cached: false,
                meta: serde_json::json!({}),
            })
        }
        fn provider_name(&self) -> &'static str {
            "counting"
        }
        fn model(&self) -> &str {
            "m"
        }
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(LlmResponse::default())
        }
        fn provider_name(&self) -> &'static str {
            "slow"
        }
        fn model(&self) -> &str {
            "m"
        }
    }

    #[tokio::test]
    async fn summarizer_uses_client() {
        let c = LlmCollaborator::new(Arc::new(FakeClient::new("m".into())), Duration::from_secs(5));
        let text = LlmSummarizer::new(c)
            .summarize("usp_Orders", "SELECT 1")
            .await
            .unwrap();
        assert!(text.contains("usp_Orders"));
    }

    #[tokio::test]
    async fn cache_avoids_second_call() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
        });
        let c = LlmCollaborator::new(client.clone(), Duration::from_secs(5))
            .with_cache(LlmCache::new(store));
        let analyzer = LlmTechnicalAnalyzer::new(c);

        let a = analyzer.analyze("p", "DECLARE c CURSOR", 6).await.unwrap();
        let b = analyzer.analyze("p", "DECLARE c CURSOR", 6).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        // different score renders a different prompt
        analyzer.analyze("p", "DECLARE c CURSOR", 7).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_client_times_out() {
        let c = LlmCollaborator::new(Arc::new(SlowClient), Duration::from_millis(20));
        let err = LlmSummarizer::new(c).summarize("p", "x").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn fallback_texts_name_the_procedure() {
        let e = anyhow::anyhow!("boom");
        assert_eq!(summary_fallback("p", &e), "Summary unavailable for p: boom");
        assert!(technical_fallback("p", &e).starts_with("Technical analysis unavailable for p"));
    }
}
