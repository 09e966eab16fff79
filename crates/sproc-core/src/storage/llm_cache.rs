use crate::storage::store::now_rfc3339;
use crate::storage::Store;
use rusqlite::{params, OptionalExtension};

/// Cached LLM text keyed by [`crate::cache::key::cache_key`].
///
/// Only collaborator responses live here; complexity results are always
/// recomputed.
#[derive(Clone)]
pub struct LlmCache {
    store: Store,
}

pub struct CacheEntry<'a> {
    pub stage: &'a str,
    pub procedure: &'a str,
    pub provider: &'a str,
    pub model: &'a str,
}

impl LlmCache {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.store.lock()?;
        let text = conn
            .query_row(
                "SELECT response_text FROM llm_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    pub fn put(&self, key: &str, entry: &CacheEntry<'_>, text: &str) -> anyhow::Result<()> {
        let conn = self.store.lock()?;
        conn.execute(
            "INSERT INTO llm_cache(
                key, stage, procedure, provider, model, created_at, response_text
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(key) DO UPDATE SET
                response_text=excluded.response_text,
                created_at=excluded.created_at",
            params![
                key,
                entry.stage,
                entry.procedure,
                entry.provider,
                entry.model,
                now_rfc3339(),
                text
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_and_overwrite() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let cache = LlmCache::new(store);
        let entry = CacheEntry {
            stage: "summary",
            procedure: "usp_Orders",
            provider: "fake",
            model: "m",
        };

        assert_eq!(cache.get("k1").unwrap(), None);
        cache.put("k1", &entry, "first").unwrap();
        assert_eq!(cache.get("k1").unwrap().as_deref(), Some("first"));
        cache.put("k1", &entry, "second").unwrap();
        assert_eq!(cache.get("k1").unwrap().as_deref(), Some("second"));
    }
}
