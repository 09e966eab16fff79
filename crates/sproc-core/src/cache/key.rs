use sha2::{Digest, Sha256};

/// Key for a cached LLM response. Any change to provider, model or prompt
/// (and therefore to the procedure text) produces a new key.
pub fn cache_key(provider: &str, model: &str, prompt: &str) -> String {
    let mut h = Sha256::new();
    h.update(provider.as_bytes());
    h.update(b"\n");
    h.update(model.as_bytes());
    h.update(b"\n");
    h.update(prompt.as_bytes());
    format!("{:x}", h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_and_sensitive() {
        let a = cache_key("openai", "gpt-4", "prompt");
        assert_eq!(a, cache_key("openai", "gpt-4", "prompt"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, cache_key("openai", "gpt-4o", "prompt"));
        assert_ne!(a, cache_key("fake", "gpt-4", "prompt"));
        assert_ne!(a, cache_key("openai", "gpt-4", "prompt "));
    }

    #[test]
    fn separator_prevents_field_bleed() {
        assert_ne!(cache_key("ab", "c", "p"), cache_key("a", "bc", "p"));
    }
}
