use std::fmt;

/// Configuration could not be read, parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// True when `err` (or anything in its chain) is a [`ConfigError`].
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<ConfigError>().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn detects_config_error_through_context() {
        let err: anyhow::Result<()> = Err(ConfigError("bad".into())).context("loading sproc.yaml");
        let err = err.unwrap_err();
        assert!(is_config_error(&err));
        assert!(!is_config_error(&anyhow::anyhow!("network down")));
    }
}
