use super::SchemaSource;
use crate::model::ProcedureRecord;
use anyhow::Context;
use std::path::PathBuf;

/// YAML or JSON list of procedure records. JSON is valid YAML, so one parser covers both.
pub struct ManifestSource {
    pub path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SchemaSource for ManifestSource {
    fn extract(&self) -> anyhow::Result<Vec<ProcedureRecord>> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read manifest {}", self.path.display()))?;
        let mut procs: Vec<ProcedureRecord> = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse manifest {}", self.path.display()))?;

        if let Some(bad) = procs.iter().position(|p| p.name.trim().is_empty()) {
            anyhow::bail!("manifest entry #{} has an empty name", bad + 1);
        }

        procs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(procs)
    }

    fn describe(&self) -> String {
        format!("manifest:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NEVER_EXECUTED;

    #[test]
    fn parses_yaml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procs.yaml");
        std::fs::write(
            &path,
            r#"
- name: usp_b
  definition: "SELECT 1"
  last_execution_time: "2024-01-01 00:00:00"
- name: usp_a
"#,
        )
        .unwrap();

        let procs = ManifestSource::new(path).extract().unwrap();
        assert_eq!(procs[0].name, "usp_a");
        assert_eq!(procs[0].definition, None);
        assert_eq!(procs[0].last_execution_time, NEVER_EXECUTED);
        assert_eq!(procs[1].last_execution_time, "2024-01-01 00:00:00");
    }

    #[test]
    fn parses_json_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procs.json");
        std::fs::write(&path, r#"[{"name": "usp_json", "definition": "EXEC y"}]"#).unwrap();

        let procs = ManifestSource::new(path).extract().unwrap();
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].definition_text(), "EXEC y");
    }

    #[test]
    fn rejects_empty_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "- name: \"  \"\n").unwrap();
        let err = ManifestSource::new(path).extract().unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }
}
