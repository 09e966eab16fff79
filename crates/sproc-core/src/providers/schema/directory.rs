use super::SchemaSource;
use crate::model::{ProcedureRecord, NEVER_EXECUTED};
use anyhow::Context;
use std::path::PathBuf;

/// One `*.sql` file per procedure; the file stem is the procedure name.
pub struct DirectorySource {
    pub dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl SchemaSource for DirectorySource {
    fn extract(&self) -> anyhow::Result<Vec<ProcedureRecord>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read procedure directory {}", self.dir.display()))?;

        let mut out = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e.eq_ignore_ascii_case("sql")) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };
            let definition = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            out.push(ProcedureRecord {
                name: name.to_string(),
                definition: Some(definition),
                last_execution_time: NEVER_EXECUTED.to_string(),
            });
        }

        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("directory:{}", self.dir.display())
    }
}
