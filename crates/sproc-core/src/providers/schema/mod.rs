use crate::config::{SourceConfig, SourceKind};
use crate::model::ProcedureRecord;

pub mod directory;
pub mod manifest;
pub mod sqlite;

/// Yields the procedures of one database in a stable order (by name).
pub trait SchemaSource: Send + Sync {
    fn extract(&self) -> anyhow::Result<Vec<ProcedureRecord>>;
    fn describe(&self) -> String;
}

pub fn build_source(cfg: &SourceConfig) -> Box<dyn SchemaSource> {
    match cfg.kind {
        SourceKind::Sqlite => Box::new(sqlite::SqliteCatalog::new(cfg.path.clone())),
        SourceKind::Directory => Box::new(directory::DirectorySource::new(cfg.path.clone())),
        SourceKind::Manifest => Box::new(manifest::ManifestSource::new(cfg.path.clone())),
    }
}
