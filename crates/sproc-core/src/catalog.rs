use crate::model::ProcedureRecord;
use std::collections::HashMap;

/// In-memory view of the procedures extracted for one run.
///
/// Names are case-sensitive. Duplicates keep the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct ProcedureCatalog {
    procs: Vec<ProcedureRecord>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
    source_order: Vec<String>,
}

impl ProcedureCatalog {
    pub fn from_records(records: Vec<ProcedureRecord>) -> Self {
        let mut procs = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        let mut duplicates = Vec::new();
        let mut source_order = Vec::with_capacity(records.len());

        for rec in records {
            source_order.push(rec.name.clone());
            if index.contains_key(&rec.name) {
                tracing::warn!(
                    event = "sproc.catalog.duplicate",
                    procedure = %rec.name,
                    "duplicate procedure name, keeping first definition"
                );
                duplicates.push(rec.name);
                continue;
            }
            index.insert(rec.name.clone(), procs.len());
            procs.push(rec);
        }

        Self {
            procs,
            index,
            duplicates,
            source_order,
        }
    }

    pub fn procedures(&self) -> &[ProcedureRecord] {
        &self.procs
    }

    /// Names dropped because an earlier record had the same name.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Every extracted name in extraction order, duplicates included.
    pub fn source_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.source_order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Exact, case-sensitive lookup after [`clean_name`].
    pub fn get(&self, name: &str) -> Option<&ProcedureRecord> {
        self.index.get(clean_name(name)).map(|&i| &self.procs[i])
    }

    /// Like [`get`](Self::get) but turns a miss into a readable message.
    pub fn lookup(&self, name: &str) -> Result<&ProcedureRecord, String> {
        self.get(name).ok_or_else(|| missing_procedure_message(name))
    }
}

/// Trims the name and keeps the first whitespace-separated token.
pub fn clean_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

pub fn missing_procedure_message(name: &str) -> String {
    format!(
        "Could not find procedure {} in current context",
        clean_name(name)
    )
}
