use crate::model::CombinedRecord;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

pub const COLUMNS: [&str; 6] = [
    "sp_name",
    "summary",
    "complexity",
    "lines_of_code",
    "complexity_factors",
    "last_execution_time",
];

/// Writes one row per procedure with exactly [`COLUMNS`].
pub fn write_csv(records: &[CombinedRecord], out: &Path) -> anyhow::Result<()> {
    super::ensure_parent_dir(out)?;
    let file = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    write_csv_to(file, records)
}

pub fn write_csv_to<W: Write>(out: W, records: &[CombinedRecord]) -> anyhow::Result<()> {
    let mut wtr = ::csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(COLUMNS)?;

    for r in records {
        let complexity = r.complexity.to_string();
        let lines = r.lines_of_code.to_string();
        wtr.write_record([
            r.sp_name.as_str(),
            r.summary.as_str(),
            complexity.as_str(),
            lines.as_str(),
            r.complexity_factors.as_str(),
            r.last_execution_time.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
