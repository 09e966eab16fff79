use crate::complexity::split_factors;
use crate::model::CombinedRecord;
use anyhow::Context;
use std::fmt::Write as _;
use std::path::Path;

pub const TITLE: &str = "Stored Procedure Refactoring Review";

/// Percentage of flagged procedures; 0.0 for an empty run.
pub fn flagged_percentage(flagged: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        flagged as f64 / total as f64 * 100.0
    }
}

/// Renders the Markdown review document. Returns the text and the number of
/// procedures scoring above `refactor_above`.
pub fn render_document(records: &[CombinedRecord], refactor_above: u32) -> (String, usize) {
    let mut md = String::new();
    let _ = writeln!(md, "# {}\n", TITLE);
    let _ = writeln!(
        md,
        "Procedures with a complexity score above {} are listed for refactoring review.\n",
        refactor_above
    );

    let mut flagged = 0;
    for r in records.iter().filter(|r| r.complexity > refactor_above) {
        flagged += 1;
        let _ = writeln!(md, "## {}\n", r.sp_name);
        let _ = writeln!(md, "- **Complexity:** {}/10", r.complexity);
        let _ = writeln!(md, "- **Lines of code:** {}", r.lines_of_code);
        let _ = writeln!(md, "- **Last executed:** {}\n", r.last_execution_time);

        let _ = writeln!(md, "### Business Summary\n");
        let _ = writeln!(md, "{}\n", r.summary.trim());

        if let Some(tech) = &r.technical_analysis {
            let _ = writeln!(md, "### Technical Analysis\n");
            let _ = writeln!(md, "{}\n", tech.trim());
        }

        let _ = writeln!(md, "### Complexity Factors\n");
        for f in split_factors(&r.complexity_factors) {
            let _ = writeln!(md, "- {}", f);
        }
        md.push('\n');
    }

    if flagged == 0 {
        md.push_str("No procedures exceeded the refactoring threshold.\n\n");
    }

    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(
        md,
        "{} of {} procedures flagged for refactoring ({:.1}%)",
        flagged,
        records.len(),
        flagged_percentage(flagged, records.len())
    );

    (md, flagged)
}

pub fn write_document(
    records: &[CombinedRecord],
    refactor_above: u32,
    out: &Path,
) -> anyhow::Result<usize> {
    let (md, flagged) = render_document(records, refactor_above);
    super::ensure_parent_dir(out)?;
    std::fs::write(out, md).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(flagged)
}
