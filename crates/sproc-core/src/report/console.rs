use crate::engine::RunArtifacts;
use crate::report::document::flagged_percentage;

pub fn print_summary(artifacts: &RunArtifacts) {
    eprintln!("\nAnalyzed {} procedures", artifacts.records.len());

    for r in &artifacts.records {
        let icon = if r.complexity > artifacts.refactor_above {
            "🔧"
        } else {
            "✅"
        };
        eprintln!(
            "{} {:<32} {:>2}/10  {:>5} lines",
            icon, r.sp_name, r.complexity, r.lines_of_code
        );
    }

    for name in &artifacts.skipped {
        eprintln!("⏭️  {:<32} SKIPPED (duplicate name)", name);
    }

    let flagged = artifacts.flagged_count();
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} analyzed, {} flagged (>{}) {:.1}%, {} skipped, {} fallback",
        artifacts.records.len(),
        flagged,
        artifacts.refactor_above,
        flagged_percentage(flagged, artifacts.records.len()),
        artifacts.skipped.len(),
        artifacts.fallbacks
    );
}
