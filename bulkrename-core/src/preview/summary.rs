use crate::execute::{Outcome, Report};
use std::fmt::Write;

/// Render the report as a compact, line-oriented summary
pub fn render_summary(report: &Report) -> String {
    let summary = report.summary();
    let mut output = String::new();

    let _ = writeln!(output, "[RENAME SUMMARY]");
    let _ = writeln!(output, "Mode: {}", report.mode.as_str());
    let _ = writeln!(output, "Module: {}", report.module);
    let _ = writeln!(output, "Format: {}", report.format);
    let _ = writeln!(output, "Files: {}", summary.total);
    let _ = writeln!(output, "Planned: {}", summary.planned);
    let _ = writeln!(output, "Renamed: {}", summary.renamed);
    let _ = writeln!(output, "Unchanged: {}", summary.unchanged);
    let _ = writeln!(output, "Conflicts: {}", summary.conflicts);
    let _ = writeln!(output, "Skipped: {}", summary.skipped);
    let _ = writeln!(output, "Failed: {}", summary.failed);

    let problems: Vec<_> = report
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, Outcome::Failed(_) | Outcome::SkippedConflict(_)))
        .collect();

    if !problems.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "[PROBLEMS]");
        for entry in problems {
            let _ = writeln!(
                output,
                "{}: {}",
                entry.source.display(),
                entry.outcome.reason().unwrap_or_default()
            );
        }
    }

    output
}
