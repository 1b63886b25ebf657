use crate::execute::{Outcome, Report};
use comfy_table::{Cell, Color, ColumnConstraint, ContentArrangement, Table, Width};
use std::io::{self, IsTerminal};

use super::Verbosity;

fn outcome_color(outcome: &Outcome) -> Color {
    match outcome {
        Outcome::Planned { .. } => Color::Cyan,
        Outcome::Renamed => Color::Green,
        Outcome::Unchanged => Color::DarkGrey,
        Outcome::SkippedLimit => Color::Yellow,
        Outcome::SkippedConflict(_) => Color::Magenta,
        Outcome::Failed(_) => Color::Red,
    }
}

/// Render the report as a table: one row per entry
pub fn render_table(report: &Report, verbosity: Verbosity, use_color: bool) -> String {
    let mut table = Table::new();

    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        table.set_content_arrangement(ContentArrangement::Disabled);
        table.set_constraints(vec![
            ColumnConstraint::Absolute(Width::Fixed(8)),  // #
            ColumnConstraint::Absolute(Width::Fixed(50)), // Source
            ColumnConstraint::Absolute(Width::Fixed(50)), // Target
            ColumnConstraint::Absolute(Width::Fixed(20)), // Outcome
            ColumnConstraint::Absolute(Width::Fixed(60)), // Reason
        ]);
    }

    // Force styling even in non-TTY environments when colors are explicitly requested
    if use_color {
        table.enforce_styling();
    }

    let headers = ["#", "Source", "Target", "Outcome", "Reason"];
    if use_color {
        table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    } else {
        table.set_header(headers);
    }

    for entry in &report.entries {
        if !verbosity.shows(&entry.outcome) {
            continue;
        }

        let target = entry
            .target
            .as_ref()
            .map(|t| t.display().to_string())
            .unwrap_or_default();
        let outcome = entry.outcome.as_str();
        let reason = entry.outcome.reason().unwrap_or_default();

        if use_color {
            table.add_row(vec![
                Cell::new(entry.index),
                Cell::new(entry.source.display()),
                Cell::new(&target),
                Cell::new(outcome).fg(outcome_color(&entry.outcome)),
                Cell::new(&reason),
            ]);
        } else {
            table.add_row(vec![
                entry.index.to_string(),
                entry.source.display().to_string(),
                target,
                outcome.to_string(),
                reason,
            ]);
        }
    }

    let summary = report.summary();
    format!(
        "{}\n{} entries: {} planned, {} renamed, {} unchanged, {} conflicts, {} skipped, {} failed\n",
        table,
        summary.total,
        summary.planned,
        summary.renamed,
        summary.unchanged,
        summary.conflicts,
        summary.skipped,
        summary.failed
    )
}
