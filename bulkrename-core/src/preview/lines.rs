use crate::execute::{EntryReport, Outcome, Report};
use nu_ansi_term::{Color as AnsiColor, Style};
use std::fmt::Write;
use std::path::Path;

use super::Verbosity;

fn tag(outcome: &Outcome) -> (&'static str, Style) {
    match outcome {
        Outcome::Planned { .. } => ("plan", AnsiColor::Cyan.normal()),
        Outcome::Renamed => ("move", AnsiColor::Green.bold()),
        Outcome::Unchanged => ("same", AnsiColor::DarkGray.normal()),
        Outcome::SkippedLimit => ("skip", AnsiColor::Yellow.normal()),
        Outcome::SkippedConflict(_) => ("conflict", AnsiColor::Magenta.bold()),
        Outcome::Failed(_) => ("fail", AnsiColor::Red.bold()),
    }
}

fn display(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

/// One report line, e.g. `[move] a.txt → 0.txt`.
pub fn format_line(entry: &EntryReport, use_color: bool) -> String {
    let (name, style) = tag(&entry.outcome);
    let tag = format!("[{}]", name);
    let tag = if use_color {
        style.paint(tag).to_string()
    } else {
        tag
    };

    let source = entry.source.display();
    let target = display(entry.target.as_deref());

    match &entry.outcome {
        Outcome::Planned { overwrite: true } => {
            let marker = if use_color {
                AnsiColor::Yellow.paint("(overwrite)").to_string()
            } else {
                "(overwrite)".to_string()
            };
            format!("{} {} → {} {}", tag, source, target, marker)
        },
        Outcome::Planned { .. } | Outcome::Renamed => format!("{} {} → {}", tag, source, target),
        Outcome::Unchanged => format!("{} {}", tag, source),
        Outcome::SkippedLimit => format!("{} {} → {} (limit)", tag, source, target),
        Outcome::SkippedConflict(e) => format!("{} {} → {} | {}", tag, source, target, e),
        Outcome::Failed(e) => format!("{} {} | {}", tag, source, e),
    }
}

/// Render the report one entry per line, in plan order
pub fn render_lines(report: &Report, verbosity: Verbosity, use_color: bool) -> String {
    let mut output = String::new();

    for entry in &report.entries {
        if !verbosity.shows(&entry.outcome) {
            continue;
        }
        output.push_str(&format_line(entry, use_color));
        output.push('\n');

        if verbosity == Verbosity::Verbose {
            if let Some(fields) = &entry.fields {
                let values: Vec<String> = fields
                    .iter()
                    .map(|(field, value)| format!("{}={:?}", field, value))
                    .collect();
                let _ = writeln!(output, "    {}", values.join(" "));
            }
        }
    }

    output
}
