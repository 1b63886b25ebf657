mod lines;
mod summary;
mod table;

pub use lines::render_lines;
pub use summary::render_summary;
pub use table::render_table;

use crate::execute::{Outcome, Report};
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Lines,
    Table,
    Summary,
    None,
}

impl std::str::FromStr for Preview {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" => Ok(Self::Lines),
            "table" => Ok(Self::Table),
            "summary" => Ok(Self::Summary),
            "none" => Ok(Self::None),
            _ => Err(format!("Invalid preview format: {}", s)),
        }
    }
}

/// How much of the report to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures and conflicts only
    Quiet,
    /// Every entry
    #[default]
    Normal,
    /// Every entry plus its resolved fields
    Verbose,
}

impl Verbosity {
    /// Whether an entry with this outcome is shown.
    pub fn shows(self, outcome: &Outcome) -> bool {
        match self {
            Self::Verbose | Self::Normal => true,
            Self::Quiet => matches!(outcome, Outcome::Failed(_) | Outcome::SkippedConflict(_)),
        }
    }
}

/// Determine whether to use colors based on explicit preference or terminal detection
pub fn should_use_color_with_detector<F>(use_color: Option<bool>, is_terminal: F) -> bool
where
    F: Fn() -> bool,
{
    match use_color {
        Some(explicit_color) => explicit_color,
        None => is_terminal(),
    }
}

pub fn should_use_color(use_color: Option<bool>) -> bool {
    should_use_color_with_detector(use_color, || io::stdout().is_terminal())
}

/// Render the report in the specified format
pub fn render_report(
    report: &Report,
    format: Preview,
    verbosity: Verbosity,
    use_color: Option<bool>,
) -> String {
    let use_color = should_use_color(use_color);

    match format {
        Preview::Lines => render_lines(report, verbosity, use_color),
        Preview::Table => render_table(report, verbosity, use_color),
        Preview::Summary => render_summary(report),
        Preview::None => String::new(),
    }
}
