use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

use crate::execute::{Mode, Outcome, Report, Summary};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleRegistry, DEFAULT_DESCRIPTOR};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

/// Result of a rename operation
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameResult {
    pub mode: Mode,
    pub module: String,
    pub format: String,
    pub summary: Summary,
    pub entries: Vec<EntryResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResult {
    pub index: usize,
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub outcome: String,
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overwrite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
}

impl RenameResult {
    /// No entry failed and no entry was skipped for a conflict.
    pub fn success(&self) -> bool {
        self.summary.failed == 0 && self.summary.conflicts == 0
    }
}

impl From<&Report> for RenameResult {
    fn from(report: &Report) -> Self {
        let entries = report
            .entries
            .iter()
            .map(|entry| EntryResult {
                index: entry.index,
                source: entry.source.clone(),
                target: entry.target.clone(),
                outcome: entry.outcome.as_str().to_string(),
                reason: entry.outcome.reason(),
                overwrite: matches!(entry.outcome, Outcome::Planned { overwrite: true }),
                fields: entry.fields.clone(),
            })
            .collect();

        Self {
            mode: report.mode,
            module: report.module.to_string(),
            format: report.format.clone(),
            summary: report.summary(),
            entries,
        }
    }
}

/// Result of `--list-modules`
#[derive(Debug, Serialize)]
pub struct ModulesResult {
    pub modules: Vec<ModuleDescriptor>,
}

impl ModulesResult {
    /// The default module followed by every registered one.
    pub fn from_registry(registry: &ModuleRegistry) -> Self {
        let modules = std::iter::once(DEFAULT_DESCRIPTOR)
            .chain(registry.iter().copied())
            .collect();
        Self { modules }
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for RenameResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.success(),
            "operation": "rename",
            "mode": self.mode,
            "module": self.module,
            "format": self.format,
            "summary": self.summary,
            "entries": self.entries,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let s = &self.summary;
        let mut output = String::new();

        match self.mode {
            Mode::DryRun => {
                let _ = write!(output, "Dry run: {} to rename", s.planned);
            },
            Mode::Commit => {
                let _ = write!(output, "✓ Renamed {} files", s.renamed);
            },
        }

        for (count, label) in [
            (s.unchanged, "unchanged"),
            (s.skipped, "skipped (limit)"),
            (s.conflicts, "conflicts"),
            (s.failed, "failed"),
        ] {
            if count > 0 {
                let _ = write!(output, ", {} {}", count, label);
            }
        }
        output.push('\n');

        if self.mode == Mode::DryRun && s.planned > 0 {
            output.push_str("Run again with --commit to apply.\n");
        }

        output
    }
}

impl OutputFormatter for ModulesResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "list-modules",
            "modules": self.modules,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        for module in &self.modules {
            let _ = writeln!(output, "{}: {}", module.name, module.summary);
            if module.dynamic_fields {
                let _ = writeln!(
                    output,
                    "  fields: {}, plus named groups of the pattern",
                    module.available_fields().join(", ")
                );
            } else {
                let _ = writeln!(output, "  fields: {}", module.available_fields().join(", "));
            }
            for option in module.options {
                match option.default {
                    Some(default) => {
                        let _ = writeln!(
                            output,
                            "  --{} ({}, default {})",
                            option.name, option.help, default
                        );
                    },
                    None => {
                        let _ = writeln!(output, "  --{} ({})", option.name, option.help);
                    },
                }
            }
        }

        output
    }
}
