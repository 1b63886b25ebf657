use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::execute::{execute, ExecuteOptions};
use crate::modules::{FieldModule, ModuleOptions};
use crate::output::RenameResult;
use crate::plan::{build_plan, PlanOptions};
use crate::preview::{render_report, Preview, Verbosity};
use crate::template::{Template, DEFAULT_FORMAT};

#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    /// Format template; `{name}{ext}` when unset.
    pub format: Option<String>,
    /// Module name; the default module when unset.
    pub module: Option<String>,
    pub module_options: ModuleOptions,
    pub plan: PlanOptions,
    pub execute: ExecuteOptions,
    /// Preview to render alongside the result. `None` renders nothing.
    pub preview: Option<Preview>,
    pub verbosity: Verbosity,
    pub use_color: Option<bool>,
}

/// Rename operation - returns structured data and the rendered preview.
///
/// Only configuration problems are returned as errors; they wrap a
/// [`ConfigError`]. Every per-file problem is part of the result.
pub fn rename_operation(
    files: &[PathBuf],
    options: &RenameOptions,
) -> Result<(RenameResult, Option<String>)> {
    let format = options.format.as_deref().unwrap_or(DEFAULT_FORMAT);
    let template = Template::parse(format)
        .map_err(ConfigError::from)
        .with_context(|| format!("Invalid --format '{}'", format))?;

    let module = FieldModule::from_name(options.module.as_deref(), &options.module_options)
        .context("Failed to configure module")?;

    tracing::debug!(
        module = module.name(),
        format = template.as_str(),
        files = files.len(),
        "starting rename"
    );

    let plan = build_plan(files, &template, &module, &options.plan)
        .context("Failed to build rename plan")?;
    let report = execute(&plan, &options.execute);

    let preview = options
        .preview
        .map(|p| render_report(&report, p, options.verbosity, options.use_color));

    Ok((RenameResult::from(&report), preview))
}
