use anyhow::Result;
use bulkrename_core::config::Config;
use bulkrename_core::{
    rename_operation, ConfigError, ExecuteOptions, Mode, OutputFormatter, PlanOptions, Preview,
    RenameOptions, Verbosity,
};
use std::io::{self, Write};

use crate::cli::{Cli, OutputFormat};

/// Run a rename from the parsed command line. Returns whether every
/// entry went through without a failure or conflict.
pub fn handle_rename(cli: &Cli, config: &Config) -> Result<bool> {
    let options = build_options(cli, config)?;
    let (result, preview) = rename_operation(&cli.files, &options)?;

    let mut stdout = io::stdout();
    if let Some(preview) = preview.filter(|p| !p.is_empty()) {
        write!(stdout, "{}", preview)?;
    }

    match cli.output {
        OutputFormat::Json => {
            writeln!(stdout, "{}", result.format(cli.output.into()))?;
        },
        OutputFormat::Summary => {
            if !cli.quiet {
                write!(stdout, "{}", result.format(cli.output.into()))?;
            }
        },
    }
    stdout.flush()?;

    Ok(result.success())
}

/// Merge command line flags over the config defaults.
fn build_options(cli: &Cli, config: &Config) -> Result<RenameOptions, ConfigError> {
    let defaults = &config.defaults;

    let module = cli.module.clone().or_else(|| defaults.module.clone());
    let mut module_options = cli.module_args.to_options();
    if module.as_deref() == Some("stat") && cli.module_args.time_format.is_none() {
        module_options.set("time-format", defaults.time_format.as_str());
    }

    let preview = match cli.output {
        OutputFormat::Json => None,
        OutputFormat::Summary => Some(match cli.preview {
            Some(arg) => arg.into(),
            None => defaults
                .preview
                .parse::<Preview>()
                .map_err(|reason| ConfigError::InvalidOption {
                    option: "preview".to_string(),
                    value: defaults.preview.clone(),
                    reason,
                })?,
        }),
    };

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };

    let use_color = if cli.no_color {
        Some(false)
    } else {
        defaults.use_color
    };

    Ok(RenameOptions {
        format: Some(cli.format.clone().unwrap_or_else(|| defaults.format.clone())),
        module,
        module_options,
        plan: PlanOptions {
            truncate: cli.exec.truncate,
            jobs: cli.exec.jobs,
        },
        execute: ExecuteOptions {
            mode: if cli.exec.commit {
                Mode::Commit
            } else {
                Mode::DryRun
            },
            limit: cli.exec.limit,
            allow_overwrite: cli.exec.allow_overwrite || defaults.allow_overwrite,
        },
        preview,
        verbosity,
        use_color,
    })
}
