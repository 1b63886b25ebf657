use anyhow::{Context, Result};
use bulkrename_core::config::Config;
use bulkrename_core::{list_modules_operation, ConfigError, OutputFormatter};
use clap::Parser;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;
mod rename;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose, cli.quiet);

    if cli.list_modules {
        println!("{}", list_modules_operation().format(cli.output.into()).trim_end());
        process::exit(0);
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => {
            tracing::debug!(?config, "loaded defaults");
            config
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    };

    match rename::handle_rename(&cli, &config) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code(&e));
        },
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over the
/// verbosity flags.
fn setup_tracing(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "bulkrename=debug,bulkrename_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load .bulkrename/config.toml"),
    }
}

/// Configuration problems exit with 2, anything unexpected with 3.
fn exit_code(e: &anyhow::Error) -> i32 {
    if e.chain().any(|cause| cause.is::<ConfigError>()) {
        2
    } else {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_config_errors() {
        let err = anyhow::Error::new(ConfigError::NoFiles).context("Failed to build rename plan");
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
