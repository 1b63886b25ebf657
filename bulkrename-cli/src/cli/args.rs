use bulkrename_core::ModuleOptions;
use clap::{Args, Parser};
use std::path::PathBuf;

use super::types::{AlgorithmArg, OutputFormat, PreviewArg};

/// Rename batches of files from a format template
///
/// Templates mix literal text with {field} placeholders, e.g.
/// "{number}-{name}{ext}". Run with --list-modules to see every field.
/// Nothing is renamed unless --commit is given.
#[derive(Parser, Debug)]
#[command(name = "bulkrename")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files to rename, in the order used for numbering
    #[arg(value_name = "FILE", required_unless_present = "list_modules")]
    pub files: Vec<PathBuf>,

    /// Format template for the new names [default: {name}{ext}]
    #[arg(short = 'f', long, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Module providing extra fields (hash, mime, number, regex, stat, image, font)
    #[arg(short = 'm', long, value_name = "NAME")]
    pub module: Option<String>,

    /// List modules with their fields and options, then exit
    #[arg(long)]
    pub list_modules: bool,

    #[command(flatten)]
    pub module_args: ModuleArgs,

    #[command(flatten)]
    pub exec: ExecArgs,

    /// Preview format (lines, table, summary, none)
    #[arg(long, value_enum)]
    pub preview: Option<PreviewArg>,

    /// Output format for the result
    #[arg(long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Show resolved fields and debug logs
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report failures and conflicts
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read defaults from this file instead of .bulkrename/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Options forwarded to the selected module
#[derive(Args, Debug, Clone, Default)]
pub struct ModuleArgs {
    /// Digest algorithm (hash module)
    #[arg(short = 'a', long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// First number of the sequence, may be negative (number module)
    #[arg(short = 'n', long = "number", value_name = "N", allow_negative_numbers = true)]
    pub number: Option<i64>,

    /// Minimum width of the number, zero-padded (number module)
    #[arg(long, value_name = "WIDTH")]
    pub pad: Option<usize>,

    /// Pattern matched against each file stem (regex module)
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    pub regex: Option<String>,

    /// strftime format for timestamps (stat module)
    #[arg(long, value_name = "FORMAT")]
    pub time_format: Option<String>,
}

impl ModuleArgs {
    /// Translate the flags into option names the modules understand.
    /// Unset flags are left out so the module defaults apply.
    pub fn to_options(&self) -> ModuleOptions {
        let mut options = ModuleOptions::new();
        if let Some(algorithm) = self.algorithm {
            options.set("algorithm", algorithm.as_str());
        }
        if let Some(number) = self.number {
            options.set("start", number.to_string());
        }
        if let Some(pad) = self.pad {
            options.set("pad", pad.to_string());
        }
        if let Some(pattern) = &self.regex {
            options.set("pattern", pattern.as_str());
        }
        if let Some(time_format) = &self.time_format {
            options.set("time-format", time_format.as_str());
        }
        options
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExecArgs {
    /// Perform the renames (default is a dry run)
    #[arg(short = 'c', long)]
    pub commit: bool,

    /// Rename at most N files, in input order
    #[arg(short = 'l', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Cut rendered names to at most N characters
    #[arg(long, value_name = "N")]
    pub truncate: Option<usize>,

    /// Replace existing files that are not part of the batch
    #[arg(long)]
    pub allow_overwrite: bool,

    /// Number of worker threads used to resolve fields
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,
}
