use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

/// Problems detected before any file is touched. These abort the whole
/// invocation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("module '{0}' is already registered")]
    DuplicateModule(String),

    #[error("module '{0}' declares no fields")]
    NoFields(String),

    #[error("field '{field}' of module '{module}' is already provided by module '{owner}'")]
    DuplicateField {
        field: String,
        module: String,
        owner: String,
    },

    #[error("option --{option} belongs to the '{owner}' module, which is not selected")]
    OptionWithoutModule { option: String, owner: String },

    #[error("unknown option --{0}")]
    UnknownOption(String),

    #[error("module '{module}' requires option --{option}")]
    MissingOption { module: String, option: String },

    #[error("invalid value '{value}' for --{option}: {reason}")]
    InvalidOption {
        option: String,
        value: String,
        reason: String,
    },

    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid format template: {0}")]
    Template(#[from] TemplateError),

    #[error("field '{field}' is not provided by the '{module}' module (available: {available})")]
    UnsupportedField {
        field: String,
        module: String,
        available: String,
    },

    #[error("no input files given")]
    NoFiles,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("invalid config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },
}

/// A failure contained to a single rename entry. The batch carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("source not found")]
    SourceMissing,

    #[error("source is not a regular file")]
    NotAFile,

    #[error("source listed more than once (first at position {first})")]
    DuplicateSource { first: usize },

    #[error("failed to read file: {0}")]
    Read(String),

    #[error("pattern did not match '{0}'")]
    NoMatch(String),

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("unsupported font: {0}")]
    UnsupportedFont(String),

    #[error("field '{0}' is not available for this file")]
    MissingField(String),

    #[error("rendered file name is empty")]
    EmptyTarget,

    #[error("target collides with {}", display_paths(.others))]
    Collision { others: Vec<PathBuf> },

    #[error("target already exists: {}", .0.display())]
    Overwrite(PathBuf),

    #[error("blocked by failed rename of {}", .0.display())]
    Blocked(PathBuf),

    #[error("rename failed: {0}")]
    Rename(String),
}

impl EntryError {
    /// Collisions are reported as skipped conflicts rather than failures.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_lists_other_sources() {
        let err = EntryError::Collision {
            others: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
        };
        assert_eq!(err.to_string(), "target collides with a.txt, b.txt");
        assert!(err.is_conflict());
        assert!(!EntryError::EmptyTarget.is_conflict());
    }

    #[test]
    fn test_blocked_message_names_source() {
        let err = EntryError::Blocked(PathBuf::from("2.txt"));
        assert_eq!(err.to_string(), "blocked by failed rename of 2.txt");
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_option_without_module_message() {
        let err = ConfigError::OptionWithoutModule {
            option: "algorithm".to_string(),
            owner: "hash".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "option --algorithm belongs to the 'hash' module, which is not selected"
        );
    }
}
