//! High-level operations that correspond to CLI commands
//!
//! These wire the registry, template, planner and executor together and
//! return structured results, leaving argument parsing and printing to the
//! CLI.

pub mod modules;
pub mod rename;

pub use modules::list_modules_operation;
pub use rename::{rename_operation, RenameOptions};
