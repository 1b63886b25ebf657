pub mod args;
pub mod types;

pub use args::{Cli, ExecArgs, ModuleArgs};
pub use types::{AlgorithmArg, OutputFormat, PreviewArg};
