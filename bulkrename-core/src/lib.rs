#![allow(unused)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod execute;
pub mod fields;
pub mod modules;
pub mod operations;
pub mod output;
pub mod paths;
pub mod plan;
pub mod preview;
pub mod registry;
pub mod template;

pub use config::Config;
pub use error::{ConfigError, EntryError};
pub use execute::{execute, EntryReport, ExecuteOptions, Mode, Outcome, Report, Summary};
pub use fields::{FieldMap, DEFAULT_FIELDS};
pub use modules::{FieldModule, FieldProvider, ModuleOptions};
pub use operations::{list_modules_operation, rename_operation, RenameOptions};
pub use output::{ModulesResult, OutputFormat, OutputFormatter, RenameResult};
pub use plan::{build_plan, validate_fields, EntryStatus, Plan, PlanOptions, RenameEntry};
pub use preview::{render_report, Preview, Verbosity};
pub use registry::{ModuleDescriptor, ModuleKind, ModuleRegistry, OptionSpec};
pub use template::{Segment, Template, TemplateError, DEFAULT_FORMAT};
