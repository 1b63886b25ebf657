use regex::Regex;

use super::{FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind, OptionSpec};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "regex",
    kind: ModuleKind::Regex,
    fields: &[],
    options: &[OptionSpec {
        name: "pattern",
        default: None,
        help: "regex whose named groups become fields",
    }],
    needs_content: false,
    dynamic_fields: true,
    summary: "named capture groups matched against the file name",
};

/// Exposes every named capture group of a user pattern as a field. The
/// pattern is matched against the base name without its extension.
#[derive(Debug)]
pub struct CaptureModule {
    regex: Regex,
}

impl CaptureModule {
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }
}

impl FieldProvider for CaptureModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(options: &ModuleOptions) -> Result<Self, ConfigError> {
        let pattern = options
            .get("pattern")
            .ok_or_else(|| ConfigError::MissingOption {
                module: DESCRIPTOR.name.to_string(),
                option: "pattern".to_string(),
            })?;
        let regex = Regex::new(pattern)?;

        if regex.capture_names().flatten().next().is_none() {
            tracing::warn!(pattern, "pattern has no named capture groups");
        }

        Ok(Self { regex })
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let captures = self
            .regex
            .captures(file.stem)
            .ok_or_else(|| EntryError::NoMatch(file.stem.to_string()))?;

        let mut fields = FieldMap::new();
        for group in self.group_names() {
            if let Some(m) = captures.name(group) {
                fields.insert(group, m.as_str());
            }
        }
        Ok(fields)
    }
}
