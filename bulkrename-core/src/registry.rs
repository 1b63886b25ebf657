//! Catalog of field-providing modules.
//!
//! Each built-in module publishes a static [`ModuleDescriptor`] describing
//! the fields it produces and the options it accepts. The registry maps
//! module names to those descriptors; the descriptor's [`ModuleKind`] is
//! what [`crate::modules::FieldModule::configure`] uses to build the module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::fields::DEFAULT_FIELDS;
use crate::modules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Default,
    Hash,
    Mime,
    Number,
    Regex,
    Stat,
    Image,
    Font,
}

/// A module-specific option with its default value, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub kind: ModuleKind,
    /// Fields produced in addition to `name` and `ext`.
    pub fields: &'static [&'static str],
    pub options: &'static [OptionSpec],
    /// Whether resolving requires reading the file's bytes.
    pub needs_content: bool,
    /// Fields depend on user input and can't be checked before resolving.
    pub dynamic_fields: bool,
    pub summary: &'static str,
}

impl ModuleDescriptor {
    pub fn provides(&self, field: &str) -> bool {
        DEFAULT_FIELDS.contains(&field) || self.fields.contains(&field)
    }

    pub fn available_fields(&self) -> Vec<&'static str> {
        DEFAULT_FIELDS
            .iter()
            .chain(self.fields.iter())
            .copied()
            .collect()
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub static DEFAULT_DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "default",
    kind: ModuleKind::Default,
    fields: &[],
    options: &[],
    needs_content: false,
    dynamic_fields: false,
    summary: "file name and extension only",
};

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<&'static str, ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed catalog of built-in modules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in modules::BUILTIN {
            if let Err(e) = registry.register(*descriptor) {
                tracing::error!("skipping built-in module {}: {}", descriptor.name, e);
            }
        }
        registry
    }

    /// Process-wide registry, built on first use and never mutated after.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ModuleRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::builtin)
    }

    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<(), ConfigError> {
        if self.modules.contains_key(descriptor.name) || descriptor.name == DEFAULT_DESCRIPTOR.name
        {
            return Err(ConfigError::DuplicateModule(descriptor.name.to_string()));
        }
        if descriptor.fields.is_empty() && !descriptor.dynamic_fields {
            return Err(ConfigError::NoFields(descriptor.name.to_string()));
        }

        for field in descriptor.fields {
            if DEFAULT_FIELDS.contains(field) {
                return Err(ConfigError::DuplicateField {
                    field: (*field).to_string(),
                    module: descriptor.name.to_string(),
                    owner: DEFAULT_DESCRIPTOR.name.to_string(),
                });
            }
            if let Some(owner) = self.modules.values().find(|m| m.fields.contains(field)) {
                return Err(ConfigError::DuplicateField {
                    field: (*field).to_string(),
                    module: descriptor.name.to_string(),
                    owner: owner.name.to_string(),
                });
            }
        }

        self.modules.insert(descriptor.name, descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ModuleDescriptor, ConfigError> {
        if name == DEFAULT_DESCRIPTOR.name {
            return Ok(&DEFAULT_DESCRIPTOR);
        }
        self.modules
            .get(name)
            .ok_or_else(|| ConfigError::UnknownModule(name.to_string()))
    }

    pub fn default_descriptor(&self) -> &'static ModuleDescriptor {
        &DEFAULT_DESCRIPTOR
    }

    /// Resolve an optional module name; `None` selects the default module.
    pub fn select(&self, name: Option<&str>) -> Result<&ModuleDescriptor, ConfigError> {
        match name {
            Some(name) => self.lookup(name),
            None => Ok(self.default_descriptor()),
        }
    }

    /// The module that accepts `option`, if any.
    pub fn option_owner(&self, option: &str) -> Option<&ModuleDescriptor> {
        self.modules.values().find(|m| m.option(option).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.keys().copied().collect()
    }
}
