//! Built-in field modules.
//!
//! A module turns a file into extra template fields. Modules are a closed
//! set: [`FieldModule`] has one variant per built-in, and each variant's
//! type implements [`FieldProvider`]. Adding a module means adding a
//! variant, its descriptor to [`BUILTIN`], and one arm in each dispatch
//! `match` below.

mod capture;
mod font;
mod hash;
mod image;
mod mime;
mod number;
mod stat;

pub use capture::CaptureModule;
pub use font::FontModule;
pub use hash::{HashAlgorithm, HashModule};
pub use image::ImageModule;
pub use mime::MimeModule;
pub use number::NumberModule;
pub use stat::{StatModule, DEFAULT_TIME_FORMAT};

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind, ModuleRegistry, DEFAULT_DESCRIPTOR};

/// Descriptors of every built-in module, in registration order.
pub static BUILTIN: &[ModuleDescriptor] = &[
    hash::DESCRIPTOR,
    mime::DESCRIPTOR,
    number::DESCRIPTOR,
    capture::DESCRIPTOR,
    stat::DESCRIPTOR,
    image::DESCRIPTOR,
    font::DESCRIPTOR,
];

/// The file a module is asked to describe.
#[derive(Debug, Clone, Copy)]
pub struct FileRef<'a> {
    pub path: &'a Path,
    /// Base name without extension.
    pub stem: &'a str,
    /// Zero-based position in the input list.
    pub index: usize,
}

/// Common capability of every built-in module.
pub trait FieldProvider: Sized + Send + Sync {
    const DESCRIPTOR: ModuleDescriptor;

    /// Build the module from its options. Defaults from the descriptor are
    /// already filled in.
    fn configure(options: &ModuleOptions) -> Result<Self, ConfigError>;

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError>;
}

/// Raw module option values, keyed by option name (`algorithm`, `start`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleOptions {
    values: BTreeMap<String, String>,
}

impl ModuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, option: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(option.into(), value.into());
        self
    }

    #[must_use]
    pub fn with(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(option, value);
        self
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.values.get(option).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `option` as `T`.
    pub fn parse<T>(&self, option: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(option)
            .map(|value| {
                value.parse::<T>().map_err(|e| ConfigError::InvalidOption {
                    option: option.to_string(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Copy of these options with descriptor defaults filled in for
    /// anything unset.
    fn with_defaults(&self, descriptor: &ModuleDescriptor) -> Self {
        let mut merged = self.clone();
        for spec in descriptor.options {
            if let Some(default) = spec.default {
                merged
                    .values
                    .entry(spec.name.to_string())
                    .or_insert_with(|| default.to_string());
            }
        }
        merged
    }
}

/// A configured module, ready to resolve files.
#[derive(Debug)]
pub enum FieldModule {
    Default,
    Hash(HashModule),
    Mime(MimeModule),
    Number(NumberModule),
    Regex(CaptureModule),
    Stat(StatModule),
    Image(ImageModule),
    Font(FontModule),
}

impl FieldModule {
    /// Build the module described by `descriptor`. Every option given must
    /// belong to that module; an option owned by another module is a
    /// configuration error.
    pub fn configure(
        descriptor: &ModuleDescriptor,
        options: &ModuleOptions,
        registry: &ModuleRegistry,
    ) -> Result<Self, ConfigError> {
        for (option, _) in options.iter() {
            if descriptor.option(option).is_some() {
                continue;
            }
            return Err(match registry.option_owner(option) {
                Some(owner) => ConfigError::OptionWithoutModule {
                    option: option.to_string(),
                    owner: owner.name.to_string(),
                },
                None => ConfigError::UnknownOption(option.to_string()),
            });
        }

        let options = options.with_defaults(descriptor);
        let module = match descriptor.kind {
            ModuleKind::Default => Self::Default,
            ModuleKind::Hash => Self::Hash(HashModule::configure(&options)?),
            ModuleKind::Mime => Self::Mime(MimeModule::configure(&options)?),
            ModuleKind::Number => Self::Number(NumberModule::configure(&options)?),
            ModuleKind::Regex => Self::Regex(CaptureModule::configure(&options)?),
            ModuleKind::Stat => Self::Stat(StatModule::configure(&options)?),
            ModuleKind::Image => Self::Image(ImageModule::configure(&options)?),
            ModuleKind::Font => Self::Font(FontModule::configure(&options)?),
        };

        tracing::debug!(module = descriptor.name, "configured module");
        Ok(module)
    }

    /// Look up `name` in the global registry and configure it.
    pub fn from_name(name: Option<&str>, options: &ModuleOptions) -> Result<Self, ConfigError> {
        let registry = ModuleRegistry::global();
        let descriptor = registry.select(name)?;
        Self::configure(descriptor, options, registry)
    }

    pub fn descriptor(&self) -> &'static ModuleDescriptor {
        match self {
            Self::Default => &DEFAULT_DESCRIPTOR,
            Self::Hash(_) => &hash::DESCRIPTOR,
            Self::Mime(_) => &mime::DESCRIPTOR,
            Self::Number(_) => &number::DESCRIPTOR,
            Self::Regex(_) => &capture::DESCRIPTOR,
            Self::Stat(_) => &stat::DESCRIPTOR,
            Self::Image(_) => &image::DESCRIPTOR,
            Self::Font(_) => &font::DESCRIPTOR,
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Fields this configured module can produce, `name`/`ext` included.
    /// For `regex` these are the pattern's named groups.
    pub fn declared_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .descriptor()
            .available_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Self::Regex(module) = self {
            fields.extend(module.group_names().map(str::to_string));
        }
        fields
    }

    pub fn resolve(&self, path: &Path, stem: &str, index: usize) -> Result<FieldMap, EntryError> {
        let file = FileRef { path, stem, index };
        match self {
            Self::Default => Ok(FieldMap::new()),
            Self::Hash(m) => m.resolve(file),
            Self::Mime(m) => m.resolve(file),
            Self::Number(m) => m.resolve(file),
            Self::Regex(m) => m.resolve(file),
            Self::Stat(m) => m.resolve(file),
            Self::Image(m) => m.resolve(file),
            Self::Font(m) => m.resolve(file),
        }
    }
}

/// Map an I/O error on the source file to a per-entry failure.
fn read_error(err: &std::io::Error) -> EntryError {
    EntryError::Read(err.to_string())
}
