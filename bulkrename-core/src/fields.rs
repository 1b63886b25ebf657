use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EntryError;
use crate::modules::FieldModule;

/// Fields every module exposes.
pub const DEFAULT_FIELDS: &[&str] = &["name", "ext"];

/// Field name to value, computed once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge module fields. Module fields never shadow `name`/`ext`.
    pub fn extend(&mut self, other: Self) {
        for (field, value) in other.0 {
            if !DEFAULT_FIELDS.contains(&field.as_str()) {
                self.0.insert(field, value);
            }
        }
    }
}

/// Split a base name at its last dot. The extension keeps its dot so that
/// `{name}{ext}` reproduces the original. A name whose only dot is the
/// leading one (`.bashrc`) has no extension.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => file_name.split_at(idx),
    }
}

/// The base name of `path` split into `(name, ext)`.
pub fn name_parts(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (name, ext) = split_name(&file_name);
    (name.to_string(), ext.to_string())
}

/// Compute the field map of one file. `index` is the file's position in
/// the input list, assigned before any per-file work starts.
pub fn resolve(path: &Path, index: usize, module: &FieldModule) -> Result<FieldMap, EntryError> {
    let (name, ext) = name_parts(path);

    let mut fields = FieldMap::new();
    fields.insert("name", name.as_str());
    fields.insert("ext", ext.as_str());

    let module_fields = module.resolve(path, &name, index)?;
    fields.extend(module_fields);

    tracing::debug!(
        path = %path.display(),
        index,
        module = module.name(),
        fields = fields.len(),
        "resolved fields"
    );

    Ok(fields)
}
