use std::fs;
use ttf_parser::{name_id, Face};

use super::{read_error, FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "font",
    kind: ModuleKind::Font,
    fields: &["family", "subfamily", "fullname", "postscript", "weight", "style"],
    options: &[],
    needs_content: true,
    dynamic_fields: false,
    summary: "names and style from TrueType/OpenType tables",
};

/// Name table records exposed as fields. Missing records render empty.
const NAME_FIELDS: &[(&str, u16)] = &[
    ("family", name_id::FAMILY),
    ("subfamily", name_id::SUBFAMILY),
    ("fullname", name_id::FULL_NAME),
    ("postscript", name_id::POST_SCRIPT_NAME),
];

#[derive(Debug)]
pub struct FontModule;

/// Fields for a font file's raw bytes. Collections use their first face.
pub fn font_fields(data: &[u8]) -> Result<FieldMap, EntryError> {
    let face = Face::parse(data, 0).map_err(|e| EntryError::UnsupportedFont(e.to_string()))?;

    let mut fields = FieldMap::new();
    for (field, id) in NAME_FIELDS {
        let value = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == *id)
            .find_map(|name| name.to_string())
            .unwrap_or_default();
        fields.insert(*field, value);
    }

    fields.insert("weight", face.weight().to_number().to_string());
    let style = match face.style() {
        ttf_parser::Style::Normal => "normal",
        ttf_parser::Style::Italic => "italic",
        ttf_parser::Style::Oblique => "oblique",
    };
    fields.insert("style", style);

    Ok(fields)
}

impl FieldProvider for FontModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(_options: &ModuleOptions) -> Result<Self, ConfigError> {
        Ok(Self)
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let data = fs::read(file.path).map_err(|e| read_error(&e))?;
        font_fields(&data)
    }
}
