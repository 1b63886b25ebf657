use std::fs::File;
use std::io::Read;

use super::{read_error, FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "mime",
    kind: ModuleKind::Mime,
    fields: &["mime"],
    options: &[],
    needs_content: true,
    dynamic_fields: false,
    summary: "extension guessed from the content signature",
};

/// Signatures are all found within this prefix.
const SNIFF_LEN: usize = 8192;

/// Guesses an extension (with its leading dot) from magic bytes. An
/// unrecognized signature yields an empty field, never an error.
#[derive(Debug)]
pub struct MimeModule;

/// Extension for a content buffer, e.g. `.png`. Empty when unknown.
pub fn sniff_extension(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| format!(".{}", kind.extension()))
        .unwrap_or_default()
}

impl FieldProvider for MimeModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(_options: &ModuleOptions) -> Result<Self, ConfigError> {
        Ok(Self)
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let mut head = Vec::with_capacity(SNIFF_LEN);
        File::open(file.path)
            .and_then(|f| f.take(SNIFF_LEN as u64).read_to_end(&mut head))
            .map_err(|e| read_error(&e))?;
        let mime = sniff_extension(&head);

        if mime.is_empty() {
            tracing::debug!(path = %file.path.display(), "content type not recognized");
        }

        let mut fields = FieldMap::new();
        fields.insert("mime", mime);
        Ok(fields)
    }
}
