use imagesize::ImageError;

use super::{FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "image",
    kind: ModuleKind::Image,
    fields: &["width", "height", "ratio"],
    options: &[],
    needs_content: true,
    dynamic_fields: false,
    summary: "pixel dimensions read from the image header",
};

#[derive(Debug)]
pub struct ImageModule;

/// `width:height` reduced by their greatest common divisor, e.g. `16:9`.
pub fn aspect_ratio(width: usize, height: usize) -> String {
    let divisor = gcd(width, height);
    if divisor == 0 {
        return format!("{}:{}", width, height);
    }
    format!("{}:{}", width / divisor, height / divisor)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn fields_for(size: imagesize::ImageSize) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("width", size.width.to_string());
    fields.insert("height", size.height.to_string());
    fields.insert("ratio", aspect_ratio(size.width, size.height));
    fields
}

fn entry_error(err: ImageError) -> EntryError {
    match err {
        ImageError::IoError(e) => EntryError::Read(e.to_string()),
        other => EntryError::UnsupportedImage(other.to_string()),
    }
}

impl FieldProvider for ImageModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(_options: &ModuleOptions) -> Result<Self, ConfigError> {
        Ok(Self)
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        imagesize::size(file.path)
            .map(fields_for)
            .map_err(entry_error)
    }
}
