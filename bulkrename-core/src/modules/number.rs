use super::{FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind, OptionSpec};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "number",
    kind: ModuleKind::Number,
    fields: &["number"],
    options: &[
        OptionSpec {
            name: "start",
            default: Some("0"),
            help: "number given to the first file",
        },
        OptionSpec {
            name: "pad",
            default: Some("0"),
            help: "minimum digit count, zero padded",
        },
    ],
    needs_content: false,
    dynamic_fields: false,
    summary: "sequential number by input position",
};

/// Numbers files by input position. The value is a pure function of the
/// index assigned before resolution starts, so a file that fails later
/// still consumes its number and parallel resolution stays deterministic.
#[derive(Debug)]
pub struct NumberModule {
    start: i64,
    pad: usize,
}

impl NumberModule {
    pub fn number_for(&self, index: usize) -> i64 {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        self.start.saturating_add(offset)
    }

    fn render(&self, value: i64) -> String {
        if value < 0 {
            format!("-{:0width$}", value.unsigned_abs(), width = self.pad)
        } else {
            format!("{:0width$}", value, width = self.pad)
        }
    }
}

impl FieldProvider for NumberModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(options: &ModuleOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            start: options.parse::<i64>("start")?.unwrap_or(0),
            pad: options.parse::<usize>("pad")?.unwrap_or(0),
        })
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let mut fields = FieldMap::new();
        fields.insert("number", self.render(self.number_for(file.index)));
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn number(options: ModuleOptions, index: usize) -> String {
        let module = NumberModule::configure(&options).unwrap();
        let fields = module
            .resolve(FileRef {
                path: Path::new("ignored.txt"),
                stem: "ignored",
                index,
            })
            .unwrap();
        fields.get("number").unwrap().to_string()
    }

    #[test]
    fn test_start_plus_index() {
        assert_eq!(number(ModuleOptions::new(), 0), "0");
        assert_eq!(number(ModuleOptions::new(), 7), "7");
        assert_eq!(number(ModuleOptions::new().with("start", "10"), 2), "12");
    }

    #[test]
    fn test_negative_start() {
        assert_eq!(number(ModuleOptions::new().with("start", "-2"), 0), "-2");
        assert_eq!(number(ModuleOptions::new().with("start", "-2"), 2), "0");
    }

    #[test]
    fn test_padding() {
        let options = ModuleOptions::new().with("pad", "3");
        assert_eq!(number(options.clone(), 4), "004");
        assert_eq!(number(options.clone(), 1234), "1234");
        assert_eq!(number(options.with("start", "-5"), 0), "-005");
    }

    #[test]
    fn test_file_is_never_touched() {
        // Resolution works for paths that don't exist.
        assert_eq!(number(ModuleOptions::new().with("start", "1"), 0), "1");
    }
}
