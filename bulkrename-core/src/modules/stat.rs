use chrono::{DateTime, Utc};
use std::fs::{self, Metadata};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{read_error, FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind, OptionSpec};

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "stat",
    kind: ModuleKind::Stat,
    fields: &[
        "mode", "inode", "device", "nlink", "uid", "gid", "size", "atime", "mtime", "ctime",
    ],
    options: &[OptionSpec {
        name: "time-format",
        default: Some(DEFAULT_TIME_FORMAT),
        help: "strftime format for atime/mtime/ctime (UTC)",
    }],
    needs_content: false,
    dynamic_fields: false,
    summary: "file metadata from stat(2)",
};

#[derive(Debug)]
pub struct StatModule {
    time_format: String,
}

impl StatModule {
    fn timestamp(&self, secs: i64, nanos: u32) -> String {
        DateTime::<Utc>::from_timestamp(secs, nanos)
            .map(|t| t.format(&self.time_format).to_string())
            .unwrap_or_default()
    }

    #[cfg_attr(unix, allow(dead_code))]
    fn system_time(&self, time: std::io::Result<SystemTime>) -> String {
        let Ok(time) = time else {
            return String::new();
        };
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => self.timestamp(
                i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
                d.subsec_nanos(),
            ),
            Err(e) => {
                let d = e.duration();
                self.timestamp(-i64::try_from(d.as_secs()).unwrap_or(i64::MAX), 0)
            },
        }
    }

    #[cfg(unix)]
    fn collect(&self, meta: &Metadata, fields: &mut FieldMap) {
        use std::os::unix::fs::MetadataExt;

        fields.insert("mode", format!("{:o}", meta.mode()));
        fields.insert("inode", meta.ino().to_string());
        fields.insert("device", meta.dev().to_string());
        fields.insert("nlink", meta.nlink().to_string());
        fields.insert("uid", meta.uid().to_string());
        fields.insert("gid", meta.gid().to_string());
        fields.insert("size", meta.size().to_string());
        fields.insert("atime", self.timestamp(meta.atime(), nsec(meta.atime_nsec())));
        fields.insert("mtime", self.timestamp(meta.mtime(), nsec(meta.mtime_nsec())));
        fields.insert("ctime", self.timestamp(meta.ctime(), nsec(meta.ctime_nsec())));
    }

    #[cfg(not(unix))]
    fn collect(&self, meta: &Metadata, fields: &mut FieldMap) {
        let mode = if meta.permissions().readonly() { "444" } else { "644" };
        fields.insert("mode", mode);
        fields.insert("inode", "0");
        fields.insert("device", "0");
        fields.insert("nlink", "1");
        fields.insert("uid", "0");
        fields.insert("gid", "0");
        fields.insert("size", meta.len().to_string());
        fields.insert("atime", self.system_time(meta.accessed()));
        fields.insert("mtime", self.system_time(meta.modified()));
        fields.insert("ctime", self.system_time(meta.created()));
    }
}

#[cfg(unix)]
fn nsec(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl FieldProvider for StatModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(options: &ModuleOptions) -> Result<Self, ConfigError> {
        let time_format = options
            .get("time-format")
            .unwrap_or(DEFAULT_TIME_FORMAT)
            .to_string();

        // chrono only reports bad specifiers while formatting.
        let items = chrono::format::StrftimeItems::new(&time_format);
        if items.into_iter().any(|item| matches!(item, chrono::format::Item::Error)) {
            return Err(ConfigError::InvalidOption {
                option: "time-format".to_string(),
                value: time_format,
                reason: "invalid strftime specifier".to_string(),
            });
        }

        Ok(Self { time_format })
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let meta = fs::metadata(file.path).map_err(|e| read_error(&e))?;
        let mut fields = FieldMap::new();
        self.collect(&meta, &mut fields);
        Ok(fields)
    }
}
