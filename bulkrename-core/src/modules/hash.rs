use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::str::FromStr;

use super::{read_error, FieldProvider, FileRef, ModuleOptions};
use crate::error::{ConfigError, EntryError};
use crate::fields::FieldMap;
use crate::registry::{ModuleDescriptor, ModuleKind, OptionSpec};

pub(super) const DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: "hash",
    kind: ModuleKind::Hash,
    fields: &["hash"],
    options: &[OptionSpec {
        name: "algorithm",
        default: Some("md5"),
        help: "digest algorithm (md5, sha256)",
    }],
    needs_content: true,
    dynamic_fields: false,
    summary: "hex digest of the file content",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            _ => Err(format!("unsupported algorithm (expected md5 or sha256): {}", s)),
        }
    }
}

#[derive(Debug)]
pub struct HashModule {
    algorithm: HashAlgorithm,
}

impl HashModule {
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hex digest of everything `reader` yields.
    pub fn digest<R: Read>(&self, reader: R) -> io::Result<String> {
        match self.algorithm {
            HashAlgorithm::Md5 => digest_reader::<Md5, _>(reader),
            HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(reader),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(reader: R) -> io::Result<String>
where
    sha2::digest::Output<D>: std::fmt::LowerHex,
{
    let mut reader = BufReader::new(reader);
    let mut hasher = D::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

impl FieldProvider for HashModule {
    const DESCRIPTOR: ModuleDescriptor = DESCRIPTOR;

    fn configure(options: &ModuleOptions) -> Result<Self, ConfigError> {
        let algorithm = options
            .parse::<HashAlgorithm>("algorithm")?
            .unwrap_or_default();
        Ok(Self { algorithm })
    }

    fn resolve(&self, file: FileRef<'_>) -> Result<FieldMap, EntryError> {
        let handle = File::open(file.path).map_err(|e| read_error(&e))?;
        let hash = self.digest(handle).map_err(|e| read_error(&e))?;

        let mut fields = FieldMap::new();
        fields.insert("hash", hash);
        Ok(fields)
    }
}
