use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};

use super::path::KeyPath;
use super::value::{Dict, Document, Value};
use crate::codec;
use crate::diagnostics::Violation;
use crate::config::DIGEST_LEN;
use crate::error::{Error, MetainfoError, Result};
use crate::generate::generate;
use crate::hashing::HashOptions;
use crate::reconcile::{Depth, reconcile};
use crate::validate::validate;

/// A metainfo document together with the local content it describes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Torrent {
    pub metainfo: Document,
    /// The file (single-file) or directory (multi-file) holding the content
    pub content: Option<PathBuf>,
}

impl Torrent {
    pub fn new(metainfo: Document) -> Self {
        Self {
            metainfo,
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<PathBuf>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Parse and validate a bencoded torrent
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let torrent = Self::new(codec::decode(bytes)?);
        torrent.validate()?;
        Ok(torrent)
    }

    /// Read and validate a `.torrent` file
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(&bytes)
    }

    pub fn validate(&self) -> Result<(), MetainfoError> {
        validate(&self.metainfo)
    }

    /// Hash the local content and record sizes and `pieces`
    pub fn generate(&mut self, options: &HashOptions) -> Result<()> {
        let content = self.content.clone().ok_or(Error::NoContent)?;
        generate(&mut self.metainfo, &content, options)
    }

    /// Compare the document with its local content
    pub fn verify(&self, depth: Depth, options: &HashOptions) -> Result<()> {
        let content = self.content.as_deref().ok_or(Error::NoContent)?;
        reconcile(&self.metainfo, content, depth, options)
    }

    /// Check completeness, reconcile sizes if the content is known, and encode
    pub fn dump(&self) -> Result<Vec<u8>> {
        codec::dump(&self.metainfo, self.content.as_deref())
    }

    /// Write the encoded torrent to `path`; refuses to replace an existing
    /// file unless `overwrite` is set
    pub fn write(&self, path: &Path, overwrite: bool) -> Result<()> {
        let bytes = self.dump()?;
        let mut options = fs::File::options();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(path).map_err(|e| Error::io(path, e))?;
        std::io::Write::write_all(&mut file, &bytes).map_err(|e| Error::io(path, e))
    }

    /// SHA-1 of the bencoded `info` mapping
    pub fn info_hash(&self) -> Result<[u8; DIGEST_LEN]> {
        let info = self.info().ok_or_else(|| {
            MetainfoError::new(
                KeyPath::root(),
                Violation::Missing {
                    key: "info".to_string(),
                },
            )
        })?;
        let bytes = codec::encode_dict(info)?;
        Ok(Sha1::digest(&bytes).into())
    }

    pub fn info(&self) -> Option<&Dict> {
        self.metainfo.info()
    }

    pub fn name(&self) -> Option<&str> {
        self.info()?.get("name")?.as_str()
    }

    pub fn piece_length(&self) -> Option<u64> {
        self.info()?
            .get("piece length")?
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
    }

    pub fn piece_count(&self) -> usize {
        self.info()
            .and_then(|info| info.get("pieces"))
            .and_then(Value::as_bytes)
            .map_or(0, |p| p.len() / DIGEST_LEN)
    }

    pub fn is_private(&self) -> bool {
        self.info()
            .and_then(|info| info.get("private"))
            .is_some_and(Value::is_truthy)
    }

    /// File paths and recorded sizes, in declared order
    pub fn files(&self) -> Vec<(Vec<String>, u64)> {
        let Some(info) = self.info() else {
            return Vec::new();
        };
        match info.get("files").and_then(Value::as_list) {
            Some(entries) => entries
                .iter()
                .filter_map(Value::as_dict)
                .map(|entry| {
                    let path = entry
                        .get("path")
                        .and_then(Value::as_list)
                        .unwrap_or_default()
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                    (path, recorded_size(entry.get("length")))
                })
                .collect(),
            None => vec![(
                self.name().map(str::to_string).into_iter().collect(),
                recorded_size(info.get("length")),
            )],
        }
    }

    pub fn total_size(&self) -> u64 {
        self.files().iter().map(|(_, len)| len).sum()
    }

    /// Announce URLs grouped in tiers; a bare `announce` forms the first tier
    /// unless `announce-list` already lists it
    pub fn trackers(&self) -> Vec<Vec<String>> {
        let root = self.metainfo.root();
        let mut tiers: Vec<Vec<String>> = root
            .get("announce-list")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_list)
            .map(|tier| tier.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .filter(|tier: &Vec<String>| !tier.is_empty())
            .collect();
        if let Some(announce) = root.get("announce").and_then(Value::as_str) {
            if !announce.is_empty() && !tiers.iter().flatten().any(|url| url == announce) {
                tiers.insert(0, vec![announce.to_string()]);
            }
        }
        tiers
    }
}

fn recorded_size(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Int(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Value::Float(f)) if *f >= 0.0 => *f as u64,
        _ => 0,
    }
}

/// Configuration options for building a torrent
#[derive(Debug, Clone, Default)]
pub struct TorrentOptions {
    /// Piece length as a power of two; chosen from the content size if unset
    pub piece_length: Option<u32>,
    pub private: bool,
    pub comment: Option<String>,
    /// Announce tiers; URLs within one entry are comma-separated
    pub announce: Vec<String>,
    pub web_seed: Vec<String>,
    pub source_string: Option<String>,
    pub no_date: bool,
    pub creation_date: Option<i64>,
    pub name: Option<String>,
    pub exclude: Vec<String>,
}
