use std::path::Path;

use crate::config::DIGEST_LEN;
use crate::diagnostics::Violation;
use crate::error::{Error, MetainfoError, Result};
use crate::hashing::{HashOptions, hash_pieces};
use crate::models::{Dict, Document, FileInfo, KeyPath, Value};
use crate::scanner::declared_files;
use crate::validate::{Stage, check};

/// Hash the local content of `doc` and record its sizes and piece digests.
///
/// Files are read in the order the document declares them. Every size and
/// digest is computed before the document is touched, so a failed or
/// cancelled run leaves it unchanged.
pub fn generate(doc: &mut Document, content: &Path, options: &HashOptions) -> Result<()> {
    check(doc, Stage::Content)?;

    let info = doc.info().ok_or_else(missing_info)?;
    let piece_length = piece_length(info)?;
    let files: Vec<FileInfo> = declared_files(info, content)?
        .into_iter()
        .map(|declared| declared.file)
        .collect();
    let total_size: u64 = files.iter().map(|f| f.len).sum();
    if total_size == 0 {
        return Err(Error::EmptyContent(content.to_path_buf()));
    }
    tracing::info!(
        "Hashing {} files ({} bytes) from {}",
        files.len(),
        total_size,
        content.display()
    );

    let pieces = hash_pieces(&files, piece_length, options)?;
    tracing::info!("Generated {} piece digests", pieces.len() / DIGEST_LEN);

    let info = doc.info_mut().ok_or_else(missing_info)?;
    match info.get_mut("files").and_then(Value::as_list_mut) {
        Some(entries) => {
            for (entry, file) in entries.iter_mut().zip(&files) {
                if let Some(entry) = entry.as_dict_mut() {
                    entry.insert("length", file.len);
                }
            }
        }
        None => {
            info.insert("length", total_size);
        }
    }
    info.insert("pieces", pieces);
    Ok(())
}

/// The validated `piece length` of an `info` mapping
pub(crate) fn piece_length(info: &Dict) -> Result<u64, MetainfoError> {
    let value = info.get("piece length").ok_or_else(|| {
        MetainfoError::new(
            KeyPath::root().key("info"),
            Violation::Missing {
                key: "piece length".to_string(),
            },
        )
    })?;
    value
        .as_int()
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            MetainfoError::new(
                KeyPath::root().key("info").key("piece length"),
                Violation::Invalid {
                    value: value.clone(),
                },
            )
        })
}

fn missing_info() -> MetainfoError {
    MetainfoError::new(
        KeyPath::root(),
        Violation::Missing {
            key: "info".to_string(),
        },
    )
}
