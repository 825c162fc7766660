//! Checking a populated document against local content.

use std::path::Path;

use crate::config::DIGEST_LEN;
use crate::diagnostics::Violation;
use crate::error::{MetainfoError, Result};
use crate::generate::piece_length;
use crate::hashing::{HashOptions, piece_digests};
use crate::models::{Document, FileInfo, KeyPath, Value};
use crate::piece::{overlapping_files, piece_span};
use crate::scanner::{DeclaredFile, declared_files_with};
use crate::validate::{Stage, check};

/// How thoroughly [`reconcile`] compares against local content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Depth {
    /// Compare recorded sizes with filesystem metadata only
    #[default]
    Sizes,
    /// Also rehash the content and compare every piece digest
    Pieces,
}

/// Compare the sizes, and optionally the piece digests, recorded in `doc`
/// with the local content below `content`.
///
/// Files are compared in declared order and the first mismatch is reported.
pub fn reconcile(
    doc: &Document,
    content: &Path,
    depth: Depth,
    options: &HashOptions,
) -> Result<()> {
    check(doc, Stage::Complete)?;
    let Some(info) = doc.info() else {
        return Ok(());
    };

    let declared = declared_files_with(info, content, check_size)?;
    tracing::debug!("Sizes of {} files match {}", declared.len(), content.display());

    if depth == Depth::Sizes {
        return Ok(());
    }

    let piece_length = piece_length(info)?;
    let recorded = info.get("pieces").and_then(Value::as_bytes).unwrap_or_default();
    let files: Vec<FileInfo> = declared.into_iter().map(|d| d.file).collect();
    let digests = piece_digests(&files, piece_length, options)?;
    verify_digests(recorded, &digests, &files, piece_length, content)?;

    tracing::info!("All {} pieces match {}", digests.len(), content.display());
    Ok(())
}

fn verify_digests(
    recorded: &[u8],
    digests: &[[u8; DIGEST_LEN]],
    files: &[FileInfo],
    piece_length: u64,
    content: &Path,
) -> Result<(), MetainfoError> {
    let pieces_path = KeyPath::root().key("info").key("pieces");
    let recorded_count = recorded.len() / DIGEST_LEN;
    if recorded_count != digests.len() {
        return Err(MetainfoError::new(
            pieces_path,
            Violation::PieceCountMismatch {
                recorded: recorded_count,
                actual: digests.len(),
                local: content.to_path_buf(),
            },
        ));
    }

    let total_len: u64 = files.iter().map(|f| f.len).sum();
    let mismatch = recorded
        .chunks_exact(DIGEST_LEN)
        .zip(digests)
        .position(|(expected, actual)| expected != actual.as_slice());

    match mismatch {
        None => Ok(()),
        Some(index) => {
            let span = piece_span(index as u64, piece_length, total_len);
            let local = files[overlapping_files(files, &span)]
                .iter()
                .find(|f| f.len > 0)
                .map_or_else(|| content.to_path_buf(), |f| f.full_path.clone());
            Err(MetainfoError::new(
                pieces_path,
                Violation::CorruptPiece { index, local },
            ))
        }
    }
}

fn check_size(entry: &DeclaredFile) -> Result<()> {
    let Some(recorded) = &entry.recorded else {
        return Ok(());
    };
    if !size_matches(recorded, entry.file.len) {
        return Err(MetainfoError::new(
            entry.length_path.clone(),
            Violation::SizeMismatch {
                recorded: recorded.clone(),
                actual: entry.file.len,
                local: entry.file.full_path.clone(),
            },
        )
        .into());
    }
    Ok(())
}

fn size_matches(recorded: &Value, actual: u64) -> bool {
    match recorded {
        Value::Int(n) => u64::try_from(*n).is_ok_and(|n| n == actual),
        Value::Float(f) => *f == actual as f64,
        _ => false,
    }
}
