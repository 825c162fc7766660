use rayon::prelude::*;

use super::io::hash_piece;
use super::{Digest, HashOptions};
use crate::error::{Error, Result};
use crate::models::FileInfo;
use crate::piece::{calculate_num_pieces, piece_span};

/// Hash every piece of the logical stream formed by `files` (piece-parallel).
///
/// Digests come back in piece order regardless of which worker finished
/// first. When several pieces fail, the error of the lowest piece index is
/// reported.
pub fn piece_digests(
    files: &[FileInfo],
    piece_length: u64,
    options: &HashOptions,
) -> Result<Vec<Digest>> {
    let total_len: u64 = files.iter().map(|f| f.len).sum();
    let num_pieces = calculate_num_pieces(total_len, piece_length);
    let threads = options.threads.unwrap_or_else(num_cpus::get).max(1);

    tracing::debug!(
        pieces = num_pieces,
        piece_length,
        total_len,
        threads,
        "hashing pieces"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let results: Vec<Result<Digest>> = pool.install(|| {
        (0..num_pieces)
            .into_par_iter()
            .map(|piece_idx| {
                if options.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let digest = hash_piece(files, piece_idx, piece_length, total_len)?;
                if let Some(pb) = &options.progress {
                    let span = piece_span(piece_idx, piece_length, total_len);
                    pb.inc(span.end - span.start);
                }
                Ok(digest)
            })
            .collect()
    });

    results.into_iter().collect()
}

/// Hash every piece and concatenate the digests, as stored in `pieces`
pub fn hash_pieces(
    files: &[FileInfo],
    piece_length: u64,
    options: &HashOptions,
) -> Result<Vec<u8>> {
    let digests = piece_digests(files, piece_length, options)?;
    Ok(digests.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DIGEST_LEN;
    use crate::hashing::CancelToken;
    use crate::models::assign_offsets;
    use sha1::{Digest as _, Sha1};
    use std::path::Path;

    fn write(dir: &Path, name: &str, data: &[u8]) -> FileInfo {
        let full_path = dir.join(name);
        std::fs::write(&full_path, data).unwrap();
        FileInfo {
            path: name.into(),
            full_path,
            len: data.len() as u64,
            start_offset: 0,
        }
    }

    #[test]
    fn test_digests_match_sequential_hashing() {
        let tmp = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut files = vec![
            write(tmp.path(), "a", &data[..3_333]),
            write(tmp.path(), "b", &data[3_333..3_333]),
            write(tmp.path(), "c", &data[3_333..]),
        ];
        assign_offsets(&mut files);

        let options = HashOptions::default().with_threads(4);
        let pieces = hash_pieces(&files, 1024, &options).unwrap();

        let expected: Vec<u8> = data
            .chunks(1024)
            .flat_map(|chunk| Sha1::digest(chunk).to_vec())
            .collect();
        assert_eq!(pieces.len(), 10 * DIGEST_LEN);
        assert_eq!(pieces, expected);
    }

    #[test]
    fn test_file_order_changes_pieces() {
        let tmp = tempfile::tempdir().unwrap();
        let a = write(tmp.path(), "a", b"first file");
        let b = write(tmp.path(), "b", b"second file");

        let mut forward = vec![a.clone(), b.clone()];
        let mut backward = vec![b, a];
        assign_offsets(&mut forward);
        assign_offsets(&mut backward);

        let options = HashOptions::default();
        assert_ne!(
            hash_pieces(&forward, 16, &options).unwrap(),
            hash_pieces(&backward, 16, &options).unwrap()
        );
    }

    #[test]
    fn test_cancelled_run_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = vec![write(tmp.path(), "a", &[7u8; 4096])];
        assign_offsets(&mut files);

        let cancel = CancelToken::new();
        cancel.cancel();
        let options = HashOptions::default().with_cancel(cancel);
        assert!(matches!(
            piece_digests(&files, 1024, &options),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_first_failing_piece_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = vec![
            write(tmp.path(), "a", &[1u8; 2048]),
            write(tmp.path(), "b", &[2u8; 2048]),
        ];
        assign_offsets(&mut files);
        std::fs::remove_file(tmp.path().join("a")).unwrap();
        std::fs::remove_file(tmp.path().join("b")).unwrap();

        let err = piece_digests(&files, 1024, &HashOptions::default().with_threads(4)).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("a")));
    }
}
