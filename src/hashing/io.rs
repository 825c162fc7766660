use sha1::{Digest as _, Sha1};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use super::Digest;
use crate::config::READ_BUFFER_SIZE;
use crate::error::{Error, Result};
use crate::models::FileInfo;
use crate::piece::{overlapping_files, piece_span};

/// Hash piece `piece_index` of the logical stream formed by `files`.
///
/// The piece may span several files. Each one is opened, read in
/// [`READ_BUFFER_SIZE`] chunks and closed before the next, so memory use is
/// bounded by the buffer rather than the piece length.
pub fn hash_piece(
    files: &[FileInfo],
    piece_index: u64,
    piece_length: u64,
    total_len: u64,
) -> Result<Digest> {
    let span = piece_span(piece_index, piece_length, total_len);
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE.min((span.end - span.start) as usize)];

    for file in &files[overlapping_files(files, &span)] {
        let overlap_start = span.start.max(file.start_offset);
        let overlap_end = span.end.min(file.end_offset());
        if overlap_end <= overlap_start {
            continue;
        }

        let mut f = File::open(&file.full_path).map_err(|e| Error::io(&file.full_path, e))?;
        f.seek(SeekFrom::Start(overlap_start - file.start_offset))
            .map_err(|e| Error::io(&file.full_path, e))?;

        let mut remaining = overlap_end - overlap_start;
        while remaining > 0 {
            let chunk = remaining.min(buffer.len() as u64) as usize;
            f.read_exact(&mut buffer[..chunk])
                .map_err(|e| Error::io(&file.full_path, e))?;
            hasher.update(&buffer[..chunk]);
            remaining -= chunk as u64;
        }
    }

    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assign_offsets;
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

    fn sha1(data: &[u8]) -> Digest {
        Sha1::digest(data).into()
    }

    #[test]
    fn test_piece_spanning_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = vec![
            write(tmp.path(), "a", b"hello "),
            write(tmp.path(), "empty", b""),
            write(tmp.path(), "b", b"world"),
        ];
        let total = assign_offsets(&mut files);

        assert_eq!(hash_piece(&files, 0, 8, total).unwrap(), sha1(b"hello wo"));
        assert_eq!(hash_piece(&files, 1, 8, total).unwrap(), sha1(b"rld"));
    }

    #[test]
    fn test_truncated_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = vec![write(tmp.path(), "a", b"short")];
        files[0].len = 50;
        let total = assign_offsets(&mut files);

        let err = hash_piece(&files, 0, 32, total).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("a")));
    }
}
