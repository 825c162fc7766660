use std::path::PathBuf;

/// A local file placed on the logical byte stream of a torrent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path relative to the content root, as declared in the metainfo
    pub path: PathBuf,
    /// Absolute or caller-relative path used for reading
    pub full_path: PathBuf,
    /// File size in bytes
    pub len: u64,
    /// The byte offset where this file starts in the logical stream
    pub start_offset: u64,
}

impl FileInfo {
    /// Offset one past the last byte of this file in the logical stream
    pub fn end_offset(&self) -> u64 {
        self.start_offset + self.len
    }
}

/// Assigns consecutive stream offsets in declared order and returns the total size
pub fn assign_offsets<'a>(files: impl IntoIterator<Item = &'a mut FileInfo>) -> u64 {
    let mut offset = 0u64;
    for file in files {
        file.start_offset = offset;
        offset += file.len;
    }
    offset
}
