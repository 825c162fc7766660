use std::ops::Range;

use crate::config::{LARGEST_PIECE_EXP, MAX_PIECE_EXP, MIN_PIECE_EXP, PIECE_LENGTH_THRESHOLDS};
use crate::models::FileInfo;

/// Pick a piece length exponent (2^N) from the total content size
pub fn calculate_piece_length(total_size: u64) -> u32 {
    PIECE_LENGTH_THRESHOLDS
        .iter()
        .find(|(max_size, _)| total_size <= *max_size)
        .map_or(LARGEST_PIECE_EXP, |(_, power)| *power)
}

/// Keep a requested exponent within the supported range
pub fn clamp_piece_exp(power: u32) -> u32 {
    power.clamp(MIN_PIECE_EXP, MAX_PIECE_EXP)
}

/// Number of pieces covering `total_size` bytes; the last one may be short
pub fn calculate_num_pieces(total_size: u64, piece_length: u64) -> u64 {
    total_size.div_ceil(piece_length)
}

/// Byte range of piece `index` on the logical stream
pub fn piece_span(index: u64, piece_length: u64, total_size: u64) -> Range<u64> {
    let start = index.saturating_mul(piece_length).min(total_size);
    let end = start.saturating_add(piece_length).min(total_size);
    start..end
}

/// Indices into `files` of the files overlapping `span`.
///
/// `files` must be in stream order. Zero-length files never overlap.
pub fn overlapping_files(files: &[FileInfo], span: &Range<u64>) -> Range<usize> {
    let first = files.partition_point(|f| f.end_offset() <= span.start);
    let last = files.partition_point(|f| f.start_offset < span.end);
    first..last.max(first)
}
