/// Length of an MD5 checksum in hex characters
pub const MD5_HEX_LEN: usize = 32;

/// Whether `candidate` is a hex-encoded MD5 checksum
pub fn is_valid_md5(candidate: &str) -> bool {
    candidate.len() == MD5_HEX_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}
