//! SID header parsing error types

/// Errors that can occur when reading a SID container header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SidError {
    /// File too small to contain a SID header
    #[error("file too small to contain a SID header")]
    TooSmall,
    /// Invalid magic string (not "PSID" or "RSID")
    #[error("invalid SID magic bytes")]
    InvalidMagic,
    /// Unsupported header version
    #[error("unsupported SID header version: {0}")]
    UnsupportedVersion(u16),
    /// Header data offset points outside the file
    #[error("SID data offset 0x{0:04X} is outside the file")]
    InvalidDataOffset(u16),
    /// Payload too small to carry its embedded load address
    #[error("SID payload truncated before the embedded load address")]
    TruncatedPayload,
}
