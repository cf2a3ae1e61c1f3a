//! SF2 container error types

/// Errors that can occur when parsing an SF2 container.
///
/// Only malformed container framing is fatal. Missing or odd music
/// structures inside a well-framed container degrade to warnings on the
/// parsed result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Sf2Error {
    /// File too small to contain the load address and magic word
    #[error("file too small to be an SF2 container")]
    TooSmall,
    /// Magic word mismatch
    #[error("invalid SF2 magic word: 0x{0:04X}")]
    InvalidMagic(u16),
    /// Block stream ran past the end of the file
    #[error("truncated SF2 block (type 0x{0:02X})")]
    TruncatedBlock(u8),
    /// Table descriptor record ran past the end of its block
    #[error("truncated table descriptor record")]
    TruncatedDescriptor,
}
