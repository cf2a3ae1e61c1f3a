//! Sidforge-Laxity: heuristic scanner for Laxity player music data
//!
//! The Laxity player embeds its note/instrument/command tables, pointer
//! tables and sequence data inside a position-independent 6502 memory image
//! with no format tag. This crate recovers those structures with static
//! structural heuristics - confidence-scored candidate scans over the raw
//! bytes plus recognition of a handful of fixed instruction opcodes - and
//! normalizes them into [`ExtractedMusicData`].
//!
//! No 6502 execution is emulated. Every sub-scan is independently guarded:
//! when a heuristic finds nothing it degrades to a documented default and
//! records a warning, so a conversion always produces some result. The only
//! hard failure is an input buffer too small to plausibly hold a player.
//!
//! # Usage
//!
//! ```ignore
//! use sidforge_laxity::scan;
//!
//! let (image, _meta) = sidforge_sid::parse_sid(&std::fs::read("tune.sid")?)?;
//! let extraction = scan(&image)?;
//! println!("{} sequences", extraction.sequences.len());
//! for warning in extraction.warnings.iter() {
//!     eprintln!("warning: {warning}");
//! }
//! ```

mod commands;
mod error;
mod instruments;
mod orderlists;
mod scanner;
mod sequences;

#[cfg(test)]
mod tests;

pub use error::LaxityError;
pub use scanner::{ScanOptions, scan, scan_with_options};

/// Smallest buffer the scanner accepts; anything below this cannot hold a
/// player plus music data and is rejected outright
pub const MIN_IMAGE_BYTES: usize = 256;

// =============================================================================
// Heuristic thresholds
// =============================================================================
//
// The constants below are tuned against observed Laxity player binaries and
// are not assumed to generalize to unseen player variants.

/// Orderlist candidates are read at most this many bytes before giving up on
/// finding a terminator
pub const ORDERLIST_SCAN_LIMIT: usize = 64;

/// Every byte of an orderlist candidate must be at or below this value
/// (sequence indices are small)
pub const ORDERLIST_INDEX_MAX: u8 = 0x20;

/// Orderlist terminator byte
pub const ORDERLIST_TERMINATOR: u8 = 0xFF;

/// Inclusive range of pointer-table high bytes; a predecessor in this range
/// marks the byte after it as non-sequence data during the backward scan for
/// the first sequence start
pub const POINTER_HIGH_BYTE_MIN: u8 = 0x1A;
pub const POINTER_HIGH_BYTE_MAX: u8 = 0x1F;

/// Highest byte still plausible as note data when classifying a predecessor
/// during the backward scan
pub const PLAUSIBLE_NOTE_MAX: u8 = 0x60;

/// `LDA absolute,Y` opcode, the instruction the player uses to index its
/// instrument table
pub const OPCODE_LDA_ABSOLUTE_Y: u8 = 0xB9;

/// Number of consecutive offsets scored during instrument table discovery
pub const INSTRUMENT_FIELD_COUNT: usize = 8;

/// Minimum of the eight field offsets that must be referenced by indexed
/// loads for a code-analysis candidate to be accepted
pub const INSTRUMENT_SCORE_MIN: usize = 7;

/// Minimum consecutive plausible records for the pattern fallback to accept
/// an instrument table run
pub const INSTRUMENT_RUN_MIN: usize = 3;

/// Highest plausible wave table index inside an instrument record
pub const PLAUSIBLE_TABLE_INDEX_MAX: u8 = 0x3F;
