//! Scan orchestration

use sidforge_model::{ExtractedMusicData, MAX_SEQUENCES, MAX_SEQUENCE_BYTES, MemoryImage, Warnings};

use crate::error::LaxityError;
use crate::{MIN_IMAGE_BYTES, ORDERLIST_INDEX_MAX, commands, instruments, orderlists, sequences};

/// Tuning knobs for the heuristic scans.
///
/// The defaults reflect the thresholds observed in Laxity player binaries;
/// they exist as options so a caller chasing an unusual player variant can
/// widen them without patching the scanner.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Highest byte accepted as an orderlist sequence index
    pub max_orderlist_index: u8,
    /// Longest accepted sequence in bytes; larger gaps between end markers
    /// are treated as the end of the music data
    pub max_sequence_bytes: usize,
    /// Most sequences kept (the SF2 slot space)
    pub max_sequences: usize,
    /// Most instrument records read from an accepted table base
    pub max_instruments: usize,
    /// Distance from the instrument table base to the command table
    pub command_table_gap: u16,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_orderlist_index: ORDERLIST_INDEX_MAX,
            max_sequence_bytes: MAX_SEQUENCE_BYTES,
            max_sequences: MAX_SEQUENCES,
            max_instruments: 16,
            command_table_gap: commands::COMMAND_TABLE_GAP,
        }
    }
}

/// Scan a memory image with default options.
///
/// # Arguments
/// * `image` - Payload of a SID file, anchored at its load address
///
/// # Returns
/// * `Ok(ExtractedMusicData)` - Normalized extraction plus warnings
/// * `Err(LaxityError)` - Input too small to hold a player
pub fn scan(image: &MemoryImage) -> Result<ExtractedMusicData, LaxityError> {
    scan_with_options(image, &ScanOptions::default())
}

/// Scan a memory image.
///
/// One pass, building the extraction leaf-first: orderlists anchor the
/// sequence scan, sequences tell the command recovery which slots are live,
/// and the instrument base anchors the command table. Each sub-scan
/// degrades to its documented default on a miss; the extraction's warning
/// list records every degradation and every dangling sequence reference.
pub fn scan_with_options(
    image: &MemoryImage,
    options: &ScanOptions,
) -> Result<ExtractedMusicData, LaxityError> {
    if image.len() < MIN_IMAGE_BYTES {
        return Err(LaxityError::InputTooSmall(image.len()));
    }

    let mut warnings = Warnings::new();

    let (orderlists, anchor) = orderlists::discover(image, &mut warnings, options);
    let sequences = sequences::discover(image, anchor, &mut warnings, options);
    let (instruments, instrument_base) = instruments::discover(image, &mut warnings, options);
    let command_table =
        commands::discover(image, &sequences, instrument_base, &mut warnings, options);

    let mut extraction = ExtractedMusicData {
        orderlists,
        sequences,
        instruments,
        command_table,
        warnings,
    };
    extraction.validate_references();

    Ok(extraction)
}
