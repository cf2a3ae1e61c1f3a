//! Sequence boundary discovery
//!
//! Sequences are `0x7F`-terminated packed byte runs laid out back to back
//! after the orderlists. Every `0x7F` past the orderlist anchor is a
//! candidate end marker; the gap between consecutive markers is a sequence.
//! Only the first sequence needs special treatment: its start is found by
//! scanning backward from its end marker for a duration/instrument token
//! whose predecessor looks like non-sequence data. This asymmetry is
//! inherent to the player's layout.

use sidforge_model::{MemoryImage, Sequence, Warnings, events::SEQUENCE_END};

use crate::scanner::ScanOptions;
use crate::{PLAUSIBLE_NOTE_MAX, POINTER_HIGH_BYTE_MAX, POINTER_HIGH_BYTE_MIN};

/// Discover sequences starting at the given buffer offset (one past the
/// last orderlist).
pub(crate) fn discover(
    image: &MemoryImage,
    anchor: usize,
    warnings: &mut Warnings,
    options: &ScanOptions,
) -> Vec<Sequence> {
    let data = image.data();
    let markers: Vec<usize> = (anchor..data.len())
        .filter(|&offset| data[offset] == SEQUENCE_END)
        .collect();

    let Some(&first_marker) = markers.first() else {
        warnings.push("no sequence end markers found; extraction carries no sequences");
        return Vec::new();
    };

    let first_start = match find_first_start(data, anchor, first_marker) {
        Some(offset) => offset,
        None => {
            warnings.push(
                "could not locate the first sequence start; assuming sequence data \
                 begins right after the orderlists",
            );
            anchor
        }
    };

    let mut sequences = Vec::new();
    let mut segment_start = first_start;
    for &marker in &markers {
        let length = marker - segment_start;
        if length > options.max_sequence_bytes {
            // An implausibly long gap means this marker is stray data past
            // the end of the music, not a sequence terminator
            break;
        }
        if sequences.len() == options.max_sequences {
            warnings.push(format!(
                "more than {} sequences discovered; keeping the first {}",
                options.max_sequences, options.max_sequences
            ));
            break;
        }
        sequences.push(Sequence {
            address: image.address_of(segment_start),
            bytes: data[segment_start..marker].to_vec(),
        });
        segment_start = marker + 1;
    }

    sequences
}

/// Backward scan for the first sequence's start offset.
///
/// Walking back from the end marker, the start is the first duration or
/// instrument token (`0x80-0xAF`) whose predecessor does not read as
/// sequence data: either a pointer-table high byte (`0x1A-0x1F`) or a byte
/// above the plausible note range but below the token range. These
/// thresholds are tuned to observed Laxity binaries.
fn find_first_start(data: &[u8], anchor: usize, marker: usize) -> Option<usize> {
    (anchor..marker)
        .rev()
        .find(|&offset| {
            let byte = data[offset];
            if !(0x80..=0xAF).contains(&byte) {
                return false;
            }
            match offset.checked_sub(1) {
                None => true,
                Some(previous) => is_non_sequence_byte(data[previous]),
            }
        })
}

fn is_non_sequence_byte(byte: u8) -> bool {
    (POINTER_HIGH_BYTE_MIN..=POINTER_HIGH_BYTE_MAX).contains(&byte)
        || (byte > PLAUSIBLE_NOTE_MAX && byte < 0x80)
}
