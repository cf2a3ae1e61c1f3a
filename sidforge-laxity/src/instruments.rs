//! Instrument table discovery
//!
//! Two strategies, tried in order:
//!
//! 1. Static code analysis: the player indexes its instrument table with
//!    `LDA absolute,Y` instructions, one per record field. Every `0xB9`
//!    opcode's operand address is harvested, and candidate base addresses
//!    are scored by how many of eight consecutive field offsets the code
//!    references. A near-complete score accepts the base.
//! 2. Pattern fallback: scan for runs of 8-byte records whose bytes fall in
//!    plausible numeric ranges, accepting a run of at least three records.
//!
//! When both miss, a small set of hard-coded default instruments is emitted
//! with a warning - never an error.

use hashbrown::HashSet;

use sidforge_model::{INSTRUMENT_BYTES, Instrument, MemoryImage, Warnings};

use crate::scanner::ScanOptions;
use crate::{
    INSTRUMENT_FIELD_COUNT, INSTRUMENT_RUN_MIN, INSTRUMENT_SCORE_MIN, OPCODE_LDA_ABSOLUTE_Y,
    PLAUSIBLE_TABLE_INDEX_MAX,
};

/// Discover the instrument table. Returns the records plus the accepted base
/// address, when one was located.
pub(crate) fn discover(
    image: &MemoryImage,
    warnings: &mut Warnings,
    options: &ScanOptions,
) -> (Vec<Instrument>, Option<u16>) {
    if let Some(base) = code_analysis_base(image) {
        let records = read_records(image, base, options);
        return (records, Some(base));
    }

    if let Some((base, records)) = pattern_fallback(image, options) {
        warnings.push(format!(
            "instrument table located by pattern fallback at ${base:04X}"
        ));
        return (records, Some(base));
    }

    warnings.push("instrument table not found; emitting default instruments");
    (default_instruments(), None)
}

/// Harvest `LDA absolute,Y` operand addresses and score candidate bases.
///
/// Pure scan: the best-scoring base wins, ties broken by lowest address, and
/// only a score of at least [`INSTRUMENT_SCORE_MIN`] of
/// [`INSTRUMENT_FIELD_COUNT`] referenced offsets is accepted.
fn code_analysis_base(image: &MemoryImage) -> Option<u16> {
    let data = image.data();
    let mut referenced: HashSet<u16> = HashSet::new();

    for offset in 0..data.len().saturating_sub(2) {
        if data[offset] == OPCODE_LDA_ABSOLUTE_Y {
            let address = u16::from_le_bytes([data[offset + 1], data[offset + 2]]);
            if image.contains(address) {
                referenced.insert(address);
            }
        }
    }

    let mut best: Option<(usize, u16)> = None;
    for &base in &referenced {
        let score = (0..INSTRUMENT_FIELD_COUNT as u16)
            .filter(|&field| referenced.contains(&base.wrapping_add(field)))
            .count();
        let candidate = (score, base);
        best = Some(match best {
            None => candidate,
            // Highest score first, lowest address on ties
            Some(current) => {
                if candidate.0 > current.0 || (candidate.0 == current.0 && candidate.1 < current.1)
                {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    best.filter(|&(score, _)| score >= INSTRUMENT_SCORE_MIN)
        .map(|(_, base)| base)
}

/// Read consecutive plausible records from an accepted base. The base was
/// accepted on strong evidence, so the first record is kept even when it
/// fails the plausibility check.
fn read_records(image: &MemoryImage, base: u16, options: &ScanOptions) -> Vec<Instrument> {
    let mut records = Vec::new();
    for index in 0..options.max_instruments {
        let record = record_at(image, base.wrapping_add((index * INSTRUMENT_BYTES) as u16));
        if index > 0 && !record_is_plausible(&record.raw) {
            break;
        }
        records.push(record);
    }
    records
}

/// Scan for a run of consecutive plausible 8-byte records, accepting the
/// first run of at least [`INSTRUMENT_RUN_MIN`] records in address order.
fn pattern_fallback(
    image: &MemoryImage,
    options: &ScanOptions,
) -> Option<(u16, Vec<Instrument>)> {
    let data = image.data();

    for offset in 0..data.len().saturating_sub(INSTRUMENT_BYTES) {
        let mut run = 0;
        while run < options.max_instruments {
            let start = offset + run * INSTRUMENT_BYTES;
            let Some(bytes) = data.get(start..start + INSTRUMENT_BYTES) else {
                break;
            };
            let record: [u8; INSTRUMENT_BYTES] = bytes.try_into().unwrap_or_default();
            if !record_is_plausible(&record) {
                break;
            }
            run += 1;
        }
        if run >= INSTRUMENT_RUN_MIN {
            let base = image.address_of(offset);
            let records = (0..run)
                .map(|index| {
                    record_at(image, base.wrapping_add((index * INSTRUMENT_BYTES) as u16))
                })
                .collect();
            return Some((base, records));
        }
    }

    None
}

fn record_at(image: &MemoryImage, address: u16) -> Instrument {
    let bytes = image.bytes(address, INSTRUMENT_BYTES);
    let mut raw = [0u8; INSTRUMENT_BYTES];
    raw.copy_from_slice(&bytes);
    Instrument { raw }
}

/// Plausibility check shared by both strategies: the wave table index must
/// be small, the ADSR bytes must not be the 0xFF/0xFF uninitialized fill,
/// and an all-zero record is empty memory rather than an instrument.
fn record_is_plausible(raw: &[u8; INSTRUMENT_BYTES]) -> bool {
    raw[3] <= PLAUSIBLE_TABLE_INDEX_MAX
        && !(raw[0] == 0xFF && raw[1] == 0xFF)
        && raw.iter().any(|&byte| byte != 0)
}

/// The degraded fallback: a lead, a bass and a percussion-flavored record,
/// enough for the injected project to make sound in the editor.
fn default_instruments() -> Vec<Instrument> {
    vec![
        Instrument {
            raw: [0x08, 0xA9, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00],
        },
        Instrument {
            raw: [0x0A, 0x89, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00],
        },
        Instrument {
            raw: [0x00, 0xF8, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_analysis_scores_consecutive_offsets() {
        // Seven LDA absolute,Y instructions referencing base+0..base+6
        let mut data = vec![0xEAu8; 256];
        for field in 0u16..7 {
            let offset = (field * 3) as usize;
            let address = 0x1080 + field;
            data[offset] = OPCODE_LDA_ABSOLUTE_Y;
            data[offset + 1..offset + 3].copy_from_slice(&address.to_le_bytes());
        }
        // A plausible record at the table base
        data[0x80..0x88].copy_from_slice(&[0x08, 0xA9, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let image = MemoryImage::new(data, 0x1000);
        assert_eq!(code_analysis_base(&image), Some(0x1080));
    }

    #[test]
    fn test_code_analysis_rejects_weak_score() {
        // Only five of eight offsets referenced
        let mut data = vec![0xEAu8; 256];
        for field in 0u16..5 {
            let offset = (field * 3) as usize;
            let address = 0x1080 + field;
            data[offset] = OPCODE_LDA_ABSOLUTE_Y;
            data[offset + 1..offset + 3].copy_from_slice(&address.to_le_bytes());
        }
        let image = MemoryImage::new(data, 0x1000);
        assert_eq!(code_analysis_base(&image), None);
    }

    #[test]
    fn test_pattern_fallback_accepts_run_of_three() {
        let mut data = vec![0xFFu8; 0x40];
        for record in 0..3u8 {
            data.extend_from_slice(&[0x08, 0xA9, 0x41, record, 0, 0, 0, 0]);
        }
        data.resize(256, 0xEA);
        let image = MemoryImage::new(data, 0x1000);
        let (base, records) = pattern_fallback(&image, &ScanOptions::default()).unwrap();
        assert_eq!(base, 0x1040);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].wave_index(), 1);
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        let image = MemoryImage::new(vec![0xEA; 256], 0x1000);
        let mut warnings = Warnings::new();
        let (records, base) = discover(&image, &mut warnings, &ScanOptions::default());
        assert_eq!(base, None);
        assert_eq!(records.len(), 3);
        assert_eq!(warnings.len(), 1);
    }
}
