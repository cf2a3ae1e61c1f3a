//! Whole-scan tests over a synthetic Laxity-style memory image

use sidforge_model::events::SEQUENCE_END;
use sidforge_model::{CommandEntry, MemoryImage};

use crate::{LaxityError, OPCODE_LDA_ABSOLUTE_Y, scan};

/// Build a 512-byte image with the structures the scanner hunts for:
/// indexed instrument loads in the code region, three orderlists, three
/// sequences behind a pointer-table high byte, an instrument table at
/// $1100 and a command entry at $1182.
fn fixture_image() -> MemoryImage {
    let mut data = vec![0xEAu8; 0x200];

    // Player code: LDA $1100+field,Y for each of the eight record fields
    for field in 0u16..8 {
        let offset = (field * 3) as usize;
        data[offset] = OPCODE_LDA_ABSOLUTE_Y;
        data[offset + 1..offset + 3].copy_from_slice(&(0x1100 + field).to_le_bytes());
    }

    // Orderlists, one per voice
    data[32..36].copy_from_slice(&[0x00, 0x01, 0x02, 0xFF]);
    data[36..39].copy_from_slice(&[0x01, 0x02, 0xFF]);
    data[39..43].copy_from_slice(&[0x02, 0x00, 0x01, 0xFF]);

    // Pointer-table high byte, then three packed sequences
    data[43] = 0x1A;
    data[44..50].copy_from_slice(&[0xA1, 0x82, 0x30, 0x7E, 0x00, SEQUENCE_END]);
    data[50..54].copy_from_slice(&[0xA0, 0x20, 0x24, SEQUENCE_END]);
    data[54..57].copy_from_slice(&[0xC1, 0x30, SEQUENCE_END]);

    // Two instrument records; the 0xEA fill ends the run
    data[0x100..0x108].copy_from_slice(&[0x08, 0xA9, 0x41, 0x00, 0x00, 0x00, 0x00, 0x00]);
    data[0x108..0x110].copy_from_slice(&[0x0A, 0x00, 0x41, 0x02, 0x01, 0x00, 0x00, 0x00]);

    // Command 1, two bytes past the command table base at $1180
    data[0x182] = 0x03;
    data[0x183] = 0x40;

    MemoryImage::new(data, 0x1000)
}

#[test]
fn test_full_scan_recovers_all_structures() {
    let extraction = scan(&fixture_image()).unwrap();

    assert_eq!(extraction.orderlists[0].len(), 3);
    assert_eq!(extraction.orderlists[1].len(), 2);
    assert_eq!(extraction.orderlists[2].len(), 3);
    assert_eq!(extraction.orderlists[0].entries[1].sequence, 0x01);

    assert_eq!(extraction.sequences.len(), 3);
    assert_eq!(extraction.sequences[0].address, 0x102C);
    assert_eq!(extraction.sequences[0].bytes, vec![0xA1, 0x82, 0x30, 0x7E, 0x00]);
    assert_eq!(extraction.sequences[2].bytes, vec![0xC1, 0x30]);

    assert_eq!(extraction.instruments.len(), 2);
    assert_eq!(extraction.instruments[0].attack_decay(), 0x08);
    assert_eq!(extraction.instruments[1].wave_index(), 0x02);

    let commands = extraction.command_table.as_ref().unwrap();
    assert_eq!(
        commands.get(1),
        Some(CommandEntry {
            opcode: 0x03,
            param: 0x40
        })
    );

    assert!(extraction.warnings.is_empty());
}

#[test]
fn test_sequence_events_decode() {
    let extraction = scan(&fixture_image()).unwrap();
    let events = extraction.sequences[0].events();
    // Three primaries (note, sustain note, rest) each expanded by duration 2
    assert_eq!(events.len(), 9);
    assert_eq!(events[0].note, 0x30);
    assert_eq!(events[0].duration, 2);
    assert!(events[8].is_rest());
}

#[test]
fn test_too_small_buffer_is_hard_error() {
    let image = MemoryImage::new(vec![0; 255], 0x1000);
    assert_eq!(scan(&image).unwrap_err(), LaxityError::InputTooSmall(255));
}

#[test]
fn test_unrecognizable_image_degrades_with_warnings() {
    let image = MemoryImage::new(vec![0xEA; 300], 0x1000);
    let extraction = scan(&image).unwrap();

    // Degraded but structurally complete: fallback orderlists, default
    // instruments, no sequences, and warnings describing each miss
    assert!(extraction.sequences.is_empty());
    assert_eq!(extraction.instruments.len(), 3);
    assert!(extraction.command_table.is_none());
    for orderlist in &extraction.orderlists {
        assert_eq!(orderlist.len(), 1);
    }
    assert!(!extraction.warnings.is_empty());
}
