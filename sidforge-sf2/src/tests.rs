//! Container round-trip tests over a hand-built template

use sidforge_model::{
    CommandEntry, CommandTable, ExtractedMusicData, Instrument, OrderEntry, OrderList, Sequence,
};

use crate::tables::{TableDescriptor, TableLayout, write_descriptors};
use crate::{
    BLOCK_DRIVER_COMMON, BLOCK_END, BLOCK_MUSIC_DATA, BLOCK_TABLE_DESCRIPTORS, SF2_MAGIC,
    Sf2Error, Sf2Writer, TABLE_TYPE_COMMANDS, TABLE_TYPE_INSTRUMENTS, parse_sf2,
};

const LOAD: u16 = 0x1000;
const ORDERLIST_BASE: u16 = 0x1800;
const SEQUENCE_BASE: u16 = 0x1B00;
const POINTER_BASE: u16 = 0x1600;
const INSTRUMENT_BASE: u16 = 0x1400;
const COMMAND_BASE: u16 = 0x1500;

fn instrument_table() -> TableDescriptor {
    TableDescriptor {
        table_type: TABLE_TYPE_INSTRUMENTS,
        id: 0,
        text_field_size: 11,
        name: "Instruments".into(),
        layout: TableLayout::ColumnMajor,
        flags: 0,
        insert_rule: 0,
        action_rule: 0,
        color_rule: 0,
        address: INSTRUMENT_BASE,
        column_count: 8,
        row_count: 32,
        visible_rows: 16,
    }
}

fn command_table_descriptor() -> TableDescriptor {
    TableDescriptor {
        table_type: TABLE_TYPE_COMMANDS,
        id: 1,
        text_field_size: 8,
        name: "Commands".into(),
        layout: TableLayout::RowMajor,
        flags: 0,
        insert_rule: 0,
        action_rule: 0,
        color_rule: 0,
        address: COMMAND_BASE,
        column_count: 2,
        row_count: 64,
        visible_rows: 16,
    }
}

/// A minimal template: header blocks only, no data regions allocated yet.
/// Slot writes must zero-extend the file.
fn template() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&LOAD.to_le_bytes());
    data.extend_from_slice(&SF2_MAGIC.to_le_bytes());

    // Driver-common block: 19 consecutive addresses
    data.push(BLOCK_DRIVER_COMMON);
    data.push(38);
    for word in 0u16..19 {
        data.extend_from_slice(&(0x1003 + word).to_le_bytes());
    }

    // Music data block
    data.push(BLOCK_MUSIC_DATA);
    data.push(9);
    data.push(3); // track count
    data.extend_from_slice(&ORDERLIST_BASE.to_le_bytes());
    data.extend_from_slice(&SEQUENCE_BASE.to_le_bytes());
    data.extend_from_slice(&POINTER_BASE.to_le_bytes());
    data.push(16); // default sequence length
    data.push(6); // default tempo

    // Table descriptors
    let tables = write_descriptors(&[instrument_table(), command_table_descriptor()]);
    data.push(BLOCK_TABLE_DESCRIPTORS);
    data.push(tables.len() as u8);
    data.extend_from_slice(&tables);

    data.push(BLOCK_END);
    data
}

fn extraction() -> ExtractedMusicData {
    let mut commands = CommandTable::new();
    commands.set(
        1,
        CommandEntry {
            opcode: 0x03,
            param: 0x40,
        },
    );

    ExtractedMusicData {
        orderlists: [
            OrderList {
                entries: vec![
                    OrderEntry {
                        transpose: 0,
                        sequence: 0,
                    },
                    OrderEntry {
                        transpose: 2,
                        sequence: 1,
                    },
                ],
            },
            OrderList {
                entries: vec![OrderEntry {
                    transpose: 0,
                    sequence: 1,
                }],
            },
            OrderList {
                entries: vec![OrderEntry {
                    transpose: -4,
                    sequence: 2,
                }],
            },
        ],
        sequences: vec![
            Sequence {
                address: 0,
                bytes: vec![0xA0, 0x30],
            },
            Sequence {
                address: 0,
                bytes: vec![0x81, 0x32],
            },
            Sequence {
                address: 0,
                bytes: vec![0xC1, 0x24],
            },
        ],
        instruments: vec![
            Instrument {
                raw: [0x08, 0xA9, 0x41, 0x00, 0x01, 0x02, 0x03, 0x00],
            },
            Instrument {
                raw: [0x0A, 0x00, 0x41, 0x02, 0x01, 0x00, 0x00, 0x00],
            },
        ],
        command_table: Some(commands),
        warnings: Default::default(),
    }
}

#[test]
fn test_template_parses_clean() {
    let parsed = parse_sf2(&template()).unwrap();
    assert_eq!(parsed.load_address(), LOAD);
    assert_eq!(parsed.blocks.len(), 3);
    assert!(parsed.driver.is_some());
    assert_eq!(parsed.music.unwrap().orderlist_address, ORDERLIST_BASE);
    assert_eq!(parsed.tables.len(), 2);
}

#[test]
fn test_bad_magic_is_rejected_before_writing() {
    let mut data = template();
    data[2] = 0x00;
    assert!(matches!(
        Sf2Writer::from_template(&data),
        Err(Sf2Error::InvalidMagic(_))
    ));
}

#[test]
fn test_writer_round_trip_recovers_sequences() {
    let source = extraction();
    let mut writer = Sf2Writer::from_template(&template()).unwrap();
    writer.inject(&source);
    let (bytes, warnings) = writer.finish();
    assert!(warnings.is_empty());

    let parsed = parse_sf2(&bytes).unwrap();
    assert_eq!(parsed.sequences.len(), source.sequences.len());
    for (written, original) in parsed.sequences.iter().zip(&source.sequences) {
        assert_eq!(written.bytes, original.bytes);
        assert_eq!(written.events(), original.events());
    }
}

#[test]
fn test_writer_round_trip_recovers_orderlists() {
    let source = extraction();
    let mut writer = Sf2Writer::from_template(&template()).unwrap();
    writer.inject(&source);
    let (bytes, _) = writer.finish();

    let parsed = parse_sf2(&bytes).unwrap();
    assert_eq!(parsed.orderlists.len(), 3);
    for (written, original) in parsed.orderlists.iter().zip(&source.orderlists) {
        assert_eq!(written, original);
    }
}

#[test]
fn test_writer_updates_sequence_pointers() {
    let mut writer = Sf2Writer::from_template(&template()).unwrap();
    writer.inject(&extraction());
    let (bytes, _) = writer.finish();

    let parsed = parse_sf2(&bytes).unwrap();
    for index in 0u16..3 {
        let low = parsed.image.byte(POINTER_BASE + index);
        let high = parsed.image.byte(POINTER_BASE + 0x100 + index);
        let expected = SEQUENCE_BASE + index * 0x100;
        assert_eq!(u16::from_le_bytes([low, high]), expected);
    }
}

#[test]
fn test_writer_places_instruments_column_major() {
    let mut writer = Sf2Writer::from_template(&template()).unwrap();
    writer.inject(&extraction());
    let (bytes, _) = writer.finish();

    let parsed = parse_sf2(&bytes).unwrap();
    let table = parsed
        .find_table(TABLE_TYPE_INSTRUMENTS, "Instruments")
        .unwrap()
        .clone();
    let rows = parsed.read_table(&table);
    assert_eq!(rows[0][..8], [0x08, 0xA9, 0x41, 0x00, 0x01, 0x02, 0x03, 0x00]);
    assert_eq!(rows[1][..8], [0x0A, 0x00, 0x41, 0x02, 0x01, 0x00, 0x00, 0x00]);
    // Column-major placement: row 0 and row 1 of one column are adjacent
    assert_eq!(parsed.image.byte(INSTRUMENT_BASE), 0x08);
    assert_eq!(parsed.image.byte(INSTRUMENT_BASE + 1), 0x0A);
    assert_eq!(parsed.image.byte(INSTRUMENT_BASE + 32), 0xA9);
}

#[test]
fn test_writer_places_commands_row_major() {
    let mut writer = Sf2Writer::from_template(&template()).unwrap();
    writer.inject(&extraction());
    let (bytes, _) = writer.finish();

    let parsed = parse_sf2(&bytes).unwrap();
    assert_eq!(parsed.image.byte(COMMAND_BASE + 2), 0x03);
    assert_eq!(parsed.image.byte(COMMAND_BASE + 3), 0x40);
}

#[test]
fn test_writer_zero_extends_short_template() {
    let template = template();
    let mut writer = Sf2Writer::from_template(&template).unwrap();
    writer.inject(&extraction());
    let (bytes, _) = writer.finish();
    // The sequence slots live far past the template's header-only size
    assert!(bytes.len() > template.len());
    assert_eq!(&bytes[..template.len()], &template[..]);
}

#[test]
fn test_template_without_music_block_warns_but_writes() {
    let mut data = Vec::new();
    data.extend_from_slice(&LOAD.to_le_bytes());
    data.extend_from_slice(&SF2_MAGIC.to_le_bytes());
    data.push(BLOCK_END);

    let mut writer = Sf2Writer::from_template(&data).unwrap();
    writer.inject(&extraction());
    let (bytes, warnings) = writer.finish();
    assert!(!warnings.is_empty());
    assert!(parse_sf2(&bytes).is_ok());
}
