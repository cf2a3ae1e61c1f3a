//! Command table recovery
//!
//! The command table has no discoverable shape of its own; it sits at a
//! fixed distance past the instrument table. Only the slots actually
//! referenced by `0xC0-0xFF` tokens inside the discovered sequences are
//! read, so uninitialized player memory never turns into phantom commands.

use hashbrown::HashSet;

use sidforge_model::{
    CommandEntry, CommandTable, MemoryImage, Sequence, Warnings,
    events::{COMMAND_INDEX_MASK, COMMAND_TOKEN, FILLER_BYTE},
};

use crate::scanner::ScanOptions;

/// Byte distance from the instrument table base to the command table
/// (sixteen 8-byte instrument slots). Tuned to observed Laxity binaries,
/// not assumed to generalize.
pub(crate) const COMMAND_TABLE_GAP: u16 = 0x80;

/// Read the command table entries referenced by the discovered sequences.
pub(crate) fn discover(
    image: &MemoryImage,
    sequences: &[Sequence],
    instrument_base: Option<u16>,
    warnings: &mut Warnings,
    options: &ScanOptions,
) -> Option<CommandTable> {
    let referenced = referenced_indices(sequences);
    if referenced.is_empty() {
        return None;
    }

    let Some(instrument_base) = instrument_base else {
        warnings.push(
            "sequences reference commands but no instrument table was found \
             to anchor the command table; skipping it",
        );
        return None;
    };

    let base = instrument_base.wrapping_add(options.command_table_gap);
    let mut table = CommandTable::new();
    for index in referenced {
        let address = base.wrapping_add(index as u16 * 2);
        table.set(
            index,
            CommandEntry {
                opcode: image.byte(address),
                param: image.byte(address.wrapping_add(1)),
            },
        );
    }

    Some(table)
}

/// Command indices referenced by raw sequence bytes. The filler byte sits
/// inside the command token range but never selects a command.
fn referenced_indices(sequences: &[Sequence]) -> HashSet<u8> {
    sequences
        .iter()
        .flat_map(|sequence| sequence.bytes.iter())
        .filter(|&&byte| byte >= COMMAND_TOKEN && byte != FILLER_BYTE)
        .map(|&byte| byte & COMMAND_INDEX_MASK)
        .collect()
}
