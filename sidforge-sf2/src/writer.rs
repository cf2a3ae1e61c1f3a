//! SF2 template injector
//!
//! Merges an extraction into a known-good template image. The template's own
//! header blocks are parsed first and are the only source of pointer-table
//! and data-region addresses; nothing here hard-codes an address. All slot
//! writes go to a copy of the template buffer, zero-extended when the slots
//! run past the template's current size.

use sidforge_model::{ExtractedMusicData, MAX_SEQUENCES, Warnings, events::SEQUENCE_END};

use crate::error::Sf2Error;
use crate::music::pack_orderlist;
use crate::reader::{Sf2Structures, parse_sf2};
use crate::{SLOT_SIZE, TABLE_TYPE_COMMANDS, TABLE_TYPE_INSTRUMENTS};

/// Writes an [`ExtractedMusicData`] into fixed slots of a template SF2 image.
#[derive(Debug)]
pub struct Sf2Writer {
    template: Sf2Structures,
    buffer: Vec<u8>,
    warnings: Warnings,
}

impl Sf2Writer {
    /// Parse the template. A template failing the magic check is rejected
    /// here, before any writing begins.
    pub fn from_template(data: &[u8]) -> Result<Self, Sf2Error> {
        let template = parse_sf2(data)?;
        Ok(Self {
            template,
            buffer: data.to_vec(),
            warnings: Warnings::new(),
        })
    }

    /// Inject the extraction: orderlists and sequences into their slots with
    /// pointer-table updates, instruments and commands into the template's
    /// declared tables. Anything the template does not describe is skipped
    /// with a warning; injection itself never fails.
    pub fn inject(&mut self, extraction: &ExtractedMusicData) {
        self.inject_orderlists(extraction);
        self.inject_sequences(extraction);
        self.inject_instruments(extraction);
        self.inject_commands(extraction);
    }

    /// Consume the writer, returning the output file bytes and the warnings
    /// gathered while injecting.
    pub fn finish(self) -> (Vec<u8>, Warnings) {
        (self.buffer, self.warnings)
    }

    // =========================================================================
    // Slot writes
    // =========================================================================

    fn inject_orderlists(&mut self, extraction: &ExtractedMusicData) {
        let Some(music) = self.template.music else {
            self.warnings
                .push("template has no music data block; skipping orderlists");
            return;
        };

        let voices = (music.track_count as usize).min(extraction.orderlists.len());
        for voice in 0..voices {
            let mut packed = pack_orderlist(&extraction.orderlists[voice]);
            if packed.len() > SLOT_SIZE {
                self.warnings.push(format!(
                    "voice {} orderlist exceeds its slot; truncating",
                    voice + 1
                ));
                packed.truncate(SLOT_SIZE - 1);
                packed.push(crate::ORDERLIST_END);
            }
            let address = music
                .orderlist_address
                .wrapping_add((voice * SLOT_SIZE) as u16);
            self.write_at_address(address, &packed);
        }
    }

    fn inject_sequences(&mut self, extraction: &ExtractedMusicData) {
        let Some(music) = self.template.music else {
            self.warnings
                .push("template has no music data block; skipping sequences");
            return;
        };

        if extraction.sequences.len() > MAX_SEQUENCES {
            self.warnings.push(format!(
                "{} sequences exceed the {} slots; dropping the rest",
                extraction.sequences.len(),
                MAX_SEQUENCES
            ));
        }

        for (index, sequence) in extraction.sequences.iter().take(MAX_SEQUENCES).enumerate() {
            // Laxity sequences are already in the shared token grammar, so
            // the bytes go in verbatim plus the slot's own end marker
            let mut bytes = sequence.bytes.clone();
            if bytes.len() > SLOT_SIZE - 1 {
                self.warnings.push(format!(
                    "sequence {index} is {} bytes, larger than its slot; truncating",
                    bytes.len()
                ));
                bytes.truncate(SLOT_SIZE - 1);
            }
            bytes.push(SEQUENCE_END);

            let slot_address = music
                .sequence_address
                .wrapping_add((index * SLOT_SIZE) as u16);
            self.write_at_address(slot_address, &bytes);

            // Pointer tables: low bytes at the table address, high bytes one
            // slot above, entry i pointing at base + i*256
            let low_address = music.sequence_pointers_address.wrapping_add(index as u16);
            let high_address = low_address.wrapping_add(SLOT_SIZE as u16);
            self.write_at_address(low_address, &[(slot_address & 0xFF) as u8]);
            self.write_at_address(high_address, &[(slot_address >> 8) as u8]);
        }
    }

    // =========================================================================
    // Table writes
    // =========================================================================

    fn inject_instruments(&mut self, extraction: &ExtractedMusicData) {
        if extraction.instruments.is_empty() {
            return;
        }
        let Some(table) = self
            .template
            .find_table(TABLE_TYPE_INSTRUMENTS, "Instruments")
            .cloned()
        else {
            self.warnings
                .push("template declares no instrument table; skipping instruments");
            return;
        };

        if extraction.instruments.len() > table.row_count as usize {
            self.warnings.push(format!(
                "{} instruments exceed the table's {} rows; dropping the rest",
                extraction.instruments.len(),
                table.row_count
            ));
        }

        // Translate the 8-byte record into the table's declared dimensions,
        // truncating to its column count and addressing per its own layout
        let columns = (table.column_count as usize).min(sidforge_model::INSTRUMENT_BYTES);
        for (row, instrument) in extraction
            .instruments
            .iter()
            .take(table.row_count as usize)
            .enumerate()
        {
            for (col, &byte) in instrument.raw.iter().take(columns).enumerate() {
                let address = table.cell_address(row as u16, col as u16);
                self.write_at_address(address, &[byte]);
            }
        }
    }

    fn inject_commands(&mut self, extraction: &ExtractedMusicData) {
        let Some(commands) = &extraction.command_table else {
            return;
        };
        let Some(table) = self
            .template
            .find_table(TABLE_TYPE_COMMANDS, "Commands")
            .cloned()
        else {
            self.warnings
                .push("template declares no command table; skipping commands");
            return;
        };
        if table.column_count < 2 {
            self.warnings.push(format!(
                "command table '{}' has {} columns, need 2; skipping commands",
                table.name, table.column_count
            ));
            return;
        }

        for (index, entry) in commands.iter() {
            if index as u16 >= table.row_count {
                self.warnings.push(format!(
                    "command {index} is outside the table's {} rows; skipping it",
                    table.row_count
                ));
                continue;
            }
            self.write_at_address(table.cell_address(index as u16, 0), &[entry.opcode]);
            self.write_at_address(table.cell_address(index as u16, 1), &[entry.param]);
        }
    }

    // =========================================================================
    // Buffer plumbing
    // =========================================================================

    /// Map a memory address to its file offset: the buffer is the load
    /// address word followed by the image based at the load address.
    fn file_offset(&self, address: u16) -> Option<usize> {
        (address as usize)
            .checked_sub(self.template.load_address() as usize)
            .map(|offset| offset + 2)
    }

    fn write_at_address(&mut self, address: u16, bytes: &[u8]) {
        let Some(offset) = self.file_offset(address) else {
            self.warnings.push(format!(
                "address ${address:04X} is below the template's load address; skipping write"
            ));
            return;
        };
        let end = offset + bytes.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[offset..end].copy_from_slice(bytes);
    }
}
