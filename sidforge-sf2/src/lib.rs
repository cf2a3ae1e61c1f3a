//! Sidforge-SF2: SF2 project container codec
//!
//! The SF2 container is the project file of an external C64 tracker editor:
//! a 2-byte load address, a magic word, a stream of typed header blocks, and
//! a C64 memory image holding the driver plus its music data tables. This
//! crate parses the container into normalized structures and injects an
//! [`ExtractedMusicData`](sidforge_model::ExtractedMusicData) into a
//! known-good template, producing a loadable project file.
//!
//! Both reading and writing go through the same block/table codec; the
//! writer never hard-codes an address the template's own descriptors can
//! provide.
//!
//! # Usage
//!
//! ```ignore
//! use sidforge_sf2::{Sf2Writer, parse_sf2};
//!
//! let structures = parse_sf2(&std::fs::read("project.sf2")?)?;
//! println!("{} tables", structures.tables.len());
//!
//! let mut writer = Sf2Writer::from_template(&std::fs::read("template.sf2")?)?;
//! writer.inject(&extraction);
//! let (bytes, warnings) = writer.finish();
//! std::fs::write("out.sf2", bytes)?;
//! ```

mod blocks;
mod error;
mod music;
mod reader;
mod tables;
mod writer;

#[cfg(test)]
mod tests;

pub use blocks::Block;
pub use error::Sf2Error;
pub use music::{DriverCommonAddresses, MusicDataInfo, pack_orderlist, unpack_orderlist};
pub use reader::{Sf2Structures, parse_sf2};
pub use tables::{TableDescriptor, TableLayout};
pub use writer::Sf2Writer;

// =============================================================================
// Container constants
// =============================================================================

/// Magic word following the load address, little-endian
pub const SF2_MAGIC: u16 = 0x1337;

/// File offset where the block stream begins (after load address + magic)
pub const SF2_BLOCK_STREAM_OFFSET: usize = 4;

/// Block stream terminator type byte
pub const BLOCK_END: u8 = 0xFF;

/// Driver-common address table block
pub const BLOCK_DRIVER_COMMON: u8 = 0x01;

/// Music data description block
pub const BLOCK_MUSIC_DATA: u8 = 0x02;

/// Table descriptor list block
pub const BLOCK_TABLE_DESCRIPTORS: u8 = 0x03;

/// Size of one sequence or orderlist slot in the memory image
pub const SLOT_SIZE: usize = 0x100;

/// Orderlist column terminator
pub const ORDERLIST_END: u8 = 0xFF;

/// Alternate orderlist terminator (loop marker)
pub const ORDERLIST_LOOP: u8 = 0xFE;

// =============================================================================
// Well-known table types
// =============================================================================

/// Instrument table type id
pub const TABLE_TYPE_INSTRUMENTS: u8 = 0x00;

/// Command table type id
pub const TABLE_TYPE_COMMANDS: u8 = 0x01;

/// Wave table type id
pub const TABLE_TYPE_WAVE: u8 = 0x02;

/// Pulse table type id
pub const TABLE_TYPE_PULSE: u8 = 0x03;

/// Filter table type id
pub const TABLE_TYPE_FILTER: u8 = 0x04;

/// Hard-restart table type id
pub const TABLE_TYPE_HR: u8 = 0x05;
