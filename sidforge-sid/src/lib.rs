//! Sidforge-SID: SID (PSID/RSID) container header reader
//!
//! Parses the outer header of a C64 SID executable image and yields the
//! flat payload as a [`MemoryImage`] anchored at its load address, plus the
//! header metadata. The payload itself is an undifferentiated 6502 memory
//! image; recovering music structures from it is `sidforge-laxity`'s job.
//!
//! # Usage
//!
//! ```ignore
//! use sidforge_sid::parse_sid;
//!
//! let data = std::fs::read("tune.sid")?;
//! let (image, metadata) = parse_sid(&data)?;
//! println!("{} by {}", metadata.name, metadata.author);
//! println!("loads at ${:04X}", image.load_address());
//! ```
//!
//! # Format Reference
//!
//! - SID file format as documented by the High Voltage SID Collection
//! - All numeric header fields are big-endian at fixed offsets

mod error;
mod header;

pub use error::SidError;
pub use header::{SidMagic, SidMetadata, SidV2Fields, parse_sid};

/// Minimum SID header size (version 1)
pub const SID_HEADER_V1_SIZE: usize = 0x76;

/// SID header size for version 2 and later
pub const SID_HEADER_V2_SIZE: usize = 0x7C;

/// Highest header version this reader accepts
pub const SID_MAX_VERSION: u16 = 4;
