//! SID header field walk

use sidforge_model::MemoryImage;

use crate::error::SidError;
use crate::{SID_HEADER_V1_SIZE, SID_HEADER_V2_SIZE, SID_MAX_VERSION};

/// Which of the two SID header variants the file carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidMagic {
    Psid,
    Rsid,
}

impl SidMagic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidMagic::Psid => "PSID",
            SidMagic::Rsid => "RSID",
        }
    }
}

/// Fields added by header version 2 and later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidV2Fields {
    pub flags: u16,
    pub start_page: u8,
    pub page_length: u8,
    pub second_sid_address: u8,
    pub third_sid_address: u8,
}

/// Parsed SID header metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidMetadata {
    pub magic: SidMagic,
    pub version: u16,
    pub data_offset: u16,
    /// Resolved load address; when the header field was zero this is the
    /// little-endian word consumed from the start of the payload
    pub load_address: u16,
    pub init_address: u16,
    pub play_address: u16,
    pub songs: u16,
    pub start_song: u16,
    pub speed: u32,
    pub name: String,
    pub author: String,
    pub copyright: String,
    pub v2: Option<SidV2Fields>,
}

/// Parse a SID file into its payload image and header metadata.
///
/// All numeric fields are big-endian at fixed offsets. A header load address
/// of zero means the payload starts with its own little-endian load address,
/// which is consumed and does not become part of the image.
pub fn parse_sid(data: &[u8]) -> Result<(MemoryImage, SidMetadata), SidError> {
    if data.len() < SID_HEADER_V1_SIZE {
        return Err(SidError::TooSmall);
    }

    let magic = match &data[0..4] {
        b"PSID" => SidMagic::Psid,
        b"RSID" => SidMagic::Rsid,
        _ => return Err(SidError::InvalidMagic),
    };

    let version = read_u16_be(data, 0x04);
    if version == 0 || version > SID_MAX_VERSION {
        return Err(SidError::UnsupportedVersion(version));
    }
    if version >= 2 && data.len() < SID_HEADER_V2_SIZE {
        return Err(SidError::TooSmall);
    }

    let data_offset = read_u16_be(data, 0x06);
    let header_load_address = read_u16_be(data, 0x08);
    let init_address = read_u16_be(data, 0x0A);
    let play_address = read_u16_be(data, 0x0C);
    let songs = read_u16_be(data, 0x0E);
    let start_song = read_u16_be(data, 0x10);
    let speed = read_u32_be(data, 0x12);

    let name = read_latin1(&data[0x16..0x36]);
    let author = read_latin1(&data[0x36..0x56]);
    let copyright = read_latin1(&data[0x56..0x76]);

    let v2 = (version >= 2).then(|| SidV2Fields {
        flags: read_u16_be(data, 0x76),
        start_page: data[0x78],
        page_length: data[0x79],
        second_sid_address: data[0x7A],
        third_sid_address: data[0x7B],
    });

    if data_offset as usize > data.len() {
        return Err(SidError::InvalidDataOffset(data_offset));
    }
    let mut payload = &data[data_offset as usize..];

    // A zero load address means the payload carries its own, PRG-style
    let load_address = if header_load_address == 0 {
        if payload.len() < 2 {
            return Err(SidError::TruncatedPayload);
        }
        let embedded = u16::from_le_bytes([payload[0], payload[1]]);
        payload = &payload[2..];
        embedded
    } else {
        header_load_address
    };

    let metadata = SidMetadata {
        magic,
        version,
        data_offset,
        load_address,
        init_address,
        play_address,
        songs,
        start_song,
        speed,
        name,
        author,
        copyright,
        v2,
    };

    Ok((MemoryImage::new(payload.to_vec(), load_address), metadata))
}

fn read_u16_be(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn read_u32_be(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Decode a NUL-padded Latin-1 credit field
fn read_latin1(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..len].iter().map(|&b| char::from(b)).collect()
}
