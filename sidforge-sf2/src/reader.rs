//! SF2 container reader

use sidforge_model::{
    MAX_SEQUENCES, MemoryImage, OrderList, Sequence, Warnings, events::SEQUENCE_END,
};

use crate::blocks::{Block, parse_blocks};
use crate::error::Sf2Error;
use crate::music::{DriverCommonAddresses, MusicDataInfo, unpack_orderlist};
use crate::tables::{TableDescriptor, parse_descriptors};
use crate::{BLOCK_DRIVER_COMMON, BLOCK_MUSIC_DATA, BLOCK_TABLE_DESCRIPTORS, SF2_MAGIC, SLOT_SIZE};

/// Everything parsed out of an SF2 container, read-only.
///
/// The viewer/exporter side consumes this as-is; the writer parses its
/// template into the same structure to learn the template's true addresses.
#[derive(Debug, Clone)]
pub struct Sf2Structures {
    /// The C64 memory image: every file byte past the load-address word,
    /// anchored at the load address
    pub image: MemoryImage,
    /// All header blocks in file order, unknown types included
    pub blocks: Vec<Block>,
    pub driver: Option<DriverCommonAddresses>,
    pub music: Option<MusicDataInfo>,
    pub tables: Vec<TableDescriptor>,
    /// One unpacked orderlist per voice track
    pub orderlists: Vec<OrderList>,
    pub sequences: Vec<Sequence>,
    pub warnings: Warnings,
}

impl Sf2Structures {
    pub fn load_address(&self) -> u16 {
        self.image.load_address()
    }

    /// Find a table by its type id, falling back to a case-insensitive name
    /// match for templates with renumbered types
    pub fn find_table(&self, table_type: u8, name: &str) -> Option<&TableDescriptor> {
        self.tables
            .iter()
            .find(|t| t.table_type == table_type)
            .or_else(|| {
                self.tables
                    .iter()
                    .find(|t| t.name.eq_ignore_ascii_case(name))
            })
    }

    /// Read a table's cells as rows of bytes, addressed per its descriptor
    pub fn read_table(&self, table: &TableDescriptor) -> Vec<Vec<u8>> {
        (0..table.row_count)
            .map(|row| {
                (0..table.column_count)
                    .map(|col| self.image.byte(table.cell_address(row, col)))
                    .collect()
            })
            .collect()
    }
}

/// Parse an SF2 container.
///
/// # Arguments
/// * `data` - Raw file bytes
///
/// # Returns
/// * `Ok(Sf2Structures)` - Parsed structures plus validation warnings
/// * `Err(Sf2Error)` - Bad magic or damaged block framing
pub fn parse_sf2(data: &[u8]) -> Result<Sf2Structures, Sf2Error> {
    if data.len() < 4 {
        return Err(Sf2Error::TooSmall);
    }
    let load_address = u16::from_le_bytes([data[0], data[1]]);
    let magic = u16::from_le_bytes([data[2], data[3]]);
    if magic != SF2_MAGIC {
        return Err(Sf2Error::InvalidMagic(magic));
    }

    let blocks = parse_blocks(data)?;
    let image = MemoryImage::new(data[2..].to_vec(), load_address);
    let mut warnings = Warnings::new();

    let mut driver = None;
    let mut music = None;
    let mut tables = Vec::new();

    for block in &blocks {
        match block.block_type {
            BLOCK_DRIVER_COMMON => match DriverCommonAddresses::parse(&block.payload) {
                Ok(parsed) => driver = Some(parsed),
                Err(_) => warnings.push("driver-common address block is truncated; ignoring it"),
            },
            BLOCK_MUSIC_DATA => match MusicDataInfo::parse(&block.payload) {
                Ok(parsed) => music = Some(parsed),
                Err(_) => warnings.push("music data block is truncated; ignoring it"),
            },
            BLOCK_TABLE_DESCRIPTORS => match parse_descriptors(&block.payload) {
                Ok(parsed) => tables.extend(parsed),
                Err(_) => warnings.push("table descriptor block is malformed; ignoring it"),
            },
            _ => {}
        }
    }

    let orderlists = match &music {
        Some(music) => read_orderlists(&image, music),
        None => {
            warnings.push("container carries no music data block");
            Vec::new()
        }
    };

    let sequences = match &music {
        Some(music) => read_sequences(&image, music, &orderlists, &mut warnings),
        None => Vec::new(),
    };

    validate_tables(&image, &tables, &mut warnings);

    Ok(Sf2Structures {
        image,
        blocks,
        driver,
        music,
        tables,
        orderlists,
        sequences,
        warnings,
    })
}

/// Unpack one orderlist per voice track; the columns are independent
/// fixed-size slots spaced one slot apart.
fn read_orderlists(image: &MemoryImage, music: &MusicDataInfo) -> Vec<OrderList> {
    (0..music.track_count)
        .map(|voice| {
            let address = music
                .orderlist_address
                .wrapping_add(voice as u16 * SLOT_SIZE as u16);
            unpack_orderlist(&image.bytes(address, SLOT_SIZE))
        })
        .collect()
}

/// Read the sequence slots the orderlists actually reference.
///
/// The orderlists are the authority on how many sequences exist; pointer
/// tables are rewritten wholesale on save and may trail off into stale data.
fn read_sequences(
    image: &MemoryImage,
    music: &MusicDataInfo,
    orderlists: &[OrderList],
    warnings: &mut Warnings,
) -> Vec<Sequence> {
    let highest = orderlists
        .iter()
        .filter_map(OrderList::max_sequence_index)
        .max();
    let Some(highest) = highest else {
        return Vec::new();
    };
    let count = (highest as usize + 1).min(MAX_SEQUENCES);

    (0..count)
        .map(|index| {
            let address = music
                .sequence_address
                .wrapping_add((index * SLOT_SIZE) as u16);
            let slot = image.bytes(address, SLOT_SIZE);
            let bytes = match slot.iter().position(|&b| b == SEQUENCE_END) {
                Some(end) => slot[..end].to_vec(),
                None => {
                    warnings.push(format!(
                        "sequence {index} has no end marker inside its slot"
                    ));
                    slot
                }
            };
            Sequence {
                address,
                bytes,
            }
        })
        .collect()
}

/// Check every declared table stays inside the memory image.
fn validate_tables(image: &MemoryImage, tables: &[TableDescriptor], warnings: &mut Warnings) {
    for table in tables {
        let end = table.address as u32 + table.byte_size() as u32;
        if table.address < image.load_address() || end > image.end_address() {
            warnings.push(format!(
                "table '{}' (${:04X}, {}x{}) extends outside the memory image",
                table.name, table.address, table.row_count, table.column_count
            ));
        }
    }
}
