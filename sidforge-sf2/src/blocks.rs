//! SF2 header block stream
//!
//! The header is a sequence of `(type, size, payload)` tuples starting at
//! file offset 4 and terminated by the end type byte. Types this crate does
//! not understand are preserved raw so an edited container round-trips
//! without losing them.

use crate::error::Sf2Error;
use crate::{BLOCK_END, SF2_BLOCK_STREAM_OFFSET};

/// One header block, raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_type: u8,
    pub payload: Vec<u8>,
}

/// Walk the block stream of a full SF2 file.
pub(crate) fn parse_blocks(data: &[u8]) -> Result<Vec<Block>, Sf2Error> {
    let mut blocks = Vec::new();
    let mut offset = SF2_BLOCK_STREAM_OFFSET;

    loop {
        let Some(&block_type) = data.get(offset) else {
            // A stream without an end marker is framing damage
            return Err(Sf2Error::TruncatedBlock(BLOCK_END));
        };
        if block_type == BLOCK_END {
            break;
        }
        let size = *data
            .get(offset + 1)
            .ok_or(Sf2Error::TruncatedBlock(block_type))? as usize;
        let payload = data
            .get(offset + 2..offset + 2 + size)
            .ok_or(Sf2Error::TruncatedBlock(block_type))?
            .to_vec();
        blocks.push(Block {
            block_type,
            payload,
        });
        offset += 2 + size;
    }

    Ok(blocks)
}
