//! Music data block, driver-common addresses and orderlist packing

use sidforge_model::{OrderEntry, OrderList, decode_transpose, encode_transpose};

use crate::error::Sf2Error;
use crate::{ORDERLIST_END, ORDERLIST_LOOP};

/// Payload of the music data block: where the driver keeps its orderlists,
/// sequence slots and sequence pointer tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicDataInfo {
    /// Number of voice tracks (3 for one SID)
    pub track_count: u8,
    /// Base address of the orderlist slots, one slot per voice
    pub orderlist_address: u16,
    /// Base address of the sequence slots
    pub sequence_address: u16,
    /// Address of the sequence pointer low-byte table; the high-byte table
    /// sits one slot above it
    pub sequence_pointers_address: u16,
    pub default_sequence_length: u8,
    pub default_tempo: u8,
}

impl MusicDataInfo {
    pub(crate) const PAYLOAD_SIZE: usize = 9;

    pub(crate) fn parse(payload: &[u8]) -> Result<Self, Sf2Error> {
        if payload.len() < Self::PAYLOAD_SIZE {
            return Err(Sf2Error::TruncatedBlock(crate::BLOCK_MUSIC_DATA));
        }
        Ok(Self {
            track_count: payload[0],
            orderlist_address: u16::from_le_bytes([payload[1], payload[2]]),
            sequence_address: u16::from_le_bytes([payload[3], payload[4]]),
            sequence_pointers_address: u16::from_le_bytes([payload[5], payload[6]]),
            default_sequence_length: payload[7],
            default_tempo: payload[8],
        })
    }

    pub(crate) fn write(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(Self::PAYLOAD_SIZE);
        payload.push(self.track_count);
        payload.extend_from_slice(&self.orderlist_address.to_le_bytes());
        payload.extend_from_slice(&self.sequence_address.to_le_bytes());
        payload.extend_from_slice(&self.sequence_pointers_address.to_le_bytes());
        payload.push(self.default_sequence_length);
        payload.push(self.default_tempo);
        payload
    }
}

/// The driver's fixed entry points and per-voice state cells, read verbatim
/// from its header block. Display and diagnostics only; nothing in the codec
/// branches on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverCommonAddresses {
    pub init: u16,
    pub play: u16,
    pub stop: u16,
    pub tempo: u16,
    pub voice_state: [u16; 3],
    pub voice_orderlist_position: [u16; 3],
    pub voice_sequence_position: [u16; 3],
    pub voice_current_note: [u16; 3],
    pub voice_current_instrument: [u16; 3],
}

impl DriverCommonAddresses {
    /// 19 little-endian words
    pub(crate) const PAYLOAD_SIZE: usize = 38;

    pub(crate) fn parse(payload: &[u8]) -> Result<Self, Sf2Error> {
        if payload.len() < Self::PAYLOAD_SIZE {
            return Err(Sf2Error::TruncatedBlock(crate::BLOCK_DRIVER_COMMON));
        }
        let word = |index: usize| u16::from_le_bytes([payload[index * 2], payload[index * 2 + 1]]);
        let triple = |start: usize| [word(start), word(start + 1), word(start + 2)];
        Ok(Self {
            init: word(0),
            play: word(1),
            stop: word(2),
            tempo: word(3),
            voice_state: triple(4),
            voice_orderlist_position: triple(7),
            voice_sequence_position: triple(10),
            voice_current_note: triple(13),
            voice_current_instrument: triple(16),
        })
    }

    /// Labeled address list in payload order, for display
    pub fn labeled(&self) -> Vec<(String, u16)> {
        let mut entries = vec![
            ("init".to_string(), self.init),
            ("play".to_string(), self.play),
            ("stop".to_string(), self.stop),
            ("tempo".to_string(), self.tempo),
        ];
        let groups: [(&str, &[u16; 3]); 5] = [
            ("state", &self.voice_state),
            ("orderlist pos", &self.voice_orderlist_position),
            ("sequence pos", &self.voice_sequence_position),
            ("note", &self.voice_current_note),
            ("instrument", &self.voice_current_instrument),
        ];
        for (label, addresses) in groups {
            for (voice, &address) in addresses.iter().enumerate() {
                entries.push((format!("voice {} {label}", voice + 1), address));
            }
        }
        entries
    }
}

// =============================================================================
// Orderlist transpose state machine
// =============================================================================

/// Unpack one orderlist column.
///
/// Initial transpose is the no-shift state. Bytes at or above 0x80 update
/// the transpose without emitting a row; smaller bytes emit a
/// `(transpose, sequence)` row without touching the state; the end and loop
/// markers terminate the column.
pub fn unpack_orderlist(bytes: &[u8]) -> OrderList {
    let mut entries = Vec::new();
    let mut transpose = 0i8;

    for &byte in bytes {
        match byte {
            ORDERLIST_LOOP | ORDERLIST_END => break,
            byte if byte >= 0x80 => transpose = decode_transpose(byte),
            sequence => entries.push(OrderEntry {
                transpose,
                sequence,
            }),
        }
    }

    OrderList { entries }
}

/// Pack an orderlist column, the inverse of [`unpack_orderlist`]: a
/// transpose byte is emitted only when the state changes, and the column is
/// closed with the end marker.
pub fn pack_orderlist(orderlist: &OrderList) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(orderlist.len() + 1);
    let mut transpose = 0i8;

    for entry in &orderlist.entries {
        if entry.transpose != transpose {
            bytes.push(encode_transpose(entry.transpose));
            transpose = entry.transpose;
        }
        bytes.push(entry.sequence);
    }

    bytes.push(ORDERLIST_END);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_transpose_rows() {
        let orderlist = unpack_orderlist(&[0xA2, 0x05, 0x0C, 0xFE]);
        assert_eq!(
            orderlist.entries,
            vec![
                OrderEntry {
                    transpose: 2,
                    sequence: 5
                },
                OrderEntry {
                    transpose: 2,
                    sequence: 12
                },
            ]
        );
    }

    #[test]
    fn test_unpack_negative_transpose() {
        let orderlist = unpack_orderlist(&[0xAC, 0x01, 0xA0, 0x02, 0xFF]);
        assert_eq!(orderlist.entries[0].transpose, -4);
        assert_eq!(orderlist.entries[1].transpose, 0);
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let orderlist = unpack_orderlist(&[0x03, 0xA5, 0x04, 0x04, 0xA0, 0x03, 0xFF]);
        let packed = pack_orderlist(&orderlist);
        assert_eq!(packed, vec![0x03, 0xA5, 0x04, 0x04, 0xA0, 0x03, 0xFF]);
        assert_eq!(unpack_orderlist(&packed), orderlist);
    }

    #[test]
    fn test_music_data_info_round_trip() {
        let info = MusicDataInfo {
            track_count: 3,
            orderlist_address: 0x1800,
            sequence_address: 0x1B00,
            sequence_pointers_address: 0x1600,
            default_sequence_length: 16,
            default_tempo: 6,
        };
        assert_eq!(MusicDataInfo::parse(&info.write()).unwrap(), info);
    }

    #[test]
    fn test_driver_common_parse() {
        let mut payload = Vec::new();
        for value in 0u16..19 {
            payload.extend_from_slice(&(0x1000 + value).to_le_bytes());
        }
        let driver = DriverCommonAddresses::parse(&payload).unwrap();
        assert_eq!(driver.init, 0x1000);
        assert_eq!(driver.play, 0x1001);
        assert_eq!(driver.voice_state, [0x1004, 0x1005, 0x1006]);
        assert_eq!(driver.voice_current_instrument, [0x1010, 0x1011, 0x1012]);
        assert_eq!(driver.labeled().len(), 19);
    }

    #[test]
    fn test_driver_common_truncated() {
        assert!(DriverCommonAddresses::parse(&[0u8; 10]).is_err());
    }
}
