use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub surface: String,
    pub cost: i16,
    pub left_id: u16,
    pub right_id: u16,
}

/// `[surface offset u32][surface len u16][cost i16][left id u16][right id u16]`
pub(crate) const RECORD_SIZE: usize = 12;
/// `[first record u32][record count u32]` per trie key id.
pub(crate) const SLOT_SIZE: usize = 8;

pub(crate) struct RawRecord {
    pub surface_offset: u32,
    pub surface_len: u16,
    pub cost: i16,
    pub left_id: u16,
    pub right_id: u16,
}

impl RawRecord {
    pub fn decode(bytes: &[u8]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        Self {
            surface_offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            surface_len: u16_at(4),
            cost: i16::from_le_bytes([bytes[6], bytes[7]]),
            left_id: u16_at(8),
            right_id: u16_at(10),
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.surface_offset.to_le_bytes());
        out.extend_from_slice(&self.surface_len.to_le_bytes());
        out.extend_from_slice(&self.cost.to_le_bytes());
        out.extend_from_slice(&self.left_id.to_le_bytes());
        out.extend_from_slice(&self.right_id.to_le_bytes());
    }

    pub fn surface_range(&self) -> std::ops::Range<usize> {
        let start = self.surface_offset as usize;
        start..start + self.surface_len as usize
    }
}
