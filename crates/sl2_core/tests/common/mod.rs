#![allow(dead_code)]

use sl2_core::codec::checksum;
use sl2_core::layout::{self, MIN_FILE_LEN, OWNER_ID_LEN, SlotIndex};

pub const SOURCE_OWNER: [u8; OWNER_ID_LEN] = [0x11, 0x22, 0x33, 0x44, 0x01, 0x00, 0x10, 0x01];
pub const TARGET_OWNER: [u8; OWNER_ID_LEN] = [0x99, 0x88, 0x77, 0x66, 0x01, 0x00, 0x10, 0x01];

/// Builds a synthetic container of the minimum size with fields written at
/// their layout offsets.
pub struct SaveBuilder {
    bytes: Vec<u8>,
}

impl SaveBuilder {
    pub fn new(owner_id: [u8; OWNER_ID_LEN]) -> Self {
        let mut bytes = vec![0u8; MIN_FILE_LEN];
        bytes[layout::owner_id_range().as_range()].copy_from_slice(&owner_id);
        Self { bytes }
    }

    /// Marks `slot` active, writes its header fields and fills its payload
    /// with a slot-specific pattern.
    pub fn character(mut self, slot: usize, name: &str, level: u8, seconds: i32) -> Self {
        let index = slot_index(slot);
        self = self.status_byte(slot, 1);
        self.bytes[layout::header_range(index).as_range()].fill(0);
        self = self.raw_name(slot, &utf16le(name));
        let header = layout::header_offset(index);
        self.bytes[header + layout::LEVEL_OFFSET_IN_HEADER] = level;
        let seconds_at = header + layout::SECONDS_PLAYED_OFFSET_IN_HEADER;
        self.bytes[seconds_at..seconds_at + 4].copy_from_slice(&seconds.to_le_bytes());
        // Non-zero tail so header copies are observable.
        self.bytes[header + 0x100] = 0xC0 + slot as u8;
        self.fill_payload(slot)
    }

    pub fn raw_name(mut self, slot: usize, name_bytes: &[u8]) -> Self {
        let header = layout::header_offset(slot_index(slot));
        self.bytes[header..header + name_bytes.len()].copy_from_slice(name_bytes);
        self
    }

    pub fn status_byte(mut self, slot: usize, value: u8) -> Self {
        self.bytes[layout::active_status_offset(slot_index(slot))] = value;
        self
    }

    pub fn fill_payload(mut self, slot: usize) -> Self {
        let range = layout::slot_data_range(slot_index(slot));
        for (i, byte) in self.bytes[range.as_range()].iter_mut().enumerate() {
            *byte = ((i * 7 + slot * 3) % 251) as u8;
        }
        self
    }

    /// Writes `id` into the payload of `slot` at each relative offset.
    pub fn embed_in_payload(mut self, slot: usize, id: &[u8], offsets: &[usize]) -> Self {
        let start = layout::slot_data_offset(slot_index(slot));
        for &offset in offsets {
            self.bytes[start + offset..start + offset + id.len()].copy_from_slice(id);
        }
        self
    }

    /// Writes every stored digest so the container verifies. The header-array
    /// digest goes first because it sits inside the last slot's payload.
    pub fn sealed(mut self) -> Self {
        let header_digest = checksum(&self.bytes[layout::header_array_range().as_range()]);
        self.bytes[layout::header_array_checksum_range().as_range()]
            .copy_from_slice(&header_digest);
        for index in SlotIndex::all() {
            let digest = checksum(&self.bytes[layout::slot_data_range(index).as_range()]);
            self.bytes[layout::slot_checksum_range(index).as_range()].copy_from_slice(&digest);
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn slot_index(slot: usize) -> SlotIndex {
    SlotIndex::new(slot).expect("fixture slot should be in range")
}

pub fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

/// A source file with characters in slots 0 and 1, the latter carrying the
/// source owner id in several places.
pub fn source_save() -> Vec<u8> {
    SaveBuilder::new(SOURCE_OWNER)
        .character(0, "Melina", 12, 3_600)
        .character(1, "Tarnished", 150, 512_345)
        .embed_in_payload(1, &SOURCE_OWNER, &[0, 0x40, 0x1_0000, 0x27_FFF8])
        .build()
}

/// A target file with one character in slot 0 and slot 3 left empty.
pub fn target_save() -> Vec<u8> {
    SaveBuilder::new(TARGET_OWNER)
        .character(0, "Ranni", 80, 90_000)
        .embed_in_payload(0, &TARGET_OWNER, &[0x200])
        .build()
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}
