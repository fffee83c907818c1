//! Fixed byte layout of the save container.
//!
//! Every slot payload is preceded by its own MD5 digest, and the whole
//! header array is preceded by one digest covering all ten headers.

use std::fmt;
use std::ops::Range;

use crate::core_api::{CoreError, CoreErrorCode};

pub const MAX_SLOTS: usize = 10;
pub const CHECKSUM_LEN: usize = 0x10;

pub const SLOT_REGION_START: usize = 0x310;
pub const SLOT_DATA_LEN: usize = 0x280000;

pub const HEADER_ARRAY_START: usize = 0x19003B0;
pub const HEADER_ARRAY_LEN: usize = 0x60000;
pub const HEADER_ARRAY_CHECKSUM_OFFSET: usize = HEADER_ARRAY_START - CHECKSUM_LEN;

pub const HEADER_START: usize = 0x1901D0E;
pub const HEADER_LEN: usize = 0x24C;

pub const ACTIVE_STATUS_START: usize = 0x1901D04;
pub const ACTIVE_BYTE: u8 = 0x01;

pub const OWNER_ID_OFFSET: usize = 0x19003A4;
pub const OWNER_ID_LEN: usize = 8;

pub const NAME_OFFSET_IN_HEADER: usize = 0x0;
pub const NAME_MAX_BYTES: usize = 0x22;
pub const NAME_MAX_CHARS: usize = NAME_MAX_BYTES / 2;
pub const LEVEL_OFFSET_IN_HEADER: usize = 0x22;
pub const SECONDS_PLAYED_OFFSET_IN_HEADER: usize = 0x26;

/// Smallest buffer that covers every slot region and the header array.
pub const MIN_FILE_LEN: usize = max_usize(
    SLOT_REGION_START + MAX_SLOTS * (SLOT_DATA_LEN + CHECKSUM_LEN),
    HEADER_ARRAY_START + HEADER_ARRAY_LEN,
);

const fn max_usize(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn at(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A slot number known to be inside `0..MAX_SLOTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn new(index: usize) -> Result<Self, CoreError> {
        if index >= MAX_SLOTS {
            return Err(CoreError::policy(
                CoreErrorCode::IndexOutOfRange,
                format!(
                    "slot index {index} out of range, expected 0..{}",
                    MAX_SLOTS - 1
                ),
            )
            .in_slot(index));
        }
        Ok(Self(index))
    }

    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..MAX_SLOTS).map(SlotIndex)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn slot_checksum_offset(slot: SlotIndex) -> usize {
    SLOT_REGION_START + slot.0 * (SLOT_DATA_LEN + CHECKSUM_LEN)
}

pub fn slot_data_offset(slot: SlotIndex) -> usize {
    slot_checksum_offset(slot) + CHECKSUM_LEN
}

pub fn header_offset(slot: SlotIndex) -> usize {
    HEADER_START + slot.0 * HEADER_LEN
}

pub fn active_status_offset(slot: SlotIndex) -> usize {
    ACTIVE_STATUS_START + slot.0
}

pub fn slot_checksum_range(slot: SlotIndex) -> ByteRange {
    ByteRange::at(slot_checksum_offset(slot), CHECKSUM_LEN)
}

pub fn slot_data_range(slot: SlotIndex) -> ByteRange {
    ByteRange::at(slot_data_offset(slot), SLOT_DATA_LEN)
}

pub fn header_range(slot: SlotIndex) -> ByteRange {
    ByteRange::at(header_offset(slot), HEADER_LEN)
}

pub fn header_array_range() -> ByteRange {
    ByteRange::at(HEADER_ARRAY_START, HEADER_ARRAY_LEN)
}

pub fn header_array_checksum_range() -> ByteRange {
    ByteRange::at(HEADER_ARRAY_CHECKSUM_OFFSET, CHECKSUM_LEN)
}

pub fn owner_id_range() -> ByteRange {
    ByteRange::at(OWNER_ID_OFFSET, OWNER_ID_LEN)
}

pub fn check_file_len(len: usize) -> Result<(), CoreError> {
    if len < MIN_FILE_LEN {
        return Err(CoreError::structural(
            CoreErrorCode::BufferTooShort,
            format!("save buffer too short: len={len}, need at least {MIN_FILE_LEN}"),
        )
        .at_offset(len));
    }
    Ok(())
}
