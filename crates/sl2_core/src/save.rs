use log::{debug, warn};

use crate::codec::{checksum, decode_i32_le, decode_u8_at, decode_utf16le_string};
use crate::core_api::{ChecksumReport, ChecksumStatus, CoreError};
use crate::layout::{
    self, ACTIVE_BYTE, ByteRange, LEVEL_OFFSET_IN_HEADER, NAME_MAX_BYTES, NAME_MAX_CHARS,
    NAME_OFFSET_IN_HEADER, OWNER_ID_LEN, SECONDS_PLAYED_OFFSET_IN_HEADER, SlotIndex,
};

const I32_WIDTH: usize = 4;

/// Metadata for one slot plus the location of its raw spans in the
/// owning [`SaveFile`] buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSlot {
    pub index: SlotIndex,
    pub active: bool,
    pub display_name: String,
    pub level: u8,
    pub seconds_played: i32,
    pub parsing_issues: Vec<String>,
    header_range: ByteRange,
    data_range: ByteRange,
}

impl CharacterSlot {
    pub fn header_range(&self) -> ByteRange {
        self.header_range
    }

    pub fn data_range(&self) -> ByteRange {
        self.data_range
    }
}

/// A parsed container. Immutable once built; edits produce a new buffer
/// that is parsed into a fresh `SaveFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    file_name: String,
    bytes: Vec<u8>,
    owner_id: [u8; OWNER_ID_LEN],
    slots: Vec<CharacterSlot>,
}

/// Borrowed view of one slot: its metadata and the header/payload spans
/// inside the container buffer.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    pub record: &'a CharacterSlot,
    pub header_bytes: &'a [u8],
    pub slot_bytes: &'a [u8],
}

impl SaveFile {
    pub fn parse(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let file_name = file_name.into();
        layout::check_file_len(bytes.len())?;

        let mut owner_id = [0u8; OWNER_ID_LEN];
        owner_id.copy_from_slice(&bytes[layout::owner_id_range().as_range()]);

        let slots: Vec<CharacterSlot> = SlotIndex::all()
            .map(|index| parse_slot(&bytes, index))
            .collect();

        debug!(
            "parsed {file_name}: {} bytes, {} active slots",
            bytes.len(),
            slots.iter().filter(|s| s.active).count()
        );

        Ok(Self {
            file_name,
            bytes,
            owner_id,
            slots,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn owner_id(&self) -> &[u8; OWNER_ID_LEN] {
        &self.owner_id
    }

    pub fn records(&self) -> &[CharacterSlot] {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> Slot<'_> {
        let record = &self.slots[index.get()];
        Slot {
            record,
            header_bytes: &self.bytes[record.header_range.as_range()],
            slot_bytes: &self.bytes[record.data_range.as_range()],
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot<'_>> {
        SlotIndex::all().map(|index| self.slot(index))
    }

    pub fn active_slots(&self) -> impl Iterator<Item = Slot<'_>> {
        self.slots().filter(|slot| slot.record.active)
    }

    /// Recompute every stored digest and compare it with the bytes on disk.
    pub fn verify_checksums(&self) -> ChecksumReport {
        let slots = SlotIndex::all()
            .map(|index| {
                checksum_status(
                    &self.bytes,
                    layout::slot_checksum_range(index),
                    layout::slot_data_range(index),
                )
            })
            .collect();
        let header_array = checksum_status(
            &self.bytes,
            layout::header_array_checksum_range(),
            layout::header_array_range(),
        );

        ChecksumReport {
            slots,
            header_array,
        }
    }
}

fn checksum_status(bytes: &[u8], stored_at: ByteRange, covered: ByteRange) -> ChecksumStatus {
    let mut stored = [0u8; layout::CHECKSUM_LEN];
    stored.copy_from_slice(&bytes[stored_at.as_range()]);
    let computed = checksum(&bytes[covered.as_range()]);
    ChecksumStatus {
        stored,
        computed,
        valid: stored == computed,
    }
}

pub fn empty_slot_name(index: SlotIndex) -> String {
    format!("Character {} (Name Appears Empty)", index.get() + 1)
}

fn parse_slot(bytes: &[u8], index: SlotIndex) -> CharacterSlot {
    let active = bytes[layout::active_status_offset(index)] == ACTIVE_BYTE;
    let header_range = layout::header_range(index);

    let mut slot = CharacterSlot {
        index,
        active,
        display_name: empty_slot_name(index),
        level: 0,
        seconds_played: 0,
        parsing_issues: Vec::new(),
        header_range,
        data_range: layout::slot_data_range(index),
    };

    if active {
        read_active_header(&bytes[header_range.as_range()], &mut slot);
    }

    for issue in &slot.parsing_issues {
        warn!("slot {}: {issue}", index.get() + 1);
    }

    slot
}

/// Fills name, level and playtime from an active slot's header. A field
/// that cannot be decoded renames the slot and is recorded as an issue;
/// issues noted before the failure are kept.
fn read_active_header(header: &[u8], slot: &mut CharacterSlot) {
    if let Err(err) = decode_active_fields(header, slot) {
        slot.display_name = format!("Error Parsing Slot {}", slot.index.get() + 1);
        slot.parsing_issues
            .push(format!("Parsing error: {}", err.message));
    }
}

fn decode_active_fields(header: &[u8], slot: &mut CharacterSlot) -> Result<(), CoreError> {
    let name_end = (NAME_OFFSET_IN_HEADER + NAME_MAX_BYTES).min(header.len());
    let name_bytes = header.get(NAME_OFFSET_IN_HEADER..name_end).unwrap_or_default();
    let decoded = decode_utf16le_string(name_bytes, Some(NAME_MAX_CHARS));
    let name = decoded.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');

    if name.is_empty() {
        slot.parsing_issues
            .push("Character name is empty or unreadable.".to_string());
    } else {
        slot.display_name = name.to_string();
    }

    slot.level = decode_u8_at(header, LEVEL_OFFSET_IN_HEADER)
        .map_err(|e| CoreError::field_decode(format!("level: {}", e.message)))?;
    if slot.level == 0 && !name.is_empty() {
        slot.parsing_issues.push("Character level is 0.".to_string());
    }

    let seconds_end = SECONDS_PLAYED_OFFSET_IN_HEADER + I32_WIDTH;
    let seconds_bytes = header
        .get(SECONDS_PLAYED_OFFSET_IN_HEADER..seconds_end.min(header.len()))
        .unwrap_or_default();
    slot.seconds_played = decode_i32_le(seconds_bytes)
        .map_err(|e| CoreError::field_decode(format!("seconds played: {}", e.message)))?;

    Ok(())
}
