use serde::{Deserialize, Serialize};

use crate::layout::CHECKSUM_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSummary {
    pub index: usize,
    pub active: bool,
    pub name: String,
    pub level: u8,
    pub seconds_played: i32,
    pub parsing_issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveSummary {
    pub file_name: String,
    pub file_len: usize,
    pub owner_id: String,
    pub slots: Vec<SlotSummary>,
}

impl SaveSummary {
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumStatus {
    pub stored: [u8; CHECKSUM_LEN],
    pub computed: [u8; CHECKSUM_LEN],
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumReport {
    pub slots: Vec<ChecksumStatus>,
    pub header_array: ChecksumStatus,
}

impl ChecksumReport {
    pub fn all_valid(&self) -> bool {
        self.header_array.valid && self.slots.iter().all(|status| status.valid)
    }

    pub fn invalid_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, status)| (!status.valid).then_some(index))
            .collect()
    }
}
