use log::debug;

use crate::codec::{checksum, replace_all_in_place};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{self, ACTIVE_BYTE, HEADER_LEN, SLOT_DATA_LEN, SlotIndex};
use crate::save::{SaveFile, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransplantOutcome {
    pub bytes: Vec<u8>,
    pub target_slot: SlotIndex,
    pub owner_id_substitutions: usize,
}

/// Copy `record` into `target_slot_index` of `target` and return the new file
/// buffer. Neither container is modified.
pub fn transplant(
    record: &Slot<'_>,
    target_slot_index: usize,
    source: &SaveFile,
    target: &SaveFile,
) -> Result<Vec<u8>, CoreError> {
    transplant_with_report(record, target_slot_index, source, target).map(|out| out.bytes)
}

pub fn transplant_with_report(
    record: &Slot<'_>,
    target_slot_index: usize,
    source: &SaveFile,
    target: &SaveFile,
) -> Result<TransplantOutcome, CoreError> {
    let target_slot = SlotIndex::new(target_slot_index)?;

    let source_owner = source.owner_id();
    let target_owner = target.owner_id();
    if source_owner.len() != target_owner.len() {
        return Err(CoreError::policy(
            CoreErrorCode::LengthMismatch,
            format!(
                "owner id width differs: source={}, target={}",
                source_owner.len(),
                target_owner.len()
            ),
        ));
    }
    check_span_len(record.slot_bytes.len(), SLOT_DATA_LEN, "slot payload")?;
    check_span_len(record.header_bytes.len(), HEADER_LEN, "header")?;
    layout::check_file_len(target.bytes().len())?;

    let mut out = target.bytes().to_vec();

    let data_range = layout::slot_data_range(target_slot);
    let payload = &mut out[data_range.as_range()];
    payload.copy_from_slice(record.slot_bytes);
    let owner_id_substitutions = replace_all_in_place(payload, source_owner, target_owner)?;
    let slot_digest = checksum(payload);

    out[layout::header_range(target_slot).as_range()].copy_from_slice(record.header_bytes);
    out[layout::active_status_offset(target_slot)] = ACTIVE_BYTE;
    out[layout::slot_checksum_range(target_slot).as_range()].copy_from_slice(&slot_digest);

    let header_digest = checksum(&out[layout::header_array_range().as_range()]);
    out[layout::header_array_checksum_range().as_range()].copy_from_slice(&header_digest);

    debug!(
        "transplanted slot {} of {} into slot {} of {}: {owner_id_substitutions} owner id substitutions",
        record.record.index.get() + 1,
        source.file_name(),
        target_slot.get() + 1,
        target.file_name()
    );

    Ok(TransplantOutcome {
        bytes: out,
        target_slot,
        owner_id_substitutions,
    })
}

fn check_span_len(actual: usize, expected: usize, label: &str) -> Result<(), CoreError> {
    if actual != expected {
        return Err(CoreError::structural(
            CoreErrorCode::LengthMismatch,
            format!("{label} has {actual} bytes, expected {expected}"),
        ));
    }
    Ok(())
}
