mod common;

use common::{
    SOURCE_OWNER, SaveBuilder, TARGET_OWNER, count_occurrences, slot_index, source_save,
    target_save,
};
use sl2_core::codec::checksum;
use sl2_core::core_api::{CoreErrorCode, ErrorKind};
use sl2_core::layout::{self, MAX_SLOTS};
use sl2_core::save::SaveFile;
use sl2_core::transplant::{transplant, transplant_with_report};

fn parse(name: &str, bytes: Vec<u8>) -> SaveFile {
    SaveFile::parse(name, bytes).expect("fixture should parse")
}

#[test]
fn transplant_fills_empty_target_slot() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());
    let record = source.slot(slot_index(1));

    let bytes = transplant(&record, 3, &source, &target).expect("transplant should succeed");
    assert_eq!(bytes.len(), target.bytes().len());

    let updated = parse("target.sl2", bytes);
    let slot = updated.slot(slot_index(3)).record;
    assert!(slot.active);
    assert_eq!(slot.display_name, "Tarnished");
    assert_eq!(slot.level, 150);
    assert_eq!(slot.seconds_played, 512_345);

    let kept = updated.slot(slot_index(0)).record;
    assert_eq!(kept.display_name, "Ranni");
}

#[test]
fn transplant_only_touches_the_target_status_byte() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());
    assert_eq!(target.bytes()[layout::active_status_offset(slot_index(3))], 0x00);

    let bytes = transplant(&source.slot(slot_index(1)), 3, &source, &target)
        .expect("transplant should succeed");

    for index in layout::SlotIndex::all() {
        let offset = layout::active_status_offset(index);
        if index.get() == 3 {
            assert_eq!(bytes[offset], 0x01);
        } else {
            assert_eq!(bytes[offset], target.bytes()[offset], "slot {index}");
        }
    }
}

#[test]
fn transplant_rewrites_every_source_owner_id() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());
    let record = source.slot(slot_index(1));
    assert_eq!(count_occurrences(record.slot_bytes, &SOURCE_OWNER), 4);

    let outcome = transplant_with_report(&record, 3, &source, &target)
        .expect("transplant should succeed");
    assert_eq!(outcome.owner_id_substitutions, 4);
    assert_eq!(outcome.target_slot, slot_index(3));

    let payload = &outcome.bytes[layout::slot_data_range(slot_index(3)).as_range()];
    assert_eq!(count_occurrences(payload, &SOURCE_OWNER), 0);
    assert_eq!(count_occurrences(payload, &TARGET_OWNER), 4);
}

#[test]
fn transplant_copies_header_verbatim() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());
    let record = source.slot(slot_index(1));

    let bytes = transplant(&record, 3, &source, &target).expect("transplant should succeed");
    assert_eq!(
        &bytes[layout::header_range(slot_index(3)).as_range()],
        record.header_bytes
    );
}

#[test]
fn transplant_writes_valid_checksums() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());

    let bytes = transplant(&source.slot(slot_index(1)), 3, &source, &target)
        .expect("transplant should succeed");

    let data = &bytes[layout::slot_data_range(slot_index(3)).as_range()];
    let stored = &bytes[layout::slot_checksum_range(slot_index(3)).as_range()];
    assert_eq!(stored, checksum(data));

    let header_array = &bytes[layout::header_array_range().as_range()];
    let stored_header = &bytes[layout::header_array_checksum_range().as_range()];
    assert_eq!(stored_header, checksum(header_array));

    let report = parse("target.sl2", bytes).verify_checksums();
    assert!(report.slots[3].valid);
    assert!(report.header_array.valid);
}

#[test]
fn transplant_into_self_round_trips() {
    let original = source_save();
    let source = parse("self.sl2", original.clone());
    let target = parse("self.sl2", original);
    let record = source.slot(slot_index(1));

    let bytes = transplant(&record, 1, &source, &target).expect("transplant should succeed");
    let updated = parse("self.sl2", bytes);
    let slot = updated.slot(slot_index(1));

    assert_eq!(slot.slot_bytes, record.slot_bytes);
    assert_eq!(slot.header_bytes, record.header_bytes);
    assert!(updated.verify_checksums().slots[1].valid);
}

#[test]
fn transplant_does_not_mutate_inputs() {
    let source_bytes = source_save();
    let target_bytes = target_save();
    let source = parse("source.sl2", source_bytes.clone());
    let target = parse("target.sl2", target_bytes.clone());

    let bytes = transplant(&source.slot(slot_index(1)), 3, &source, &target)
        .expect("transplant should succeed");

    assert_ne!(bytes, target_bytes);
    assert_eq!(source.bytes(), source_bytes.as_slice());
    assert_eq!(target.bytes(), target_bytes.as_slice());
}

#[test]
fn transplant_rejects_out_of_range_slot() {
    let source = parse("source.sl2", source_save());
    let target_bytes = target_save();
    let target = parse("target.sl2", target_bytes.clone());

    let err = transplant(&source.slot(slot_index(1)), MAX_SLOTS, &source, &target)
        .expect_err("slot 10 should be rejected");
    assert_eq!(err.code, CoreErrorCode::IndexOutOfRange);
    assert_eq!(err.kind, ErrorKind::PolicyViolation);
    assert_eq!(target.bytes(), target_bytes.as_slice());
}

#[test]
fn transplant_accepts_inactive_source_and_activates_target() {
    let source = parse("source.sl2", source_save());
    let target = parse("target.sl2", target_save());
    let inactive = source.slot(slot_index(7));
    assert!(!inactive.record.active);

    let bytes = transplant(&inactive, 3, &source, &target).expect("core does not gate on activity");
    assert_eq!(bytes[layout::active_status_offset(slot_index(3))], 0x01);
}

#[test]
fn transplant_overwrites_an_occupied_slot() {
    let source = parse("source.sl2", source_save());
    let target = parse(
        "target.sl2",
        SaveBuilder::new(TARGET_OWNER)
            .character(2, "Millicent", 60, 7_200)
            .build(),
    );

    let bytes = transplant(&source.slot(slot_index(0)), 2, &source, &target)
        .expect("transplant should succeed");
    let updated = parse("target.sl2", bytes);
    let slot = updated.slot(slot_index(2));

    assert_eq!(slot.record.display_name, "Melina");
    assert_eq!(slot.slot_bytes, source.slot(slot_index(0)).slot_bytes);
}
