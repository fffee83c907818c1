use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use sl2_core::codec::hex_string;
use sl2_core::core_api::{ChecksumReport, ChecksumStatus, SaveSummary, SlotSummary};

pub const BYTES_PER_LINE: usize = 16;
pub const FILE_PREVIEW_BYTES: usize = 1024;
pub const SLOT_PREVIEW_BYTES: usize = 256;

const NAME_COL_WIDTH: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

pub fn render_json(summary: &SaveSummary, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(summary_json(summary)),
    }
}

pub fn render_checksum_json(report: &ChecksumReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("all_valid".to_string(), JsonValue::Bool(report.all_valid()));
    out.insert(
        "header_array".to_string(),
        checksum_status_json(&report.header_array),
    );
    out.insert(
        "slots".to_string(),
        JsonValue::Array(report.slots.iter().map(checksum_status_json).collect()),
    );
    JsonValue::Object(out)
}

fn summary_json(summary: &SaveSummary) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "file_name".to_string(),
        JsonValue::String(summary.file_name.clone()),
    );
    out.insert("file_len".to_string(), JsonValue::from(summary.file_len));
    out.insert(
        "owner_id".to_string(),
        JsonValue::String(summary.owner_id.clone()),
    );
    out.insert(
        "slots".to_string(),
        JsonValue::Array(summary.slots.iter().map(slot_json).collect()),
    );
    out
}

fn slot_json(slot: &SlotSummary) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("index".to_string(), JsonValue::from(slot.index));
    out.insert("active".to_string(), JsonValue::Bool(slot.active));
    out.insert("name".to_string(), JsonValue::String(slot.name.clone()));
    out.insert("level".to_string(), JsonValue::from(slot.level));
    out.insert(
        "seconds_played".to_string(),
        JsonValue::from(slot.seconds_played),
    );
    out.insert(
        "playtime".to_string(),
        JsonValue::String(format_playtime(slot.seconds_played)),
    );
    out.insert(
        "parsing_issues".to_string(),
        JsonValue::Array(
            slot.parsing_issues
                .iter()
                .cloned()
                .map(JsonValue::String)
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

fn checksum_status_json(status: &ChecksumStatus) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "stored".to_string(),
        JsonValue::String(hex_string(&status.stored)),
    );
    out.insert(
        "computed".to_string(),
        JsonValue::String(hex_string(&status.computed)),
    );
    out.insert("valid".to_string(), JsonValue::Bool(status.valid));
    JsonValue::Object(out)
}

pub fn render_slot_table(summary: &SaveSummary) -> String {
    let mut out = String::new();
    writeln!(&mut out, "{}", summary.file_name).expect("writing to String cannot fail");
    writeln!(&mut out, "Owner ID: {}", summary.owner_id).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Active characters: {}/{}",
        summary.active_count(),
        summary.slots.len()
    )
    .expect("writing to String cannot fail");
    out.push('\n');

    for slot in &summary.slots {
        writeln!(&mut out, "{}", format_slot_line(slot)).expect("writing to String cannot fail");
        for issue in &slot.parsing_issues {
            writeln!(&mut out, "      ! {issue}").expect("writing to String cannot fail");
        }
    }
    out
}

pub fn format_slot_line(slot: &SlotSummary) -> String {
    if !slot.active {
        return format!("{:>2}. [empty ] {}", slot.index + 1, slot.name);
    }
    format!(
        "{:>2}. [active] {:<width$} Level: {:<3} | Playtime: {}",
        slot.index + 1,
        slot.name,
        slot.level,
        format_playtime(slot.seconds_played),
        width = NAME_COL_WIDTH
    )
}

pub fn render_slot_detail(slot: &SlotSummary) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Character: {}", slot.name).expect("writing to String cannot fail");
    writeln!(&mut out, "Slot {}", slot.index + 1).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Status: {}",
        if slot.active { "Active" } else { "Inactive" }
    )
    .expect("writing to String cannot fail");
    if slot.active {
        writeln!(&mut out, "Level: {}", slot.level).expect("writing to String cannot fail");
        writeln!(
            &mut out,
            "Playtime: {}",
            format_playtime(slot.seconds_played)
        )
        .expect("writing to String cannot fail");
    }
    if !slot.parsing_issues.is_empty() {
        writeln!(&mut out, "Parsing Issues Noted:").expect("writing to String cannot fail");
        for issue in &slot.parsing_issues {
            writeln!(&mut out, "  - {issue}").expect("writing to String cannot fail");
        }
    }
    out
}

pub fn render_checksum_report(report: &ChecksumReport) -> String {
    let mut out = String::new();
    for (index, status) in report.slots.iter().enumerate() {
        writeln!(
            &mut out,
            "Slot {:>2}      {} {}",
            index + 1,
            status_label(status),
            hex_string(&status.stored)
        )
        .expect("writing to String cannot fail");
    }
    writeln!(
        &mut out,
        "Header array {} {}",
        status_label(&report.header_array),
        hex_string(&report.header_array.stored)
    )
    .expect("writing to String cannot fail");
    out
}

fn status_label(status: &ChecksumStatus) -> &'static str {
    if status.valid { "OK      " } else { "MISMATCH" }
}

/// `{h}h {m}m`; negative values read as zero.
pub fn format_playtime(seconds: i32) -> String {
    let total = seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Classic hex preview: offset, up to 16 bytes, printable ASCII.
pub fn hex_dump(title: &str, bytes: &[u8], limit: Option<usize>) -> String {
    let mut out = String::new();
    if bytes.is_empty() {
        writeln!(&mut out, "{title} (no data)").expect("writing to String cannot fail");
        return out;
    }

    let shown = limit.map_or(bytes.len(), |limit| limit.min(bytes.len()));
    writeln!(
        &mut out,
        "{title} ({shown} bytes shown of {} total)",
        bytes.len()
    )
    .expect("writing to String cannot fail");

    for (line, chunk) in bytes[..shown].chunks(BYTES_PER_LINE).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
            .collect();
        writeln!(
            &mut out,
            "{:08X}  {:<width$}  {ascii}",
            line * BYTES_PER_LINE,
            hex.join(" "),
            width = BYTES_PER_LINE * 3 - 1
        )
        .expect("writing to String cannot fail");
    }

    if shown < bytes.len() {
        writeln!(
            &mut out,
            "... {} more bytes not shown",
            bytes.len() - shown
        )
        .expect("writing to String cannot fail");
    }
    out
}

/// `{stem}_{tag}_{timestamp}.{ext}`; names without an extension get `.sl2`.
pub fn modded_file_name(file_name: &str, tag: &str, timestamp: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (file_name, "sl2"),
    };
    format!("{stem}_{tag}_{timestamp}.{ext}")
}
