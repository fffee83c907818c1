use serde::{Deserialize, Serialize};
use sl2_core::core_api::{CoreError, CoreErrorCode, Engine};
use sl2_render::{
    JsonStyle, SLOT_PREVIEW_BYTES, hex_dump, render_checksum_json, render_json,
    render_slot_detail,
};
use wasm_bindgen::prelude::*;

const DEFAULT_FILE_NAME: &str = "ER0000.sl2";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebOptions {
    pub file_name: Option<String>,
    pub preview_bytes: Option<usize>,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        let code = match err.code {
            CoreErrorCode::IndexOutOfRange => "invalid_slot",
            CoreErrorCode::InactiveSource => "inactive_source",
            CoreErrorCode::BufferTooShort
            | CoreErrorCode::InsufficientLength
            | CoreErrorCode::FieldDecode
            | CoreErrorCode::Io => "unsupported_file",
            CoreErrorCode::LengthMismatch => "transplant_failed",
        };
        WebError::new(code, err.to_string())
    }
}

/// Parse a save and return its slot summary as pretty JSON.
#[wasm_bindgen]
pub fn parse_save(save_bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    parse_save_impl(save_bytes, &parsed_options).map_err(|err| err.to_js_value())
}

/// Copy `source_slot` of the source save into `target_slot` of the target
/// save. Slots are 0-based; the returned bytes are the complete new target.
#[wasm_bindgen]
pub fn transplant_character(
    source_bytes: &[u8],
    source_slot: usize,
    target_bytes: &[u8],
    target_slot: usize,
) -> Result<Vec<u8>, JsValue> {
    transplant_character_impl(source_bytes, source_slot, target_bytes, target_slot)
        .map_err(|err| err.to_js_value())
}

#[wasm_bindgen]
pub fn preview_slot(save_bytes: &[u8], slot: usize, options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    preview_slot_impl(save_bytes, slot, &parsed_options).map_err(|err| err.to_js_value())
}

#[wasm_bindgen]
pub fn verify_save(save_bytes: &[u8]) -> Result<String, JsValue> {
    verify_save_impl(save_bytes).map_err(|err| err.to_js_value())
}

fn parse_save_impl(save_bytes: &[u8], options: &WebOptions) -> Result<String, WebError> {
    require_payload(save_bytes)?;
    let session = Engine::new().open_bytes(file_name(options), save_bytes)?;
    to_pretty_json(&render_json(session.summary(), JsonStyle::CanonicalV1))
}

fn transplant_character_impl(
    source_bytes: &[u8],
    source_slot: usize,
    target_bytes: &[u8],
    target_slot: usize,
) -> Result<Vec<u8>, WebError> {
    require_payload(source_bytes)?;
    require_payload(target_bytes)?;

    let engine = Engine::new();
    let source = engine.open_bytes("source", source_bytes)?;
    let target = engine.open_bytes("target", target_bytes)?;
    let outcome = source.transplant_into(&target, source_slot, target_slot)?;
    Ok(outcome.bytes)
}

fn preview_slot_impl(
    save_bytes: &[u8],
    slot: usize,
    options: &WebOptions,
) -> Result<String, WebError> {
    require_payload(save_bytes)?;
    let session = Engine::new().open_bytes(file_name(options), save_bytes)?;
    let view = session.slot(slot)?;

    let mut out = render_slot_detail(&session.summary().slots[slot]);
    out.push('\n');
    out.push_str(&hex_dump("Header Data", view.header_bytes, None));
    out.push('\n');
    out.push_str(&hex_dump(
        "Slot Data",
        view.slot_bytes,
        Some(options.preview_bytes.unwrap_or(SLOT_PREVIEW_BYTES)),
    ));
    Ok(out)
}

fn verify_save_impl(save_bytes: &[u8]) -> Result<String, WebError> {
    require_payload(save_bytes)?;
    let session = Engine::new().open_bytes(DEFAULT_FILE_NAME, save_bytes)?;
    to_pretty_json(&render_checksum_json(&session.checksums()))
}

fn require_payload(bytes: &[u8]) -> Result<(), WebError> {
    if bytes.is_empty() {
        return Err(WebError::new(
            "unsupported_file",
            "The uploaded file is empty. Please provide an .sl2 save file.",
        ));
    }
    Ok(())
}

fn file_name(options: &WebOptions) -> String {
    options
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

fn to_pretty_json(value: &serde_json::Value) -> Result<String, WebError> {
    serde_json::to_string_pretty(value).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("failed to serialize rendered JSON output: {err}"),
        )
    })
}

fn parse_options(options: JsValue) -> Result<WebOptions, WebError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebOptions::default());
    }

    serde_wasm_bindgen::from_value(options).map_err(|err| {
        WebError::new(
            "invalid_options",
            format!("Failed to parse web options: {err}"),
        )
    })
}
