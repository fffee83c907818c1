//! Stateless byte helpers: little-endian integers, UTF-16LE strings,
//! fixed-width search/replace and MD5 digests.

use std::fmt::Write as _;

use encoding_rs::UTF_16LE;
use md5::{Digest, Md5};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::CHECKSUM_LEN;

const I32_WIDTH: usize = 4;

pub fn decode_i32_le(bytes: &[u8]) -> Result<i32, CoreError> {
    let Some(raw) = bytes.get(..I32_WIDTH) else {
        return Err(CoreError::structural(
            CoreErrorCode::InsufficientLength,
            format!(
                "not enough bytes for i32: len={}, need {I32_WIDTH}",
                bytes.len()
            ),
        ));
    };
    let mut buf = [0u8; I32_WIDTH];
    buf.copy_from_slice(raw);
    Ok(i32::from_le_bytes(buf))
}

pub fn decode_u8_at(bytes: &[u8], offset: usize) -> Result<u8, CoreError> {
    bytes.get(offset).copied().ok_or_else(|| {
        CoreError::structural(
            CoreErrorCode::InsufficientLength,
            format!("no byte at offset {offset}: len={}", bytes.len()),
        )
        .at_offset(offset)
    })
}

/// Decode a null-terminated UTF-16LE string, reading at most `max_chars`
/// code units. A leading `FF FE` byte-order mark is dropped; unpaired
/// surrogates and a dangling odd byte become U+FFFD.
pub fn decode_utf16le_string(bytes: &[u8], max_chars: Option<usize>) -> String {
    let bytes = match max_chars {
        Some(max) => &bytes[..bytes.len().min(max * 2)],
        None => bytes,
    };

    let end = bytes
        .chunks_exact(2)
        .position(|pair| pair == [0, 0])
        .map_or(bytes.len(), |unit| unit * 2);

    let (decoded, _had_errors) = UTF_16LE.decode_with_bom_removal(&bytes[..end]);
    decoded.into_owned()
}

/// Every start offset where `needle` matches, overlapping matches included.
pub fn find_all_occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }

    haystack
        .windows(needle.len())
        .enumerate()
        .filter_map(|(offset, window)| (window == needle).then_some(offset))
        .collect()
}

/// Copying variant of [`replace_all_in_place`]; the input is left untouched.
pub fn replace_all_fixed_width(
    haystack: &[u8],
    find: &[u8],
    replace: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let mut copy = haystack.to_vec();
    replace_all_in_place(&mut copy, find, replace)?;
    Ok(copy)
}

/// Overwrite every occurrence of `find` with `replace` and return how many
/// were found. Matches are located before any write, so an overlapping pair
/// ends with the later replacement on top.
pub fn replace_all_in_place(
    buf: &mut [u8],
    find: &[u8],
    replace: &[u8],
) -> Result<usize, CoreError> {
    if find.is_empty() {
        return Ok(0);
    }
    if find.len() != replace.len() {
        return Err(CoreError::structural(
            CoreErrorCode::LengthMismatch,
            format!(
                "fixed-width replace needs equal lengths: find={}, replace={}",
                find.len(),
                replace.len()
            ),
        ));
    }

    let offsets = find_all_occurrences(buf, find);
    for &offset in &offsets {
        buf[offset..offset + replace.len()].copy_from_slice(replace);
    }
    Ok(offsets.len())
}

pub fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Md5::digest(bytes);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest);
    out
}

pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").expect("writing to String cannot fail");
    }
    out
}
