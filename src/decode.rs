// src/decode.rs
//
// Turns raw header values into plain comparable text.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use log::debug;

/// Standard alphabet; padding may be present or missing.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode RFC 2047 encoded-words and unfold continuation lines.
///
/// Undecodable input comes back as-is; this never fails.
pub fn decode_header(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    // mailparse wants a whole "Key: value" line
    let mut line = b"X-Triage: ".to_vec();
    line.extend_from_slice(raw.as_bytes());
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((header, _)) => header.get_value(),
        Err(e) => {
            debug!("Header decode failed ({}); comparing raw value", e);
            raw.to_string()
        }
    }
}

/// Treat the raw value as base64, then decode the result as a header.
///
/// Returns `None` when the value is not base64 at all.
pub fn decode_base64_header(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let bytes = LENIENT_BASE64.decode(compact.as_bytes()).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    Some(decode_header(&text))
}
