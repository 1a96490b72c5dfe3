//! Text carried by a ticket's QR code.
//!
//! The canonical form is `BOOKING:<booking id>-IDX:<1-based index>-NAME:<name>`.
//! New tickets embed the base64 encoding of that string; older app versions
//! printed it as-is, so decoding accepts both without a version marker.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Standard alphabet; encodes with padding, decodes with or without it since
/// some scanners strip the trailing `=`.
const TRANSPORT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

static PAYLOAD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^BOOKING:([0-9]+)-IDX:([0-9]+)-NAME:(.+)$").expect("payload pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid QR code format")]
pub struct MalformedPayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub booking_id: i32,
    /// Position of the ticket among the booking's tickets ordered by id, starting at 1.
    pub index: usize,
    pub name: String,
}

impl QrPayload {
    pub fn new(booking_id: i32, index: usize, name: impl Into<String>) -> Self {
        Self {
            booking_id,
            index,
            name: name.into(),
        }
    }

    /// Plain text form.
    pub fn encode(&self) -> String {
        format!(
            "BOOKING:{}-IDX:{}-NAME:{}",
            self.booking_id, self.index, self.name
        )
    }

    /// Base64 form embedded in issued QR codes.
    pub fn to_transport(&self) -> String {
        TRANSPORT.encode(self.encode())
    }

    /// Parses scanned text in either the base64 or the plain form.
    pub fn decode(scanned: &str) -> Result<Self, MalformedPayload> {
        let text = unwrap_transport(scanned);
        let captures = PAYLOAD_PATTERN.captures(&text).ok_or(MalformedPayload)?;

        let booking_id = captures[1].parse().map_err(|_| MalformedPayload)?;
        let index = captures[2].parse().map_err(|_| MalformedPayload)?;
        let name = captures[3].trim();
        if name.is_empty() {
            return Err(MalformedPayload);
        }

        Ok(Self::new(booking_id, index, name))
    }
}

/// Returns the base64-decoded text when `scanned` looks like a base64 payload,
/// otherwise the trimmed input unchanged.
///
/// Decoded bytes count as text only if they are UTF-8 and free of control
/// characters in `0x00..=0x08` and `0x0E..=0x1F`. This is a heuristic, not a
/// signature: a plain payload always contains `:` and `-`, which are outside
/// the standard base64 alphabet, so it never decodes.
pub fn unwrap_transport(scanned: &str) -> String {
    let trimmed = scanned.trim();

    match TRANSPORT.decode(trimmed) {
        Ok(bytes) if !has_control_bytes(&bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => decoded,
            Err(_) => trimmed.to_string(),
        },
        _ => trimmed.to_string(),
    }
}

fn has_control_bytes(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0E..=0x1F))
}
