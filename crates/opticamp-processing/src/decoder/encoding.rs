//! Text encodings tried by the decoder.
//!
//! Decoding is strict: malformed input is an attempt failure, not a lossy
//! replacement, so the next candidate gets its turn.

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE};
use serde::{Deserialize, Serialize};
use std::fmt;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// A text encoding candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8, a leading byte-order mark is kept as a character.
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 with an optional leading byte-order mark that is removed.
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
    /// ISO-8859-1; every byte sequence decodes.
    #[serde(rename = "latin1")]
    Latin1,
    /// UTF-16 honouring a byte-order mark, little-endian without one.
    #[serde(rename = "utf-16")]
    Utf16,
    /// UTF-16 little-endian, a byte-order mark is kept as a character.
    #[serde(rename = "utf-16le")]
    Utf16Le,
}

impl TextEncoding {
    /// Preference order of the primary decoding pass.
    pub const PRIMARY_ORDER: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Utf8Sig,
        TextEncoding::Latin1,
        TextEncoding::Utf16,
        TextEncoding::Utf16Le,
    ];

    /// The two UTF-16 variants used by the fallback passes.
    pub const UTF16_VARIANTS: [TextEncoding; 2] = [TextEncoding::Utf16, TextEncoding::Utf16Le];

    /// Label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Sig => "utf-8-sig",
            Self::Latin1 => "latin1",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16le",
        }
    }

    /// Decode `bytes` into text, or describe why they are not valid in this
    /// encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, String> {
        match self {
            Self::Utf8 => decode_utf8(bytes),
            Self::Utf8Sig => decode_utf8(bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes)),
            Self::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            Self::Utf16 => {
                if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
                    decode_utf16(rest, false)
                } else {
                    decode_utf16(bytes.strip_prefix(&UTF16_LE_BOM).unwrap_or(bytes), true)
                }
            }
            Self::Utf16Le => decode_utf16(bytes, true),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| match std::str::from_utf8(bytes) {
            Err(e) => format!("invalid utf-8: {e}"),
            Ok(_) => "invalid utf-8".to_string(),
        })
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!(
            "truncated utf-16 data: odd byte length {}",
            bytes.len()
        ));
    }
    let encoding = if little_endian { UTF_16LE } else { UTF_16BE };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| "invalid utf-16: unpaired surrogate".to_string())
}
