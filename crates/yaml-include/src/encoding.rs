//! Text encodings for included files.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const BOM: char = '\u{feff}';

/// Encoding used to decode an included file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8; a leading byte order mark is dropped.
    #[default]
    Utf8,
    /// 7-bit ASCII.
    Ascii,
    /// ISO-8859-1, one byte per code point.
    Latin1,
    /// UTF-16 with byte order taken from the BOM, little-endian without one.
    Utf16,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
            Encoding::Utf16 => "utf-16",
            Encoding::Utf16Le => "utf-16-le",
            Encoding::Utf16Be => "utf-16-be",
        }
    }

    /// Decode `bytes`, returning `None` if they are invalid for this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let text = match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok()?.to_owned(),
            Encoding::Ascii => {
                if !bytes.is_ascii() {
                    return None;
                }
                std::str::from_utf8(bytes).ok()?.to_owned()
            }
            Encoding::Latin1 => bytes.iter().copied().map(char::from).collect(),
            Encoding::Utf16 => match bytes {
                [0xFE, 0xFF, ..] => decode_utf16(bytes, u16::from_be_bytes)?,
                _ => decode_utf16(bytes, u16::from_le_bytes)?,
            },
            Encoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes)?,
            Encoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes)?,
        };

        Some(match text.strip_prefix(BOM) {
            Some(rest) => rest.to_owned(),
            None => text,
        })
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "u8" | "utf-8-sig" | "utf8-sig" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Encoding::Latin1),
            "utf-16" | "utf16" => Ok(Encoding::Utf16),
            "utf-16-le" | "utf-16le" | "utf16le" => Ok(Encoding::Utf16Le),
            "utf-16-be" | "utf-16be" | "utf16be" => Ok(Encoding::Utf16Be),
            _ => Err(Error::directive(format!("unknown encoding '{s}'"))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
