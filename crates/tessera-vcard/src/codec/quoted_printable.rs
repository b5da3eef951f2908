//! Quoted-printable coding and the handful of charsets vCard 2.1 uses.

use crate::error::{VCardError, VCardResult};

/// Character sets accepted in the `CHARSET` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    UsAscii,
    /// ISO-8859-1; also used for windows-1252, whose extra glyphs are rare in
    /// cards.
    Latin1,
}

impl Charset {
    /// Finds a charset by its IANA name or a common alias.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
                Some(Self::Latin1)
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::UsAscii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Decodes bytes; invalid sequences become U+FFFD.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '\u{FFFD}' })
                .collect(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Encodes text; characters outside the charset become `?`.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::UsAscii => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok().filter(u8::is_ascii).unwrap_or(b'?'))
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes text as quoted-printable (without soft line breaks).
///
/// Line breaks are encoded as `=0D=0A` so the result is a single line.
#[must_use]
pub fn encode(text: &str, charset: Charset) -> String {
    let normalized = text.replace("\r\n", "\n");
    let bytes = charset.encode(&normalized);
    let mut out = String::with_capacity(bytes.len() * 3 / 2);

    for (i, &b) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        match b {
            b'\n' => out.push_str("=0D=0A"),
            b' ' | b'\t' if !last => out.push(char::from(b)),
            b'!'..=b'<' | b'>'..=b'~' => out.push(char::from(b)),
            _ => {
                out.push('=');
                out.push(char::from(HEX[usize::from(b >> 4)]));
                out.push(char::from(HEX[usize::from(b & 0x0F)]));
            }
        }
    }

    out
}

/// Decodes a quoted-printable value.
///
/// Soft line breaks are removed, encoded CRLF pairs become `\n` and malformed
/// `=` sequences are kept as literal text.
///
/// ## Errors
/// Returns [`VCardError::InvalidValue`] if `charset` names an unsupported
/// character set.
pub fn decode(text: &str, charset: &str) -> VCardResult<String> {
    let charset = Charset::from_label(charset)
        .ok_or_else(|| VCardError::InvalidValue(format!("unsupported charset: {charset}")))?;
    Ok(decode_with(text, charset))
}

/// Decodes a quoted-printable value with a known charset.
#[must_use]
pub fn decode_with(text: &str, charset: Charset) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }

    charset.decode(&out).replace("\r\n", "\n")
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
