//! JNI "modified UTF-8" codec.
//!
//! `GetStringUTFChars` and `NewStringUTF` do not speak standard UTF-8. They
//! differ from it in two ways:
//!
//! - U+0000 is encoded as the two bytes `C0 80`, so the buffer never holds
//!   an interior NUL.
//! - Characters above U+FFFF are encoded as a UTF-16 surrogate pair, with
//!   each surrogate written as its own 3-byte sequence (6 bytes total).
//!
//! Everything else matches UTF-8, so text without NULs or supplementary
//! characters takes the fast path through [`std::str::from_utf8`].
//!
//! Standard 4-byte UTF-8 sequences never occur in modified UTF-8 and are
//! rejected, as are overlong forms other than the `C0 80` NUL.

use crate::error::{Error, Result};

/// Decodes modified UTF-8 bytes (without the trailing NUL) into a `String`.
pub fn decode(bytes: &[u8]) -> Result<String> {
    // C0 starts an encoded NUL, ED an encoded surrogate. F0 and above would
    // start a 4-byte sequence, which only the slow path rejects.
    if !bytes.iter().any(|&b| b == 0 || b == 0xC0 || b == 0xED || b >= 0xF0) {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::Marshal(format!("invalid modified UTF-8: {e}")));
    }

    let mut out = String::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let (unit, len) = read_unit(bytes, pos)?;
        pos += len;

        match unit {
            0xD800..=0xDBFF => {
                let (low, low_len) = read_unit(bytes, pos).map_err(|_| lone_surrogate(unit))?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(lone_surrogate(unit));
                }
                pos += low_len;
                let code = 0x10000 + (((unit - 0xD800) << 10) | (low - 0xDC00));
                out.push(char::from_u32(code).ok_or_else(|| lone_surrogate(unit))?);
            }
            0xDC00..=0xDFFF => return Err(lone_surrogate(unit)),
            _ => out.push(char::from_u32(unit).ok_or_else(|| lone_surrogate(unit))?),
        }
    }
    Ok(out)
}

/// Encodes a `str` as modified UTF-8. The result never contains a zero byte,
/// so it can be handed to JNI after appending a terminator.
pub fn encode(s: &str) -> Vec<u8> {
    if !s.chars().any(|c| c == '\0' || c as u32 > 0xFFFF) {
        return s.as_bytes().to_vec();
    }

    let mut out = Vec::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c as u32 {
            0 => out.extend_from_slice(&[0xC0, 0x80]),
            code if code > 0xFFFF => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    push_three_byte(&mut out, u32::from(*unit));
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

/// Reads one 1-, 2- or 3-byte sequence starting at `pos` and returns the
/// UTF-16 code unit it carries along with its length.
fn read_unit(bytes: &[u8], pos: usize) -> Result<(u32, usize)> {
    let b0 = *bytes
        .get(pos)
        .ok_or_else(|| Error::Marshal("truncated modified UTF-8".into()))?;

    match b0 {
        0x01..=0x7F => Ok((u32::from(b0), 1)),
        0xC0..=0xDF => {
            let b1 = continuation(bytes, pos + 1)?;
            let unit = (u32::from(b0 & 0x1F) << 6) | b1;
            // C0 80 is the only short form allowed.
            if unit != 0 && unit < 0x80 {
                return Err(overlong(pos));
            }
            Ok((unit, 2))
        }
        0xE0..=0xEF => {
            let b1 = continuation(bytes, pos + 1)?;
            let b2 = continuation(bytes, pos + 2)?;
            let unit = (u32::from(b0 & 0x0F) << 12) | (b1 << 6) | b2;
            if unit < 0x800 {
                return Err(overlong(pos));
            }
            Ok((unit, 3))
        }
        _ => Err(Error::Marshal(format!(
            "unexpected byte {b0:#04x} at offset {pos} in modified UTF-8"
        ))),
    }
}

fn continuation(bytes: &[u8], pos: usize) -> Result<u32> {
    match bytes.get(pos) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u32::from(b & 0x3F)),
        Some(&b) => Err(Error::Marshal(format!(
            "expected continuation byte at offset {pos}, found {b:#04x}"
        ))),
        None => Err(Error::Marshal("truncated modified UTF-8".into())),
    }
}

fn push_three_byte(out: &mut Vec<u8>, unit: u32) {
    out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
    out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
    out.push(0x80 | (unit & 0x3F) as u8);
}

fn overlong(pos: usize) -> Error {
    Error::Marshal(format!("overlong sequence at offset {pos} in modified UTF-8"))
}

fn lone_surrogate(unit: u32) -> Error {
    Error::Marshal(format!("unpaired surrogate {unit:#06x} in Java string"))
}
