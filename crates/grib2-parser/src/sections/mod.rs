//! GRIB2 section parsing.
//!
//! A GRIB2 message is a 16 byte indicator (section 0) followed by
//! length-prefixed sections 1 to 7 and the `7777` end marker. Only the parts
//! the reader needs are decoded here: the section layout, the grid
//! definition (section 3) and the product key (section 4).

mod grid;

pub use grid::GridDefinition;

use crate::error::{Grib2Error, Result};

pub const MAGIC: &[u8; 4] = b"GRIB";
pub const END_MARKER: &[u8; 4] = b"7777";

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Location of one section inside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRef {
    pub number: u8,
    pub offset: usize,
    pub length: usize,
}

/// Location of one message inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSpan {
    pub offset: usize,
    pub length: usize,
    pub discipline: u8,
}

/// Parse Section 0 (Indicator) from the start of a message.
pub fn parse_indicator(data: &[u8]) -> Result<Indicator> {
    if data.len() < 16 {
        return Err(Grib2Error::invalid_format(
            "not enough data for indicator section",
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(Grib2Error::invalid_format("invalid GRIB magic bytes"));
    }

    // Octet 7: discipline, octet 8: edition, octets 9-16: total length
    let discipline = data[6];
    let edition = data[7];
    if edition != 2 {
        return Err(Grib2Error::invalid_format(format!(
            "expected GRIB edition 2, got {}",
            edition
        )));
    }
    let message_length = u64::from_be_bytes([
        data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
    ]);

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Locate every message in a file buffer.
///
/// Bytes between messages (padding, WMO headers) are skipped.
pub fn scan_messages(data: &[u8]) -> Result<Vec<MessageSpan>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_magic(data, pos) {
        let indicator = parse_indicator(&data[start..])?;
        let length = usize::try_from(indicator.message_length)
            .map_err(|_| Grib2Error::invalid_format("message length overflows usize"))?;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= data.len() && length >= 20)
            .ok_or_else(|| {
                Grib2Error::invalid_format(format!(
                    "message at offset {} claims {} bytes, file has {}",
                    start,
                    length,
                    data.len() - start
                ))
            })?;
        if &data[end - 4..end] != END_MARKER {
            return Err(Grib2Error::invalid_format(format!(
                "message at offset {} is missing its end marker",
                start
            )));
        }

        spans.push(MessageSpan {
            offset: start,
            length,
            discipline: indicator.discipline,
        });
        pos = end;
    }

    Ok(spans)
}

/// Split a single message into its sections (1 through 7).
pub fn split_sections(message: &[u8]) -> Result<Vec<SectionRef>> {
    let indicator = parse_indicator(message)?;
    let end = (indicator.message_length as usize).min(message.len());

    let mut sections = Vec::with_capacity(8);
    let mut pos = 16;
    while pos + 4 <= end {
        if &message[pos..pos + 4] == END_MARKER {
            return Ok(sections);
        }
        if pos + 5 > end {
            break;
        }
        let length = read_u32(message, pos) as usize;
        let number = message[pos + 4];
        if length < 5 || pos + length > end {
            return Err(Grib2Error::section(
                number,
                format!("length {} at offset {} runs past the message", length, pos),
            ));
        }
        sections.push(SectionRef {
            number,
            offset: pos,
            length,
        });
        pos += length;
    }

    Err(Grib2Error::invalid_format("message ended without 7777 marker"))
}

/// Borrow the bytes of the first section numbered `number`.
pub fn section<'a>(message: &'a [u8], sections: &[SectionRef], number: u8) -> Result<&'a [u8]> {
    sections
        .iter()
        .find(|s| s.number == number)
        .map(|s| &message[s.offset..s.offset + s.length])
        .ok_or_else(|| Grib2Error::section(number, "section not present"))
}

/// Parameter and first fixed surface of a message (section 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductKey {
    pub template: u16,
    pub category: u8,
    pub number: u8,
    pub surface_type: u8,
    /// Scaled surface value; `None` when the scaled value is missing
    pub surface_value: Option<f64>,
}

/// Parse the product key from a section 4 buffer.
///
/// Product templates 4.0 through 4.15 share the layout used here.
pub fn parse_product_definition(sec: &[u8]) -> Result<ProductKey> {
    if sec.len() < 28 {
        return Err(Grib2Error::section(4, format!("{} bytes is too short", sec.len())));
    }
    let template = read_u16(sec, 7);
    if template > 15 {
        return Err(Grib2Error::UnsupportedTemplate {
            section: 4,
            template,
        });
    }

    // Octet 23: type of first fixed surface, 24: scale factor, 25-28: scaled value
    let surface_type = sec[22];
    let surface_value = if sec[24..28] == [0xff; 4] {
        None
    } else {
        let factor = read_signed_i8(sec[23]);
        let value = read_signed_i32(sec, 24);
        Some(value as f64 * 10f64.powi(-(factor as i32)))
    };

    Ok(ProductKey {
        template,
        category: sec[9],
        number: sec[10],
        surface_type,
        surface_value,
    })
}

fn find_magic(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(4)
        .position(|w| w == MAGIC)
        .map(|p| p + from)
}

pub(crate) fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

pub(crate) fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// GRIB2 signed integers are sign-magnitude, not two's complement.
pub(crate) fn read_signed_i32(data: &[u8], at: usize) -> i32 {
    let raw = read_u32(data, at);
    let magnitude = (raw & 0x7fff_ffff) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

pub(crate) fn read_signed_i8(byte: u8) -> i8 {
    let magnitude = (byte & 0x7f) as i8;
    if byte & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_magnitude() {
        assert_eq!(read_signed_i32(&[0x80, 0, 0, 5], 0), -5);
        assert_eq!(read_signed_i32(&[0, 0, 1, 0], 0), 256);
        assert_eq!(read_signed_i8(0x81), -1);
        assert_eq!(read_signed_i8(0x02), 2);
    }

    #[test]
    fn test_indicator_rejects_edition_1() {
        let mut data = [0u8; 16];
        data[..4].copy_from_slice(MAGIC);
        data[7] = 1;
        assert!(parse_indicator(&data).is_err());
    }

    #[test]
    fn test_product_key_surface() {
        let mut sec = vec![0u8; 34];
        sec[4] = 4;
        sec[9] = 2;
        sec[10] = 3;
        sec[22] = 103;
        sec[23] = 0;
        sec[24..28].copy_from_slice(&10u32.to_be_bytes());
        let key = parse_product_definition(&sec).unwrap();
        assert_eq!((key.category, key.number, key.surface_type), (2, 3, 103));
        assert_eq!(key.surface_value, Some(10.0));

        sec[24..28].copy_from_slice(&[0xff; 4]);
        assert_eq!(parse_product_definition(&sec).unwrap().surface_value, None);
    }

    #[test]
    fn test_scan_messages_skips_garbage() {
        assert!(scan_messages(b"not a grib file").unwrap().is_empty());
    }
}
