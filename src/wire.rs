//! Wire-format constants and the primitive reads/writes everything else
//! builds on.

pub(crate) use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
pub(crate) use std::io::Cursor;

use crate::error::BuildError;

/// Length, in bytes, of the fixed DNS message header: id, flags, and the
/// four 16-bit section counts.
pub(crate) const HEADER_LEN: usize = 12;

/// An **A** record.
pub const TYPE_A: u16 = 1;

/// A **CNAME** record.
pub const TYPE_CNAME: u16 = 5;

/// A **PTR** record.
pub const TYPE_PTR: u16 = 12;

/// A **HINFO** record.
pub const TYPE_HINFO: u16 = 13;

/// A **TXT** record.
pub const TYPE_TXT: u16 = 16;

/// An **AAAA** record.
pub const TYPE_AAAA: u16 = 28;

/// An **SRV** record.
pub const TYPE_SRV: u16 = 33;

/// A question or record type matching any type.
pub const TYPE_ANY: u16 = 255;

/// The Internet class.
pub const CLASS_IN: u16 = 1;

/// Mask isolating the 15-bit class number from the cache-flush/QU bit.
pub const CLASS_MASK: u16 = 0x7FFF;

/// The cache-flush bit on a record, or the QU ("unicast requested") bit on
/// a question — the top bit of the class field (RFC 6762).
pub const CLASS_UNIQUE: u16 = 0x8000;

/// Mask isolating the QR (query/response) bit pair in the flags field.
pub const FLAGS_QR_MASK: u16 = 0x8000;

/// The QR pattern identifying a query.
pub const FLAGS_QR_QUERY: u16 = 0x0000;

/// The QR pattern identifying a response.
pub const FLAGS_QR_RESPONSE: u16 = 0x8000;

/// The truncation bit — in an mDNS query, signals that the known-answer
/// list continues in a following packet (RFC 6762 §7.2).
pub const FLAGS_TC: u16 = 0x0200;

/// The typical per-packet size ceiling, in bytes, including the header.
pub const MAX_MSG_TYPICAL: u16 = 1460;

/// The absolute size ceiling for a single oversized record written alone
/// in its own packet.
pub const MAX_MSG_ABSOLUTE: u16 = 8966;

/// Percentage of the TTL at which a record is considered fully expired.
pub const EXPIRE_FULL_TIME_PERCENT: u32 = 100;

/// Percentage of the TTL at which a record is considered stale.
pub const EXPIRE_STALE_TIME_PERCENT: u32 = 50;

/// Percentage of the TTL below which a record is still considered recent.
pub const RECENT_TIME_PERCENT: u32 = 25;

/// Reads a DNS character-string: a single length byte (0–255) followed by
/// that many raw bytes.
pub(crate) fn read_character_string(c: &mut Cursor<&[u8]>) -> std::io::Result<Vec<u8>> {
    let length = c.read_u8()?;
    let mut buf = vec![0_u8; usize::from(length)];
    std::io::Read::read_exact(c, &mut buf)?;
    Ok(buf)
}

/// Writes a DNS character-string: a length byte followed by the bytes.
///
/// RFC 1035 caps a character-string's data at 255 bytes (the length byte
/// itself can only represent up to 255); callers that need the full range
/// should check `value.len() <= 255` before calling.
pub(crate) fn write_character_string(buf: &mut Vec<u8>, value: &[u8]) -> Result<(), BuildError> {
    if value.len() > 255 {
        return Err(BuildError::NamePartTooLong(String::from_utf8_lossy(value).into_owned()));
    }

    buf.write_u8(value.len() as u8).expect("writing to a Vec cannot fail");
    buf.extend_from_slice(value);
    Ok(())
}
