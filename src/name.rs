//! Reading and writing DNS names, including RFC 1035 §4.1.4 compression.

use std::collections::HashMap;

use log::warn;

use crate::error::{BuildError, DecodeError};
use crate::wire::*;

/// Reads a (possibly compressed) domain name starting at the cursor's
/// current position, and advances the cursor past it.
///
/// Labels are decoded as UTF-8 with lossy replacement of invalid bytes —
/// deliberate, for robustness against non-compliant peers. Compression
/// pointers are followed, but each jump must land strictly before the
/// lowest offset seen so far; this forbids both self-loops and forward
/// jumps, which is enough to guarantee termination.
pub(crate) fn read_name(c: &mut Cursor<&[u8]>) -> Result<String, DecodeError> {
    let data = *c.get_ref();
    let mut result = String::new();

    let mut off = c.position() as usize;
    let mut first = off;
    let mut outer_cursor: Option<usize> = None;

    loop {
        let length = *data.get(off).ok_or(DecodeError::Io)?;
        off += 1;

        if length == 0 {
            break;
        }

        match length & 0xC0 {
            0x00 => {
                let len = usize::from(length);
                let label = data.get(off..off + len).ok_or(DecodeError::Io)?;
                result.push_str(&String::from_utf8_lossy(label));
                result.push('.');
                off += len;
            }
            0xC0 => {
                let lo = *data.get(off).ok_or(DecodeError::Io)?;
                if outer_cursor.is_none() {
                    outer_cursor = Some(off + 1);
                }

                let target = (usize::from(length & 0x3F) << 8) | usize::from(lo);
                if target >= first {
                    warn!("Rejecting circular name pointer to offset {}", target);
                    return Err(DecodeError::Circular { offset: target as u16 });
                }

                off = target;
                first = target;
            }
            _ => {
                return Err(DecodeError::BadLabel { offset: off as u16 });
            }
        }
    }

    c.set_position(outer_cursor.unwrap_or(off) as u64);
    Ok(result)
}

/// Writes `name` (a dot-separated domain name, optionally with a trailing
/// dot) into `buf`, compressing against whichever suffixes of it are
/// already present in `names` at an offset within this packet.
///
/// The absolute offset used for compression is derived from `buf`'s
/// current length plus the fixed 12-byte header that will be prepended
/// once the whole packet is assembled — so callers only ever pass the
/// buffer they are writing into, not a separately tracked size.
///
/// This is the write-side half of RFC 1035 §4.1.4: split the name into
/// suffixes, find the longest suffix already known, write the leading
/// labels literally, and either back-reference the rest with a 2-byte
/// pointer or terminate with a zero byte.
pub(crate) fn write_name(
    buf: &mut Vec<u8>,
    names: &mut HashMap<String, u16>,
    name: &str,
) -> Result<(), BuildError> {
    let mut parts: Vec<&str> = name.split('.').collect();
    if parts.last() == Some(&"") {
        parts.pop();
    }

    let suffixes: Vec<String> = (0..parts.len()).map(|i| parts[i..].join(".")).collect();

    let known = suffixes.iter().position(|suffix| names.contains_key(suffix));
    let k = known.unwrap_or(suffixes.len());

    let packet_size = HEADER_LEN + buf.len();
    let name_len = name.len();
    for suffix in &suffixes[..k] {
        // Each leading label costs one more wire byte (its length prefix)
        // than it does as plain text, which exactly cancels out the
        // trailing dot counted in `name_len` but not in the dot-joined
        // suffix strings.
        let offset = packet_size + name_len - suffix.len() - 1;
        names.insert(suffix.clone(), offset as u16);
    }

    for part in &parts[..k] {
        write_label(buf, part)?;
    }

    if k != suffixes.len() {
        let offset = names[&suffixes[k]];
        buf.push(((offset >> 8) as u8) | 0xC0);
        buf.push((offset & 0xFF) as u8);
    } else {
        buf.push(0);
    }

    Ok(())
}

/// Writes one length-prefixed label. RFC 1035 caps a label at 63 bytes
/// (the length byte's top two bits are reserved for the compression
/// pointer tag); this is the stricter of the two limits the wire format
/// could plausibly be read to allow, and is what this crate enforces.
fn write_label(buf: &mut Vec<u8>, label: &str) -> Result<(), BuildError> {
    if label.len() > 63 {
        return Err(BuildError::NamePartTooLong(label.to_owned()));
    }

    buf.push(label.len() as u8);
    buf.extend_from_slice(label.as_bytes());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_simple_name() {
        let buf: &[u8] = &[3, b'o', b'n', b'e', 3, b't', b'w', b'o', 0];
        let mut c = Cursor::new(buf);
        assert_eq!(read_name(&mut c).unwrap(), "one.two.");
        assert_eq!(c.position(), 9);
    }

    #[test]
    fn reads_root_name() {
        let buf: &[u8] = &[0];
        let mut c = Cursor::new(buf);
        assert_eq!(read_name(&mut c).unwrap(), "");
    }

    #[test]
    fn follows_a_pointer() {
        let buf: &[u8] = &[
            3, b'o', b'n', b'e', 0, // offset 0: "one."
            3, b't', b'w', b'o', 0xC0, 0x00, // offset 5: "two." + pointer to 0
        ];
        let mut c = Cursor::new(buf);
        c.set_position(5);
        assert_eq!(read_name(&mut c).unwrap(), "two.one.");
        assert_eq!(c.position(), 11, "cursor should land just past the 2-byte pointer");
    }

    #[test]
    fn rejects_self_pointing_name() {
        let buf: &[u8] = &[0xC0, 0x00];
        let mut c = Cursor::new(buf);
        assert_eq!(read_name(&mut c), Err(DecodeError::Circular { offset: 0 }));
    }

    #[test]
    fn rejects_forward_pointer() {
        let buf: &[u8] = &[0xC0, 0x05, 0, 0, 0, 0];
        let mut c = Cursor::new(buf);
        assert_eq!(read_name(&mut c), Err(DecodeError::Circular { offset: 5 }));
    }

    #[test]
    fn writes_and_compresses_shared_suffix() {
        // write_name's offsets are absolute within a whole message, so the
        // 12-byte header has to be accounted for even though this test
        // never builds one: write into a bare body buffer, then prepend a
        // dummy header before reading back.
        let mut buf = Vec::new();
        let mut names = HashMap::new();

        write_name(&mut buf, &mut names, "a.local.").unwrap();
        let first_len = buf.len();

        write_name(&mut buf, &mut names, "b.local.").unwrap();

        // "b" is written literally, then "local." is a 2-byte back-pointer.
        assert_eq!(buf.len(), first_len + 1 + 1 + 2);

        let mut full = vec![0_u8; HEADER_LEN];
        full.extend_from_slice(&buf);

        let mut c = Cursor::new(full.as_slice());
        c.set_position(HEADER_LEN as u64);
        assert_eq!(read_name(&mut c).unwrap(), "a.local.");
        c.set_position((HEADER_LEN + first_len) as u64);
        assert_eq!(read_name(&mut c).unwrap(), "b.local.");
    }

    #[test]
    fn rejects_overlong_label() {
        let mut buf = Vec::new();
        let mut names = HashMap::new();
        let long_label = "x".repeat(64);
        let name = format!("{long_label}.local.");

        assert!(write_name(&mut buf, &mut names, &name).is_err());
    }
}
