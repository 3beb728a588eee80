//! Parsing an incoming mDNS datagram into a structured message.

use log::warn;

use crate::error::DecodeError;
use crate::name::read_name;
use crate::record::{Question, Record, RecordData};
use crate::wire::*;

/// A parsed incoming mDNS datagram.
///
/// Parsing never fails outward: a structurally broken datagram leaves
/// [`Self::valid`] false and whatever was decoded before the failure point
/// in place, for diagnostics. Downstream code should check `valid` before
/// trusting the contents.
#[derive(Debug)]
pub struct IncomingMessage {
    /// The transaction id from the header.
    pub id: u16,

    /// The raw header flags (QR, TC, and whatever else the peer set).
    pub flags: u16,

    /// The questions section, in wire order.
    pub questions: Vec<Question>,

    /// The answers, authorities, and additionals sections, concatenated in
    /// wire order. The three sections are not distinguished after parsing;
    /// downstream logic treats them uniformly.
    pub answers: Vec<Record>,

    /// False if decoding stopped early due to a malformed datagram.
    pub valid: bool,
}

impl IncomingMessage {
    /// Parses `data` as a complete mDNS datagram. `now` is the current
    /// time in milliseconds, stamped onto every parsed record's `created`
    /// field so its TTL deadlines are computed relative to when this
    /// datagram actually arrived rather than the epoch.
    pub fn parse(data: &[u8], now: u64) -> Self {
        let mut c = Cursor::new(data);
        let mut questions = Vec::new();
        let mut answers = Vec::new();

        let result = (|| -> Result<(u16, u16), DecodeError> {
            let id = c.read_u16::<BigEndian>()?;
            let flags = c.read_u16::<BigEndian>()?;
            let num_questions = c.read_u16::<BigEndian>()?;
            let num_answers = c.read_u16::<BigEndian>()?;
            let num_authorities = c.read_u16::<BigEndian>()?;
            let num_additionals = c.read_u16::<BigEndian>()?;

            for _ in 0..num_questions {
                let name = read_name(&mut c)?;
                let qtype = c.read_u16::<BigEndian>()?;
                let raw_class = c.read_u16::<BigEndian>()?;
                questions.push(Question::new(name, qtype, raw_class));
            }

            let num_records = u32::from(num_answers) + u32::from(num_authorities) + u32::from(num_additionals);
            for _ in 0..num_records {
                if let Some(record) = Self::read_record(&mut c, now)? {
                    answers.push(record);
                }
            }

            Ok((id, flags))
        })();

        match result {
            Ok((id, flags)) => IncomingMessage { id, flags, questions, answers, valid: true },
            Err(err) => {
                warn!("Choked at offset {} while unpacking datagram: {err}", c.position());
                IncomingMessage { id: 0, flags: 0, questions, answers, valid: false }
            }
        }
    }

    fn read_record(c: &mut Cursor<&[u8]>, now: u64) -> Result<Option<Record>, DecodeError> {
        let name = read_name(c)?;
        let rtype = c.read_u16::<BigEndian>()?;
        let raw_class = c.read_u16::<BigEndian>()?;
        let ttl = c.read_u32::<BigEndian>()?;
        let rdlength = c.read_u16::<BigEndian>()?;

        let data = match rtype {
            TYPE_A => RecordData::Address(Self::read_ipv4(c)?.into()),
            TYPE_AAAA => RecordData::Address(Self::read_ipv6(c)?.into()),
            TYPE_CNAME | TYPE_PTR => RecordData::Pointer(read_name(c)?),
            TYPE_TXT => RecordData::Text(Self::read_bytes(c, rdlength)?),
            TYPE_SRV => RecordData::Service {
                priority: c.read_u16::<BigEndian>()?,
                weight: c.read_u16::<BigEndian>()?,
                port: c.read_u16::<BigEndian>()?,
                target: read_name(c)?,
            },
            TYPE_HINFO => RecordData::Hinfo {
                cpu: String::from_utf8_lossy(&read_character_string(c)?).into_owned(),
                os: String::from_utf8_lossy(&read_character_string(c)?).into_owned(),
            },
            _ => {
                let pos = c.position() + u64::from(rdlength);
                c.set_position(pos);
                return Ok(None);
            }
        };

        Ok(Some(Record::new(name, rtype, raw_class, ttl, now, data)))
    }

    fn read_bytes(c: &mut Cursor<&[u8]>, length: u16) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0_u8; usize::from(length)];
        std::io::Read::read_exact(c, &mut buf)?;
        Ok(buf)
    }

    fn read_ipv4(c: &mut Cursor<&[u8]>) -> Result<std::net::Ipv4Addr, DecodeError> {
        let mut octets = [0_u8; 4];
        std::io::Read::read_exact(c, &mut octets)?;
        Ok(std::net::Ipv4Addr::from(octets))
    }

    fn read_ipv6(c: &mut Cursor<&[u8]>) -> Result<std::net::Ipv6Addr, DecodeError> {
        let mut octets = [0_u8; 16];
        std::io::Read::read_exact(c, &mut octets)?;
        Ok(std::net::Ipv6Addr::from(octets))
    }
}
