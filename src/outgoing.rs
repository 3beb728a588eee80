//! Assembling one or more size-bounded mDNS datagrams from questions and
//! records.

use std::collections::HashMap;

use log::{debug, warn};

use crate::cache::Cache;
use crate::error::BuildError;
use crate::name::write_name;
use crate::record::{Question, Record};
use crate::wire::*;

/// A message under construction: questions plus answer, authority, and
/// additional records, not yet serialized.
///
/// Records are appended with the `add_*` methods in any order the caller
/// likes; [`Self::packets`] finalizes the message into one or more
/// size-bounded byte strings, splitting across packets and rolling back
/// a record that would overflow the current one. Finalization happens at
/// most once: later calls to `packets` return the same list, and further
/// `add_*` calls after it has a finished list are simply ignored.
#[derive(Debug)]
pub struct OutgoingMessage {
    /// The header flags (QR, opcode, and so on) written to every packet.
    pub flags: u16,

    /// When true, the transaction id is written as zero and the
    /// cache-flush bit is reinterpreted as QU on write; when false, `id`
    /// is written as given.
    pub multicast: bool,

    id: u16,
    questions: Vec<Question>,
    answers: Vec<(Record, u64)>,
    authorities: Vec<Record>,
    additionals: Vec<Record>,

    packets_data: Option<Vec<Vec<u8>>>,
}

impl OutgoingMessage {
    /// Builds an empty outgoing message. `id` is only meaningful when
    /// `multicast` is false.
    pub fn new(flags: u16, multicast: bool, id: u16) -> Self {
        Self {
            flags,
            multicast,
            id,
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            packets_data: None,
        }
    }

    /// True if this message's flags mark it as a query rather than a
    /// response.
    pub fn is_query(&self) -> bool {
        self.flags & FLAGS_QR_MASK == FLAGS_QR_QUERY
    }

    /// Adds a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Adds `record` as an answer at reference time zero, unless an answer
    /// already present in `incoming` makes it redundant (known-answer
    /// suppression).
    pub fn add_answer(&mut self, incoming: &crate::IncomingMessage, record: Record) {
        if !record.suppressed_by(incoming) {
            self.add_answer_at_time(record, 0);
        }
    }

    /// Adds `record` as an answer with remaining TTL computed against
    /// `now`, unless it has already expired by then. `now == 0` writes the
    /// record's nominal TTL unchanged instead of a remaining TTL.
    pub fn add_answer_at_time(&mut self, record: Record, now: u64) {
        if now == 0 || !record.is_expired(now) {
            self.answers.push((record, now));
        }
    }

    /// Adds an authoritative answer (an alias record, conventionally a
    /// PTR or CNAME).
    pub fn add_authoritative_answer(&mut self, record: Record) {
        self.authorities.push(record);
    }

    /// Adds an additional answer (RFC 6763 §12): a record the client did
    /// not ask for but can reasonably be expected to want next.
    pub fn add_additional_answer(&mut self, record: Record) {
        self.additionals.push(record);
    }

    /// Adds a question for `(name, rtype, class)` unless `cache` already
    /// holds a matching record, in which case that record is attached as
    /// an answer at `now` instead.
    pub fn add_question_or_one_cache(&mut self, cache: &dyn Cache, now: u64, name: &str, rtype: u16, class: u16) {
        match cache.get_by_details(name, rtype, class) {
            Some(cached) => self.add_answer_at_time(cached, now),
            None => self.add_question(Question::new(name, rtype, class)),
        }
    }

    /// As [`Self::add_question_or_one_cache`], but attaches every matching
    /// cached record instead of at most one. Used for address lookups
    /// where several answers can coexist.
    pub fn add_question_or_all_cache(&mut self, cache: &dyn Cache, now: u64, name: &str, rtype: u16, class: u16) {
        let cached = cache.get_all_by_details(name, rtype, class);
        if cached.is_empty() {
            self.add_question(Question::new(name, rtype, class));
            return;
        }
        for record in cached {
            self.add_answer_at_time(record, now);
        }
    }

    /// Finalizes the message into a list of UDP-ready byte strings and
    /// returns it. Idempotent: once computed, later calls return the same
    /// list without re-running assembly or looking at further `add_*`
    /// calls.
    pub fn packets(&mut self) -> Result<&[Vec<u8>], BuildError> {
        if self.packets_data.is_none() {
            self.packets_data = Some(self.assemble()?);
        }
        Ok(self.packets_data.as_deref().unwrap_or(&[]))
    }

    fn assemble(&self) -> Result<Vec<Vec<u8>>, BuildError> {
        let mut packets = Vec::new();

        let mut qo = 0;
        let mut ao = 0;
        let mut uo = 0;
        let mut xo = 0;
        let mut first = true;

        while first || self.has_more_to_add(qo, ao, uo, xo) {
            first = false;

            let mut buf = Vec::new();
            let mut names = HashMap::new();
            let mut allow_long = true;

            let mut qw = 0;
            while qo + qw < self.questions.len() {
                if !write_question(&mut buf, &mut names, &mut allow_long, &self.questions[qo + qw], self.multicast)? {
                    break;
                }
                qw += 1;
            }

            let mut aw = 0;
            while ao + aw < self.answers.len() {
                let (record, now) = &self.answers[ao + aw];
                if !write_record(&mut buf, &mut names, &mut allow_long, record, *now, self.multicast)? {
                    break;
                }
                aw += 1;
            }

            let mut uw = 0;
            while uo + uw < self.authorities.len() {
                if !write_record(&mut buf, &mut names, &mut allow_long, &self.authorities[uo + uw], 0, self.multicast)? {
                    break;
                }
                uw += 1;
            }

            let mut xw = 0;
            while xo + xw < self.additionals.len() {
                if !write_record(&mut buf, &mut names, &mut allow_long, &self.additionals[xo + xw], 0, self.multicast)? {
                    break;
                }
                xw += 1;
            }

            qo += qw;
            ao += aw;
            uo += uw;
            xo += xw;

            let mut packet = Vec::with_capacity(HEADER_LEN + buf.len());
            packet.extend_from_slice(&(if self.multicast { 0 } else { self.id }).to_be_bytes());

            let flags = if self.is_query() && self.has_more_to_add(qo, ao, uo, xo) {
                debug!("setting TC flag, more records remain");
                self.flags | FLAGS_TC
            } else {
                self.flags
            };
            packet.extend_from_slice(&flags.to_be_bytes());

            packet.extend_from_slice(&(qw as u16).to_be_bytes());
            packet.extend_from_slice(&(aw as u16).to_be_bytes());
            packet.extend_from_slice(&(uw as u16).to_be_bytes());
            packet.extend_from_slice(&(xw as u16).to_be_bytes());
            packet.extend_from_slice(&buf);

            packets.push(packet);

            if qw + aw + uw + xw == 0 && self.has_more_to_add(qo, ao, uo, xo) {
                warn!("packets() made no progress adding records; returning");
                break;
            }
        }

        Ok(packets)
    }

    fn has_more_to_add(&self, qo: usize, ao: usize, uo: usize, xo: usize) -> bool {
        qo < self.questions.len() || ao < self.answers.len() || uo < self.authorities.len() || xo < self.additionals.len()
    }
}

fn class_with_unique_bit(class: u16, unique: bool, multicast: bool) -> u16 {
    if unique && multicast {
        class | CLASS_UNIQUE
    } else {
        class
    }
}

/// Returns `Ok(true)` if the question fit within the current packet's size
/// limit, `Ok(false)` if it was rolled back and the caller should move on
/// to the next section.
fn write_question(
    buf: &mut Vec<u8>,
    names: &mut HashMap<String, u16>,
    allow_long: &mut bool,
    question: &Question,
    multicast: bool,
) -> Result<bool, BuildError> {
    let start = buf.len();
    write_name(buf, names, &question.name)?;
    buf.write_u16::<BigEndian>(question.qtype).expect("writing to a Vec cannot fail");
    buf.write_u16::<BigEndian>(class_with_unique_bit(question.class, question.unique, multicast))
        .expect("writing to a Vec cannot fail");

    Ok(check_limit_or_rollback(buf, names, allow_long, start))
}

/// As [`write_question`], for a full record: name, type, class, TTL, a
/// placeholder rdata length patched after the payload is written, then the
/// payload itself.
fn write_record(
    buf: &mut Vec<u8>,
    names: &mut HashMap<String, u16>,
    allow_long: &mut bool,
    record: &Record,
    now: u64,
    multicast: bool,
) -> Result<bool, BuildError> {
    let start = buf.len();
    write_name(buf, names, &record.name)?;
    buf.write_u16::<BigEndian>(record.rtype).expect("writing to a Vec cannot fail");
    buf.write_u16::<BigEndian>(class_with_unique_bit(record.class, record.unique, multicast))
        .expect("writing to a Vec cannot fail");

    let ttl = if now == 0 { record.ttl } else { record.remaining_ttl(now) };
    buf.write_u32::<BigEndian>(ttl).expect("writing to a Vec cannot fail");

    let length_index = buf.len();
    buf.write_u16::<BigEndian>(0).expect("writing to a Vec cannot fail");
    record.data.write(buf, names)?;

    let rdata_len = (buf.len() - length_index - 2) as u16;
    buf[length_index..length_index + 2].copy_from_slice(&rdata_len.to_be_bytes());

    Ok(check_limit_or_rollback(buf, names, allow_long, start))
}

/// Checks the current packet size against the applicable limit — the
/// first check in a packet may use the absolute ceiling, every check after
/// that uses the typical one — and rolls back to `start` on overflow.
fn check_limit_or_rollback(
    buf: &mut Vec<u8>,
    names: &mut HashMap<String, u16>,
    allow_long: &mut bool,
    start: usize,
) -> bool {
    let limit = if *allow_long { MAX_MSG_ABSOLUTE } else { MAX_MSG_TYPICAL };
    *allow_long = false;

    let size = HEADER_LEN + buf.len();
    if size <= usize::from(limit) {
        return true;
    }

    debug!("reached data limit (size={size}) > (limit={limit}) - rolling back");
    let floor = (HEADER_LEN + start) as u16;
    names.retain(|_, offset| *offset < floor);
    buf.truncate(start);
    false
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::RecordData;
    use crate::{CLASS_IN, TYPE_PTR};

    #[test]
    fn trivial_question_round_trips() {
        let mut out = OutgoingMessage::new(0, true, 0);
        out.add_question(Question::new("_http._tcp.local.", TYPE_PTR, CLASS_IN));

        let packets = out.packets().unwrap();
        assert_eq!(packets.len(), 1);

        let parsed = crate::IncomingMessage::parse(&packets[0], 0);
        assert!(parsed.valid);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].name, "_http._tcp.local.");
        assert_eq!(parsed.answers.len(), 0);
    }

    #[test]
    fn shared_suffix_is_compressed() {
        let mut out = OutgoingMessage::new(0x8000, true, 0);
        out.add_additional_answer(Record::new("a.local.", crate::TYPE_PTR, CLASS_IN, 120, 0, RecordData::Pointer("a.local.".into())));
        out.add_additional_answer(Record::new("b.local.", crate::TYPE_PTR, CLASS_IN, 120, 0, RecordData::Pointer("b.local.".into())));

        let packets = out.packets().unwrap();
        assert_eq!(packets.len(), 1);

        // "local." appears 4 times across the two records (owner name and
        // rdata alias, twice each) but should only be spelled out once.
        let local_label = [5_u8, b'l', b'o', b'c', b'a', b'l'];
        let occurrences = packets[0].windows(local_label.len()).filter(|w| *w == local_label).count();
        assert_eq!(occurrences, 1);

        let parsed = crate::IncomingMessage::parse(&packets[0], 0);
        assert!(parsed.valid);
        assert_eq!(parsed.answers.len(), 2);
    }

    #[test]
    fn oversize_answer_gets_its_own_packet() {
        let mut out = OutgoingMessage::new(0x8000, true, 0);
        out.add_additional_answer(Record::new(
            "big.local.",
            crate::TYPE_TXT,
            CLASS_IN,
            120,
            0,
            RecordData::Text(vec![b'x'; 1500]),
        ));
        out.add_additional_answer(Record::new("small.local.", crate::TYPE_TXT, CLASS_IN, 120, 0, RecordData::Text(vec![1])));

        let packets = out.packets().unwrap();
        assert_eq!(packets.len(), 2);
        assert!(packets[0].len() > usize::from(MAX_MSG_TYPICAL));
        assert!(packets[0].len() <= usize::from(MAX_MSG_ABSOLUTE));
    }

    #[test]
    fn query_spill_sets_tc_on_all_but_last() {
        let mut out = OutgoingMessage::new(0, true, 0);
        for i in 0..500 {
            out.add_question(Question::new(format!("host-{i}.local."), crate::TYPE_A, CLASS_IN));
        }

        let packets = out.packets().unwrap();
        assert!(packets.len() >= 2);
        for packet in &packets[..packets.len() - 1] {
            let flags = u16::from_be_bytes([packet[2], packet[3]]);
            assert_ne!(flags & FLAGS_TC, 0);
        }
        let last_flags = u16::from_be_bytes([packets.last().unwrap()[2], packets.last().unwrap()[3]]);
        assert_eq!(last_flags & FLAGS_TC, 0);
    }

    #[test]
    fn finalization_is_idempotent() {
        let mut out = OutgoingMessage::new(0, true, 0);
        out.add_question(Question::new("a.local.", crate::TYPE_A, CLASS_IN));
        let first = out.packets().unwrap().to_vec();
        out.add_question(Question::new("ignored.local.", crate::TYPE_A, CLASS_IN));
        let second = out.packets().unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn known_answer_suppression() {
        let remote = crate::IncomingMessage {
            id: 0,
            flags: 0,
            questions: Vec::new(),
            answers: vec![Record::new("x.local.", TYPE_PTR, CLASS_IN, 4500, 0, RecordData::Pointer("a.x.local.".into()))],
            valid: true,
        };

        let mut out = OutgoingMessage::new(0x8000, true, 0);
        let fresh = Record::new("x.local.", TYPE_PTR, CLASS_IN, 4500, 0, RecordData::Pointer("a.x.local.".into()));
        out.add_answer(&remote, fresh);
        assert!(out.answers.is_empty());

        let stale = Record::new("x.local.", TYPE_PTR, CLASS_IN, 12000, 0, RecordData::Pointer("a.x.local.".into()));
        out.add_answer(&remote, stale);
        assert_eq!(out.answers.len(), 1);
    }
}
