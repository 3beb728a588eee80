//! The record entity model: TTL-bearing records and their type-specific
//! payloads.

use std::hash::{Hash, Hasher};

use crate::wire::{CLASS_MASK, CLASS_UNIQUE, EXPIRE_FULL_TIME_PERCENT, EXPIRE_STALE_TIME_PERCENT, RECENT_TIME_PERCENT};

mod data;
mod question;

pub use self::data::RecordData;
pub use self::question::Question;

/// A single DNS resource record: a `(name, type, class)` entry, a TTL, and
/// a type-specific payload.
///
/// This mirrors what would be a small class hierarchy (one concrete record
/// type per wire type) as a header struct composed with a tagged-union
/// payload instead, so there is one place that knows about TTL deadlines
/// and one dispatcher for the type-specific wire format.
#[derive(Debug, Clone)]
pub struct Record {
    /// The owner name, in its original case.
    pub name: String,

    /// The record type. Kept alongside `data` since a [`Question`] or the
    /// incoming parser needs it before (or independent of) the payload.
    pub rtype: u16,

    /// The record class, with the cache-flush bit already split out.
    pub class: u16,

    /// The cache-flush bit (RFC 6762 §10.2): the sender holds the sole
    /// authoritative copy of this record set.
    pub unique: bool,

    /// Time to live, in seconds, as most recently set.
    pub ttl: u32,

    /// Milliseconds timestamp this record's TTL was last (re)started.
    pub created: u64,

    expiration_time: u64,
    stale_time: u64,
    recent_time: u64,

    /// The type-specific payload.
    pub data: RecordData,
}

impl Record {
    /// Builds a record, splitting the cache-flush bit out of `raw_class`
    /// and deriving the expiration/stale/recent deadlines from `created`
    /// and `ttl`.
    pub fn new(
        name: impl Into<String>,
        rtype: u16,
        raw_class: u16,
        ttl: u32,
        created: u64,
        data: RecordData,
    ) -> Self {
        let mut record = Self {
            name: name.into(),
            rtype,
            class: raw_class & CLASS_MASK,
            unique: raw_class & CLASS_UNIQUE != 0,
            ttl,
            created,
            expiration_time: 0,
            stale_time: 0,
            recent_time: 0,
            data,
        };
        record.recompute_deadlines();
        record
    }

    fn recompute_deadlines(&mut self) {
        self.expiration_time = self.deadline(EXPIRE_FULL_TIME_PERCENT);
        self.stale_time = self.deadline(EXPIRE_STALE_TIME_PERCENT);
        self.recent_time = self.deadline(RECENT_TIME_PERCENT);
    }

    fn deadline(&self, percent: u32) -> u64 {
        self.created + u64::from(percent) * u64::from(self.ttl) * 10
    }

    /// The lower-cased lookup key for this record's name.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Adopts `other`'s `ttl` and `created`, recomputing all three
    /// deadlines.
    pub fn reset_ttl(&mut self, other: &Record) {
        self.ttl = other.ttl;
        self.created = other.created;
        self.recompute_deadlines();
    }

    /// Remaining TTL in seconds as of `now` (a milliseconds timestamp),
    /// floored at zero.
    pub fn remaining_ttl(&self, now: u64) -> u32 {
        if self.expiration_time <= now {
            0
        } else {
            ((self.expiration_time - now) / 1000) as u32
        }
    }

    /// True once `now` has reached the full-TTL deadline.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiration_time <= now
    }

    /// True once `now` has reached the stale (half-TTL) deadline.
    pub fn is_stale(&self, now: u64) -> bool {
        self.stale_time <= now
    }

    /// True while `now` is still within the recent (quarter-TTL) window.
    pub fn is_recent(&self, now: u64) -> bool {
        self.recent_time > now
    }

    /// True if any answer already present in `incoming` makes this record
    /// redundant to send: known-answer suppression (RFC 6762 §7.1).
    pub fn suppressed_by(&self, incoming: &crate::IncomingMessage) -> bool {
        incoming.answers.iter().any(|other| self.suppressed_by_answer(other))
    }

    /// True if `other` has the same entry key and its TTL is more than half
    /// of this record's — the peer can be expected to already hold a fresh
    /// copy, so this record need not be (re-)sent.
    pub fn suppressed_by_answer(&self, other: &Record) -> bool {
        self.entry_eq(other) && u64::from(other.ttl) * 2 > u64::from(self.ttl)
    }

    fn entry_eq(&self, other: &Record) -> bool {
        self.key() == other.key() && self.rtype == other.rtype && self.class == other.class
    }
}

impl PartialEq for Record {
    /// Equality on the entry key plus all variant-specific rdata; the
    /// cache-flush bit, TTL, and timestamps do not participate.
    fn eq(&self, other: &Self) -> bool {
        self.entry_eq(other) && self.data == other.data
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.rtype.hash(state);
        self.class.hash(state);
        self.data.hash(state);
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record[{},{}{},{}={}/{}]",
            self.rtype,
            self.class,
            if self.unique { "-unique" } else { "" },
            self.name,
            self.ttl,
            self.data,
        )
    }
}
