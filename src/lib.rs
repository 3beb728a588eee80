#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![deny(clippy::cast_possible_wrap)]

//! A Multicast DNS (mDNS) wire codec.
//!
//! This crate parses incoming mDNS datagrams into a structured in-memory
//! form, and serializes outgoing mDNS messages (questions plus answer,
//! authority, and additional records) into one or more UDP-ready byte
//! strings, following [RFC 1035] message format with the [RFC 6762]
//! multicast extensions and the [RFC 6763] DNS-SD conventions.
//!
//! Network I/O, socket and interface selection, the service-discovery
//! cache, record expiry timers, and service browsers/registrars all live
//! outside this crate; it only speaks the wire format.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035
//! [RFC 6762]: https://tools.ietf.org/html/rfc6762
//! [RFC 6763]: https://tools.ietf.org/html/rfc6763

mod wire;
pub use self::wire::{
    CLASS_IN, CLASS_MASK, CLASS_UNIQUE, EXPIRE_FULL_TIME_PERCENT, EXPIRE_STALE_TIME_PERCENT,
    FLAGS_QR_MASK, FLAGS_QR_QUERY, FLAGS_QR_RESPONSE, FLAGS_TC, MAX_MSG_ABSOLUTE, MAX_MSG_TYPICAL,
    RECENT_TIME_PERCENT, TYPE_A, TYPE_AAAA, TYPE_ANY, TYPE_CNAME, TYPE_HINFO, TYPE_PTR, TYPE_SRV,
    TYPE_TXT,
};

mod error;
pub use self::error::{BuildError, DecodeError};

mod name;

pub mod record;
pub use self::record::{Question, Record, RecordData};

mod incoming;
pub use self::incoming::IncomingMessage;

mod outgoing;
pub use self::outgoing::OutgoingMessage;

mod cache;
pub use self::cache::Cache;
