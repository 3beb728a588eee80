use std::collections::HashMap;
use std::net::IpAddr;

use crate::error::BuildError;
use crate::name::write_name;
use crate::wire::write_character_string;

/// A record's type-specific payload.
///
/// This mirrors the shape of a class hierarchy with one `write` method
/// per leaf class, but as a single tagged union with one dispatcher —
/// there is no virtual base-class default to invoke by mistake, so there
/// is no equivalent of an "abstract method called" error here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    /// An **A** or **AAAA** record: a raw IPv4 or IPv6 address.
    Address(IpAddr),

    /// A **PTR** or **CNAME** record: an alias domain name.
    Pointer(String),

    /// A **TXT** record: an opaque byte string, the full rdata.
    Text(Vec<u8>),

    /// An **SRV** record.
    Service {
        /// Lower values are tried first.
        priority: u16,
        /// Used to pick among records of equal priority.
        weight: u16,
        /// The port the service listens on.
        port: u16,
        /// The hostname serving the target.
        target: String,
    },

    /// A **HINFO** record.
    Hinfo {
        /// The CPU type, as free text.
        cpu: String,
        /// The operating system, as free text.
        os: String,
    },
}

impl RecordData {
    /// The wire type number for this variant's rdata.
    pub fn rtype(&self) -> u16 {
        match self {
            Self::Address(IpAddr::V4(_)) => crate::TYPE_A,
            Self::Address(IpAddr::V6(_)) => crate::TYPE_AAAA,
            Self::Pointer(_) => crate::TYPE_PTR,
            Self::Text(_) => crate::TYPE_TXT,
            Self::Service { .. } => crate::TYPE_SRV,
            Self::Hinfo { .. } => crate::TYPE_HINFO,
        }
    }

    /// Emits this record's rdata onto `buf`, compressing any embedded
    /// names against `names` the same way the enclosing message does.
    pub(crate) fn write(
        &self,
        buf: &mut Vec<u8>,
        names: &mut HashMap<String, u16>,
    ) -> Result<(), BuildError> {
        match self {
            Self::Address(IpAddr::V4(addr)) => {
                buf.extend_from_slice(&addr.octets());
            }
            Self::Address(IpAddr::V6(addr)) => {
                buf.extend_from_slice(&addr.octets());
            }
            Self::Pointer(alias) => {
                write_name(buf, names, alias)?;
            }
            Self::Text(text) => {
                buf.extend_from_slice(text);
            }
            Self::Service { priority, weight, port, target } => {
                buf.extend_from_slice(&priority.to_be_bytes());
                buf.extend_from_slice(&weight.to_be_bytes());
                buf.extend_from_slice(&port.to_be_bytes());
                write_name(buf, names, target)?;
            }
            Self::Hinfo { cpu, os } => {
                write_character_string(buf, cpu.as_bytes())?;
                write_character_string(buf, os.as_bytes())?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for RecordData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Pointer(alias) => write!(f, "{alias}"),
            Self::Text(text) => write!(f, "{}", String::from_utf8_lossy(text)),
            Self::Service { priority, weight, port, target } => {
                write!(f, "{priority} {weight} {port} {target}")
            }
            Self::Hinfo { cpu, os } => write!(f, "{cpu} {os}"),
        }
    }
}
