use crate::record::Record;
use crate::wire::{CLASS_MASK, CLASS_UNIQUE, TYPE_ANY};

/// A DNS question: a `(name, type, class)` triple, with the class field's
/// top bit reinterpreted as the **QU** bit (RFC 6762) — the querier
/// prefers a unicast reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The name being queried, in its original case.
    pub name: String,

    /// The record type being asked for, or [`crate::TYPE_ANY`].
    pub qtype: u16,

    /// The class being asked in, with the QU bit already split out.
    pub class: u16,

    /// Whether the querier prefers a unicast reply (the QU bit).
    pub unique: bool,
}

impl Question {
    /// Builds a question from a name and type, splitting the QU bit out
    /// of the raw class field as read off the wire (or composed by hand).
    pub fn new(name: impl Into<String>, qtype: u16, raw_class: u16) -> Self {
        Self {
            name: name.into(),
            qtype,
            class: raw_class & CLASS_MASK,
            unique: raw_class & CLASS_UNIQUE != 0,
        }
    }

    /// The lower-cased lookup key for this question's name.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Returns true if `record` would answer this question: matching
    /// class, matching type (or this question asks for [`crate::TYPE_ANY`]),
    /// and matching name. The name comparison is case-sensitive, exactly
    /// as the original implementation compares `self.name == rec.name` —
    /// unlike [`Self::key`], which lower-cases for lookup purposes
    /// elsewhere, this predicate is left case-sensitive to match that
    /// behavior rather than silently changing it.
    pub fn answered_by(&self, record: &Record) -> bool {
        self.class == record.class
            && (self.qtype == record.rtype || self.qtype == TYPE_ANY)
            && self.name == record.name
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[question,{},{},{}]", self.qtype, if self.unique { "QU" } else { "QM" }, self.class, self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::RecordData;
    use crate::wire::{CLASS_IN, TYPE_PTR};

    #[test]
    fn splits_qu_bit() {
        let q = Question::new("_http._tcp.local.", TYPE_PTR, CLASS_IN | CLASS_UNIQUE);
        assert_eq!(q.class, CLASS_IN);
        assert!(q.unique);
    }

    #[test]
    fn answered_by_matching_record() {
        let q = Question::new("_http._tcp.local.", TYPE_PTR, CLASS_IN);
        let r = Record::new(
            "_http._tcp.local.",
            TYPE_PTR,
            CLASS_IN,
            4500,
            0,
            RecordData::Pointer("my-printer._http._tcp.local.".into()),
        );
        assert!(q.answered_by(&r));
    }

    #[test]
    fn any_question_is_answered_by_every_type() {
        let q = Question::new("host.local.", TYPE_ANY, CLASS_IN);
        let r = Record::new("host.local.", crate::TYPE_A, CLASS_IN, 120, 0, RecordData::Address("10.0.0.1".parse().unwrap()));
        assert!(q.answered_by(&r));
    }

    #[test]
    fn answered_by_is_case_sensitive() {
        let q = Question::new("Host.Local.", TYPE_PTR, CLASS_IN);
        let r = Record::new(
            "host.local.",
            TYPE_PTR,
            CLASS_IN,
            4500,
            0,
            RecordData::Pointer("my-printer._http._tcp.local.".into()),
        );
        assert!(!q.answered_by(&r));
    }
}
