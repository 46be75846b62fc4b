//! The `Subject` tagged union (`spec.md` §3, §9 "Dynamic dispatch over
//! subject variants").

use truth_regex::RegexUnit;
use truth_uri::Uri;

use crate::term::TermId;

/// A parsed pattern subject: the regex unit tree produced by the pattern
/// sub-parser, its totality, and the CRC of its statement's annotation
/// list (`spec.md` §3, §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub units: Vec<RegexUnit>,
    pub total: bool,
    pub crc: u32,
}

/// One of the four closed subject variants a declaration or annotation can
/// carry. Two subjects are equal iff they are the same variant with equal
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// An interned identifier, with whether it carried the list-operator
    /// suffix (`...`) in this occurrence.
    Term { id: TermId, is_list: bool },
    Pattern(Pattern),
    Uri(Uri),
    /// Used when a statement has a joint but no declarations
    /// (`spec.md` §4.2 step 10).
    Void,
}

impl Subject {
    pub fn term(id: TermId, is_list: bool) -> Subject {
        Subject::Term { id, is_list }
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Subject::Term { .. })
    }

    pub fn is_list_term(&self) -> bool {
        matches!(self, Subject::Term { is_list: true, .. })
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Subject::Pattern(_))
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Subject::Uri(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Subject::Void)
    }

    /// The interned term id, if this is a `Term` subject.
    pub fn term_id(&self) -> Option<TermId> {
        match self {
            Subject::Term { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_with_same_id_and_marking_are_equal() {
        let a = Subject::term(TermId(1), false);
        let b = Subject::term(TermId(1), false);
        assert_eq!(a, b);
    }

    #[test]
    fn terms_with_same_id_but_different_marking_are_not_equal() {
        let a = Subject::term(TermId(1), false);
        let b = Subject::term(TermId(1), true);
        assert_ne!(a, b);
    }

    #[test]
    fn terms_with_different_ids_are_not_equal() {
        let a = Subject::term(TermId(1), false);
        let b = Subject::term(TermId(2), false);
        assert_ne!(a, b);
    }

    #[test]
    fn void_is_distinct_from_any_term() {
        assert_ne!(Subject::Void, Subject::term(TermId(0), false));
    }
}
