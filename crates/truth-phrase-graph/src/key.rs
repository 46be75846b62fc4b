//! Hashable forwarding-map key derived from a `Subject`, and the clarifier
//! key canonicalization (`spec.md` §3 "Clarifier / Clarifier-key", §4.6
//! "Keying").

use truth_ast::{Subject, TermId};

/// A hashable stand-in for `Subject`. Distinct subjects are not guaranteed
/// to produce distinct keys across variants in principle, but in practice
/// `TermId`/pattern-CRC/URI-store-string spaces don't collide across their
/// own discriminant, so a `SubjectKey` match is always followed by a full
/// `Subject` equality check before anything observable depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    Term(TermId, bool),
    Pattern(u32),
    Uri(String),
    Void,
}

impl SubjectKey {
    pub fn of(subject: &Subject) -> SubjectKey {
        match subject {
            Subject::Term { id, is_list } => SubjectKey::Term(*id, *is_list),
            Subject::Pattern(pattern) => SubjectKey::Pattern(pattern.crc),
            Subject::Uri(uri) => SubjectKey::Uri(uri.store_string()),
            Subject::Void => SubjectKey::Void,
        }
    }
}

/// Canonical clarifier key for a set of clarifier term ids: ascending-sorted
/// ids, comma-joined (`spec.md` §4.6: "sort clarifier term ids ascending,
/// comma-join").
pub fn clarifier_key(clarifiers: &[TermId]) -> String {
    let mut ids: Vec<u32> = clarifiers.iter().map(|t| t.0).collect();
    ids.sort_unstable();
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clarifier_key_is_order_independent() {
        let a = clarifier_key(&[TermId(3), TermId(1)]);
        let b = clarifier_key(&[TermId(1), TermId(3)]);
        assert_eq!(a, b);
    }

    #[test]
    fn clarifier_key_of_no_clarifiers_is_empty() {
        assert_eq!(clarifier_key(&[]), "");
    }

    #[test]
    fn terms_with_equal_id_and_marking_share_a_subject_key() {
        let a = SubjectKey::of(&Subject::term(TermId(5), false));
        let b = SubjectKey::of(&Subject::term(TermId(5), false));
        assert_eq!(a, b);
    }

    #[test]
    fn terms_and_void_never_share_a_subject_key() {
        assert_ne!(SubjectKey::of(&Subject::term(TermId(0), false)), SubjectKey::of(&Subject::Void));
    }
}
