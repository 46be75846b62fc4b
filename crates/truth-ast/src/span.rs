//! Declaration/annotation spans and the cruft objects derived from them
//! (`spec.md` §3).

use std::rc::{Rc, Weak};

use truth_position_tracking::ByteSpan;

use crate::subject::Subject;
use crate::statement::Statement;

/// A not-yet-attached span, as produced by the statement parser before its
/// parent statement exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanDraft {
    pub boundary: ByteSpan,
    pub subject: Subject,
}

impl SpanDraft {
    pub fn new(boundary: ByteSpan, subject: Subject) -> Self {
        SpanDraft { boundary, subject }
    }
}

/// One declaration or annotation: a boundary, its parsed subject, and a
/// non-owning back-link to the statement that contains it.
///
/// The back-link is a [`Weak`] reference rather than an owning one: the
/// statement owns its spans through `all_declarations`/`all_annotations`,
/// so an owning span→statement link would make every statement keep
/// itself alive.
#[derive(Debug, Clone)]
pub struct Span {
    pub boundary: ByteSpan,
    pub subject: Subject,
    parent: Weak<Statement>,
}

impl Span {
    pub(crate) fn new(boundary: ByteSpan, subject: Subject, parent: Weak<Statement>) -> Self {
        Span { boundary, subject, parent }
    }

    /// The statement this span belongs to, if it still exists.
    pub fn parent_statement(&self) -> Option<Rc<Statement>> {
        self.parent.upgrade()
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.boundary == other.boundary && self.subject == other.subject
    }
}
impl Eq for Span {}

/// A reference to an object a fatal (`error`-severity) fault was raised
/// against (`spec.md` §3: `cruft_objects`).
///
/// `Span`/`InfixSpan` cruft is always scoped to the statement under
/// construction, so these carry only the boundary rather than a separate
/// back-link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CruftObject {
    Statement,
    Span(ByteSpan),
    InfixSpan(ByteSpan),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_with_equal_boundary_and_subject_are_equal() {
        use crate::term::TermId;
        let a = SpanDraft::new(ByteSpan::new(0, 3), Subject::term(TermId(0), false));
        let b = SpanDraft::new(ByteSpan::new(0, 3), Subject::term(TermId(0), false));
        assert_eq!(a, b);
    }
}
