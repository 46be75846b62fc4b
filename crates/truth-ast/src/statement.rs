//! `Statement`: one parsed source line (`spec.md` §3).

use std::cell::Cell;
use std::rc::Rc;

use crate::fault::Fault;
use crate::flags::StatementFlags;
use crate::span::{CruftObject, Span, SpanDraft};

/// One source line after parsing. Immutable after construction except for
/// the `disposed` flag, which the edit engine sets when the statement is
/// removed from its document (`spec.md` §3, §4.5).
#[derive(Debug)]
pub struct Statement {
    pub source_text: String,
    /// Count of leading tabs/spaces.
    pub indent: usize,
    /// Byte offset of the joint operator, or `None` if the parser never
    /// reached one.
    pub joint_position: Option<usize>,
    /// Trimmed annotation text, suitable as input to a total pattern.
    pub sum: String,
    pub flags: StatementFlags,
    pub all_declarations: Vec<Span>,
    pub all_annotations: Vec<Span>,
    pub cruft_objects: Vec<CruftObject>,
    pub faults: Vec<Fault>,
    disposed: Cell<bool>,
}

impl Statement {
    /// Builds a statement and attaches its spans' back-links in one step,
    /// via [`Rc::new_cyclic`] — the spans need a [`Weak`](std::rc::Weak)
    /// reference to the very statement being constructed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_text: String,
        indent: usize,
        joint_position: Option<usize>,
        sum: String,
        flags: StatementFlags,
        declarations: Vec<SpanDraft>,
        annotations: Vec<SpanDraft>,
        cruft_objects: Vec<CruftObject>,
        faults: Vec<Fault>,
    ) -> Rc<Statement> {
        Rc::new_cyclic(|weak| Statement {
            source_text,
            indent,
            joint_position,
            sum,
            flags,
            all_declarations: declarations
                .into_iter()
                .map(|d| Span::new(d.boundary, d.subject, weak.clone()))
                .collect(),
            all_annotations: annotations
                .into_iter()
                .map(|a| Span::new(a.boundary, a.subject, weak.clone()))
                .collect(),
            cruft_objects,
            faults,
            disposed: Cell::new(false),
        })
    }

    pub fn is_noop(&self) -> bool {
        self.flags.is_noop()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Marks this statement removed from its document. Clears nothing else:
    /// the statement's fields remain readable for any code still holding a
    /// strong reference (`spec.md` §5: "disposal of a statement clears its
    /// span back-references" is satisfied by `Span`'s back-link already
    /// being weak — once the document drops its `Rc`, the weak link simply
    /// stops upgrading).
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    /// The sole declaration's subject, for statements where invariants (ii)
    /// and (v) guarantee there is exactly one.
    pub fn sole_declaration(&self) -> Option<&Span> {
        if self.all_declarations.len() == 1 {
            self.all_declarations.first()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;
    use crate::term::TermId;
    use truth_position_tracking::ByteSpan;

    #[test]
    fn spans_back_link_to_their_statement() {
        let declarations = vec![SpanDraft::new(ByteSpan::new(0, 1), Subject::term(TermId(0), false))];
        let statement = Statement::new(
            "A : B".to_string(),
            0,
            Some(2),
            "B".to_string(),
            StatementFlags::default(),
            declarations,
            vec![],
            vec![],
            vec![],
        );
        let parent = statement.all_declarations[0].parent_statement();
        assert!(parent.is_some());
        assert!(Rc::ptr_eq(&parent.unwrap(), &statement));
    }

    #[test]
    fn dispose_sets_the_flag_without_touching_fields() {
        let statement = Statement::new(
            "// a comment".to_string(),
            0,
            None,
            String::new(),
            StatementFlags { is_comment: true, ..Default::default() },
            vec![],
            vec![],
            vec![],
            vec![],
        );
        assert!(!statement.is_disposed());
        statement.dispose();
        assert!(statement.is_disposed());
        assert!(statement.is_noop());
    }

    #[test]
    fn weak_back_link_stops_upgrading_once_the_statement_is_dropped() {
        let declarations = vec![SpanDraft::new(ByteSpan::new(0, 1), Subject::Void)];
        let statement = Statement::new(
            ": x".to_string(),
            0,
            Some(0),
            "x".to_string(),
            StatementFlags { is_vacuous: true, ..Default::default() },
            declarations,
            vec![],
            vec![],
            vec![],
        );
        let span = statement.all_declarations[0].clone();
        drop(statement);
        assert!(span.parent_statement().is_none());
    }
}
