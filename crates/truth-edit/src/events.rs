//! Invalidate/revalidate event payloads emitted by a transaction (`spec.md`
//! §4.5, §6: "`CauseInvalidate`/`CauseRevalidate` — paired; indices align
//! with `statements`").
//!
//! These are plain data, not a publish/subscribe mechanism — `truth-edit`
//! has no observer concept of its own. `truth-program`'s cause bus wraps
//! them into its `Cause` enum after a transaction completes.

use std::rc::Rc;

use truth_ast::Statement;

/// One invalidate or revalidate broadcast. `spec.md` §4.5: "Emit
/// `Invalidate(document, old_statements, indices)`"; whole-document
/// invalidation is represented by `whole_document = true` with both vectors
/// empty, matching "empty arrays if whole-document invalidation".
#[derive(Debug, Clone, Default)]
pub struct InvalidationSet {
    pub statements: Vec<Rc<Statement>>,
    pub indices: Vec<usize>,
    pub whole_document: bool,
}

impl InvalidationSet {
    pub fn whole_document() -> Self {
        InvalidationSet { statements: Vec::new(), indices: Vec::new(), whole_document: true }
    }

    pub fn empty() -> Self {
        InvalidationSet::default()
    }

    pub fn of(pairs: Vec<(usize, Rc<Statement>)>) -> Self {
        let mut indices = Vec::with_capacity(pairs.len());
        let mut statements = Vec::with_capacity(pairs.len());
        for (index, statement) in pairs {
            indices.push(index);
            statements.push(statement);
        }
        InvalidationSet { statements, indices, whole_document: false }
    }
}

/// Everything one `edit()` transaction produced: the invalidate/revalidate
/// pair, the version stamp after the transaction, and the URI-statement
/// deltas the reference resolver needs (`spec.md` §4.5 "Finalization": "If
/// any URI statement was added or removed by the transaction, invoke the
/// reference resolver with the add/remove deltas").
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub invalidate: InvalidationSet,
    pub revalidate: InvalidationSet,
    pub added_uri_statements: Vec<Rc<Statement>>,
    pub removed_uri_statements: Vec<Rc<Statement>>,
    pub version: u64,
    /// Whether this transaction actually mutated the statement buffer. A
    /// `false` here means no invalidate/revalidate/version-bump happened —
    /// an empty call batch is a legal no-op transaction.
    pub mutated: bool,
}

impl EditOutcome {
    pub fn no_op(version: u64) -> Self {
        EditOutcome {
            invalidate: InvalidationSet::empty(),
            revalidate: InvalidationSet::empty(),
            added_uri_statements: Vec::new(),
            removed_uri_statements: Vec::new(),
            version,
            mutated: false,
        }
    }
}
