//! The cause event stream a [`crate::Program`] publishes to its registered
//! listeners (`spec.md` §6 "Cause event stream", §9 "Observer pattern (cause
//! bus)": "Replace inheritance-based `Cause<R>` with a generic event enum
//! and a subscribe API parameterized over the concrete event variant.
//! Callbacks run synchronously in publish order").

use std::rc::Rc;

use truth_ast::{Fault, Statement};
use truth_document::Document;
use truth_uri::Uri;

/// One fault attributed to the statement that raised it. `Cause::FaultChange`
/// carries these rather than bare `Fault`s because a host needs the
/// statement identity to compute a line number for rendering (`spec.md` §6
/// "Fault rendering").
#[derive(Debug, Clone)]
pub struct FaultRecord {
    pub statement: Rc<Statement>,
    pub fault: Fault,
}

impl PartialEq for FaultRecord {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.statement, &other.statement) && self.fault == other.fault
    }
}

/// One invalidate or revalidate broadcast, reshaped from `truth_edit`'s
/// `InvalidationSet` for publication (`spec.md` §6: "indices align with
/// `statements`").
#[derive(Debug, Clone)]
pub struct StatementSet {
    pub statements: Vec<Rc<Statement>>,
    pub indices: Vec<usize>,
    pub whole_document: bool,
}

/// An event published by a [`crate::Program`] to every registered listener,
/// in registration order, synchronously (`spec.md` §6, §9).
#[derive(Debug, Clone)]
pub enum Cause {
    /// After a document is fully parsed and saved.
    DocumentCreate(Rc<Document>),
    /// Immediately before removal from the program.
    DocumentDelete(Rc<Document>),
    /// After `update_uri`.
    DocumentUriChange(Rc<Document>, Option<Uri>),
    /// Paired with a following `Revalidate` before the next `EditComplete`.
    Invalidate(Rc<Document>, StatementSet),
    Revalidate(Rc<Document>, StatementSet),
    /// The last event of each successful transaction.
    EditComplete(Rc<Document>),
    /// Symmetric fault delta: faults present after the transaction that
    /// were not present before (`added`), and vice versa (`removed`).
    FaultChange { added: Vec<FaultRecord>, removed: Vec<FaultRecord> },
}
