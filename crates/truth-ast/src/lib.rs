//! Statement, Subject, and fault data model for parsed Truth documents
//! (`spec.md` §3).
//!
//! A [`Statement`] is immutable after construction; its [`Span`]s hold a
//! weak back-link to it so the parent/child ownership stays one-directional
//! (the document owns statements, statements own spans).

mod fault;
mod flags;
mod span;
mod statement;
mod subject;
mod term;

pub use fault::{Fault, FaultOrigin};
pub use flags::StatementFlags;
pub use span::{CruftObject, Span, SpanDraft};
pub use statement::Statement;
pub use subject::{Pattern, Subject};
pub use term::{Interner, TermId};
