//! Ordered statement buffer with indentation-based navigation, version
//! stamping, and dependency/dependent bookkeeping (`spec.md` §3 "Document",
//! §4.4 "Document Navigation").

mod document;
mod navigation;

pub use document::Document;
pub use navigation::{ancestry_of, has_descendants_of, parent_from_position, parent_of, Note};
