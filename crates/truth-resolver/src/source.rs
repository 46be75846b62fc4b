//! The boundary between the resolver and whatever owns the program's
//! document set (`truth-program`), kept as a trait so this crate never
//! depends on the tier-5 host facade (`spec.md` §4.7: "`program.
//! get_document_by_uri(u)` else `program.add_document_from_uri(u)`").

use std::rc::Rc;

use thiserror::Error;
use truth_document::Document;
use truth_uri::Uri;

/// Failure loading/parsing a newly-referenced document. `spec.md` §1 treats
/// the URI reader itself as a pluggable, out-of-scope collaborator — this
/// only distinguishes "could not produce a document" from "produced one".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("referenced document could not be loaded or parsed")]
    LoadFailed,
}

/// Lookup/load of documents by URI, as seen by the resolver. Implemented by
/// `truth-program`'s `Program` over its live document set and pluggable
/// `UriReader`.
pub trait DocumentSource {
    /// A document already known to the program under this URI, if any.
    fn get_document_by_uri(&self, uri: &Uri) -> Option<Rc<Document>>;

    /// Loads and parses a document not yet known to the program, registering
    /// it under `uri` on success (`spec.md` §4.7 step 4, §5 "suspension
    /// points... loading a referenced document's text").
    fn add_document_from_uri(&mut self, uri: &Uri) -> Result<Rc<Document>, ResolveError>;
}
