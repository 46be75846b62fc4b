//! `UriReader`: the pluggable loader a host plugs in to resolve a `Uri` to
//! source text (`spec.md` §1 "Explicitly out of scope": "URI I/O (`UriReader`
//! is treated as a pluggable loader returning text or an error)").

use thiserror::Error;
use truth_uri::Uri;

/// Failure loading the text behind a `Uri`. Never surfaces to a document's
/// caller as an exception — the reference resolver turns it into an
/// `UnresolvedResource` fault instead (`spec.md` §5 "Cancellation/timeouts").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriReadError {
    #[error("no content available for {0}")]
    NotFound(String),
}

/// Loads the source text a `Uri` names. The trait has no opinion on whether
/// that means a filesystem read, an in-memory map, or a network fetch —
/// `truth-program` only needs synchronous text-or-error back, matching
/// `spec.md` §5's suspension points ("only around external I/O... loading a
/// referenced document's text").
pub trait UriReader {
    fn read(&mut self, uri: &Uri) -> Result<String, UriReadError>;
}

/// A reader that never resolves anything, used where a host has not wired
/// up real URI I/O yet (e.g. tests exercising a single document with no
/// cross-document references).
#[derive(Debug, Default)]
pub struct NullUriReader;

impl UriReader for NullUriReader {
    fn read(&mut self, uri: &Uri) -> Result<String, UriReadError> {
        Err(UriReadError::NotFound(uri.store_string()))
    }
}
