//! Per-document trie of [`Phrase`]s keyed by `(subject, clarifier_key)`
//! (`spec.md` §3 "Phrase", §4.6 "Phrase Graph").
//!
//! This crate owns the trie data structure and its primitive operations
//! (inflate/deflate a spine, peek, path lookup, outbound forks). Computing a
//! declaration span's *spine* — the sequence of `(subject, clarifiers)`
//! steps formed by crossing it with its ancestor statements' declarations —
//! requires a document's indentation-based ancestry and is therefore the
//! edit engine's responsibility (`truth-edit`), not this crate's.

mod key;
mod phrase;

pub use key::{clarifier_key, SubjectKey};
pub use phrase::{compute_forks, Fork, InflatingSpan, Phrase, SpineStep};
