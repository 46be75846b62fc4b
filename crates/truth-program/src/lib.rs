//! Host facade for the Truth incremental front end: document lifecycle,
//! the cause bus, the phrase verification queue, and fault rendering
//! (`spec.md` §6 "Program-level API").

mod cause;
mod config;
mod program;
mod render;
mod uri_reader;

pub use cause::{Cause, FaultRecord, StatementSet};
pub use config::ProgramConfig;
pub use program::Program;
pub use render::render_fault;
pub use uri_reader::{NullUriReader, UriReadError, UriReader};
