//! Statement parser: turns one source line of Truth text into a
//! [`truth_ast::Statement`] (`spec.md` §4.2).
//!
//! This crate is the orchestration layer over `truth-scanner` (character
//! reading) and `truth-regex` (pattern/infix sub-parsing): it owns the
//! ten-step statement grammar and the post-parse fault validations that
//! depend on a fully parsed statement.

mod identifier;
mod statement;
mod validate;

pub use identifier::{read_identifier, read_identifier_list, IdentifierRead};
pub use statement::parse_statement;
