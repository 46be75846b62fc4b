//! Regex/pattern sub-parser for Truth pattern-delimited subjects
//! (`spec.md` §4.3).
//!
//! A pattern's body (the text between its `/` delimiters) parses into a
//! sequence of [`RegexUnit`] values. [`parse_pattern`] performs that parse
//! and computes totality; [`matcher`] answers the handful of yes/no
//! matching questions the statement parser's fault checks need;
//! [`compute_pattern_crc`] gives two patterns with the same annotations a
//! stable, order-independent identity.

mod crc;
mod matcher;
mod parser;
mod unit;

pub use crc::compute_pattern_crc;
pub use matcher::{can_match_empty, matches_fully};
pub use parser::{parse_pattern, ParsedPattern, PatternError, PATTERN_DELIMITER};
pub use unit::{
    CharClass, InfixBody, InfixDelimiter, Quantifier, QuantifierKind, RegexUnit, SetMember,
};
