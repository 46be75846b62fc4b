//! Recursive-descent parser producing a [`RegexUnit`] sequence from pattern
//! delimiter text (`spec.md` §4.3).

use thiserror::Error;
use truth_error::ParseBudget;
use truth_position_tracking::ByteSpan;
use truth_scanner::{GraphemeUnit, Scanner};

use crate::unit::{
    CharClass, InfixBody, InfixDelimiter, Quantifier, QuantifierKind, RegexUnit, SetMember,
};

/// The pattern delimiter that opens and (when total) closes a pattern.
pub const PATTERN_DELIMITER: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern group opened at byte {offset} was never closed")]
    UnclosedGroup { offset: usize },

    #[error("consecutive quantifiers at byte {offset}")]
    ConsecutiveQuantifiers { offset: usize },

    #[error("unclosed character set at byte {offset}")]
    UnclosedSet { offset: usize },

    #[error("pattern group nesting exceeded the configured limit")]
    GroupDepthExceeded,

    #[error("pattern body is empty")]
    EmptyPattern,
}

/// The parsed form of the text between a pattern's delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    pub units: Vec<RegexUnit>,
    /// `true` if the pattern closed with an unquantified terminator.
    pub total: bool,
    /// Bytes of `body` consumed, including the closing delimiter when the
    /// pattern is total. Callers resume parsing the statement from here.
    pub bytes_consumed: usize,
}

/// Parses `body`, the statement text starting just after the opening `/`.
/// `body` may or may not contain the closing `/` — an unclosed pattern is
/// partial, not an error, unless a group/set was left open.
pub fn parse_pattern(body: &str, budget: &ParseBudget) -> Result<ParsedPattern, PatternError> {
    let mut scanner = Scanner::new(body);
    let (units, matched) = parse_sequence(&mut scanner, &[PATTERN_DELIMITER], 0, budget)?;
    if units.is_empty() {
        return Err(PatternError::EmptyPattern);
    }
    let total = matched.is_some();
    Ok(ParsedPattern { units, total, bytes_consumed: scanner.position() })
}

/// Parses a sequence of units until one of `breaks` is consumed or input is
/// exhausted. Returns the units and which break token matched, if any.
fn parse_sequence(
    scanner: &mut Scanner<'_>,
    breaks: &[&'static str],
    depth: usize,
    budget: &ParseBudget,
) -> Result<(Vec<RegexUnit>, Option<&'static str>), PatternError> {
    let mut units = Vec::new();
    loop {
        if !scanner.more() {
            return Ok((units, None));
        }
        if let Some(&matched) = breaks.iter().find(|b| scanner.read(b)) {
            return Ok((units, Some(matched)));
        }
        units.push(parse_one_unit(scanner, depth, budget)?);
    }
}

fn parse_one_unit(
    scanner: &mut Scanner<'_>,
    depth: usize,
    budget: &ParseBudget,
) -> Result<RegexUnit, PatternError> {
    if scanner.peek("[") {
        return parse_set(scanner);
    }
    if scanner.peek("(") {
        return parse_group(scanner, depth, budget);
    }
    if scanner.peek("<") {
        return parse_infix(scanner);
    }
    if let Some(class) = peek_sign_class(scanner) {
        scanner.advance_by(sign_class_escape_len(scanner)); // consume `\` + class letter (e.g. `\d`)
        let quantifier = parse_optional_quantifier(scanner)?;
        return Ok(RegexUnit::Sign { class, quantifier });
    }

    let offset = scanner.position();
    let grapheme =
        scanner.read_grapheme().ok_or(PatternError::UnclosedGroup { offset })?;
    let quantifier = parse_optional_quantifier(scanner)?;
    Ok(RegexUnit::Grapheme { grapheme, quantifier })
}

/// Checks whether the cursor sits on a `\` + known class letter (`\d`,
/// `\S`, …) without consuming anything.
fn peek_sign_class(scanner: &Scanner<'_>) -> Option<CharClass> {
    let rest = scanner.remaining();
    let mut chars = rest.chars();
    if chars.next()? != '\\' {
        return None;
    }
    CharClass::from_escape_char(chars.next()?)
}

/// The byte length of a `\` + class-letter escape at the cursor (both are
/// single-byte ASCII, but computed rather than hard-coded to stay correct
/// if `CharClass::from_escape_char` ever admits a non-ASCII letter).
fn sign_class_escape_len(scanner: &Scanner<'_>) -> usize {
    let mut chars = scanner.remaining().chars();
    let backslash_len = chars.next().map_or(0, char::len_utf8);
    let letter_len = chars.next().map_or(0, char::len_utf8);
    backslash_len + letter_len
}

fn parse_set(scanner: &mut Scanner<'_>) -> Result<RegexUnit, PatternError> {
    let open_offset = scanner.position();
    if !scanner.read("[") {
        return Err(PatternError::UnclosedSet { offset: open_offset });
    }
    let negated = scanner.read("^");
    let mut members = Vec::new();
    loop {
        if scanner.read("]") {
            break;
        }
        if !scanner.more() {
            return Err(PatternError::UnclosedSet { offset: open_offset });
        }
        if let Some(class) = peek_sign_class(scanner) {
            scanner.advance_by(sign_class_escape_len(scanner));
            members.push(SetMember::Class(class));
            continue;
        }
        let start = match scanner.read_grapheme() {
            Some(GraphemeUnit::Char(g)) => g,
            Some(GraphemeUnit::BlockReference(_)) | None => {
                return Err(PatternError::UnclosedSet { offset: open_offset })
            }
        };
        let start_char = start.text.chars().next().unwrap_or('\0');
        if scanner.peek("-") && !scanner.peek("-]") {
            scanner.read("-");
            match scanner.read_grapheme() {
                Some(GraphemeUnit::Char(end)) => {
                    let end_char = end.text.chars().next().unwrap_or('\0');
                    members.push(SetMember::Range(start_char, end_char));
                }
                _ => return Err(PatternError::UnclosedSet { offset: open_offset }),
            }
        } else {
            members.push(SetMember::Grapheme(start_char));
        }
    }
    let quantifier = parse_optional_quantifier(scanner)?;
    Ok(RegexUnit::Set { negated, members, quantifier })
}

fn parse_group(
    scanner: &mut Scanner<'_>,
    depth: usize,
    budget: &ParseBudget,
) -> Result<RegexUnit, PatternError> {
    if depth >= budget.max_group_depth {
        return Err(PatternError::GroupDepthExceeded);
    }
    let open_offset = scanner.position();
    scanner.read("(");

    let mut alternatives = Vec::new();
    loop {
        let (units, matched) = parse_sequence(scanner, &["|", ")"], depth + 1, budget)?;
        alternatives.push(units);
        match matched {
            Some("|") => continue,
            Some(")") => break,
            _ => return Err(PatternError::UnclosedGroup { offset: open_offset }),
        }
    }
    let quantifier = parse_optional_quantifier(scanner)?;
    Ok(RegexUnit::Group { alternatives, quantifier })
}

fn parse_infix(scanner: &mut Scanner<'_>) -> Result<RegexUnit, PatternError> {
    let open_offset = scanner.position();
    let (delimiter, close) = if scanner.read("<<") {
        (InfixDelimiter::PatternHole, ">>")
    } else if scanner.read("</") {
        (InfixDelimiter::Nominal, "/>")
    } else {
        scanner.read("<");
        (InfixDelimiter::Normal, ">")
    };
    let body_start = scanner.position();
    let rest = scanner.remaining();
    let end = rest.find(close).unwrap_or(rest.len());
    let raw_body = rest[..end].to_string();
    scanner.advance_by(end);
    scanner.read(close);

    let has_joint = raw_body.contains(':');
    let portability = has_joint && raw_body.split(':').next().unwrap_or("").trim().is_empty();
    Ok(RegexUnit::Infix(InfixBody {
        span: ByteSpan::new(open_offset, scanner.position()),
        body_span: ByteSpan::new(body_start, body_start + raw_body.len()),
        delimiter,
        raw_body,
        nominal: matches!(delimiter, InfixDelimiter::Nominal),
        pattern: matches!(delimiter, InfixDelimiter::PatternHole),
        portability,
        has_joint,
    }))
}

fn parse_optional_quantifier(scanner: &mut Scanner<'_>) -> Result<Option<Quantifier>, PatternError> {
    let first = parse_one_quantifier(scanner)?;
    if first.is_none() {
        return Ok(None);
    }
    let offset = scanner.position();
    if parse_one_quantifier(scanner)?.is_some() {
        return Err(PatternError::ConsecutiveQuantifiers { offset });
    }
    Ok(first)
}

fn parse_one_quantifier(scanner: &mut Scanner<'_>) -> Result<Option<Quantifier>, PatternError> {
    let kind = if scanner.read("*") {
        QuantifierKind::ZeroOrMore
    } else if scanner.read("+") {
        QuantifierKind::OneOrMore
    } else if scanner.peek("{") {
        match parse_brace_quantifier(scanner) {
            Some(k) => k,
            None => return Ok(None),
        }
    } else {
        return Ok(None);
    };
    let restrained = scanner.read("?");
    Ok(Some(Quantifier { kind, restrained }))
}

fn parse_brace_quantifier(scanner: &mut Scanner<'_>) -> Option<QuantifierKind> {
    let rest = scanner.remaining();
    let close = rest.find('}')?;
    let body = &rest[1..close];
    let kind = if let Some((lo, hi)) = body.split_once(',') {
        if hi.is_empty() {
            QuantifierKind::AtLeast(lo.parse().ok()?)
        } else {
            QuantifierKind::Range(lo.parse().ok()?, hi.parse().ok()?)
        }
    } else {
        QuantifierKind::Exact(body.parse().ok()?)
    };
    scanner.advance_by(close + 1);
    Some(kind)
}
