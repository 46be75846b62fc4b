//! A small backtracking matcher over a parsed pattern's `RegexUnit`
//! sequence, used to answer the fault checks in `spec.md` §4.2 that need a
//! compiled matcher rather than a structural read of the tree:
//! `PatternCanMatchEmpty` (does it match `""`?) and
//! `PatternPartialWithCombinator` (does a partial pattern literally match
//! `,`?).
//!
//! This is not a general-purpose regex engine — it exists to answer those
//! two yes/no questions over the unit trees the pattern sub-parser
//! produces, so it favors a small, obviously-terminating implementation
//! over raw matching speed.

use truth_scanner::GraphemeUnit;

use crate::unit::{CharClass, Quantifier, QuantifierKind, RegexUnit, SetMember};

/// Whether `units`, matched in full against the empty string, succeeds.
pub fn can_match_empty(units: &[RegexUnit]) -> bool {
    matches_fully(units, "")
}

/// Whether `units`, matched in full (start-to-end) against `text`, succeeds.
pub fn matches_fully(units: &[RegexUnit], text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    match_sequence(units, &chars, 0).into_iter().any(|end| end == chars.len())
}

fn match_sequence(units: &[RegexUnit], chars: &[char], pos: usize) -> Vec<usize> {
    let Some((first, rest)) = units.split_first() else {
        return vec![pos];
    };
    let mut ends = Vec::new();
    for start in match_unit(first, chars, pos) {
        ends.extend(match_sequence(rest, chars, start));
    }
    ends.sort_unstable();
    ends.dedup();
    ends
}

fn match_unit(unit: &RegexUnit, chars: &[char], pos: usize) -> Vec<usize> {
    match unit {
        RegexUnit::Grapheme { grapheme, quantifier } => {
            repeat(|p| match_grapheme_once(grapheme, chars, p), quantifier, pos, chars.len())
        }
        RegexUnit::Sign { class, quantifier } => {
            repeat(|p| match_class_once(*class, chars, p), quantifier, pos, chars.len())
        }
        RegexUnit::Set { negated, members, quantifier } => {
            repeat(|p| match_set_once(*negated, members, chars, p), quantifier, pos, chars.len())
        }
        RegexUnit::Group { alternatives, quantifier } => repeat(
            |p| {
                let mut ends = Vec::new();
                for alt in alternatives {
                    ends.extend(match_sequence(alt, chars, p));
                }
                ends.sort_unstable();
                ends.dedup();
                ends
            },
            quantifier,
            pos,
            chars.len(),
        ),
        // Infix bodies carry type annotations, not matchable text: they
        // consume zero characters.
        RegexUnit::Infix(_) => vec![pos],
    }
}

fn match_grapheme_once(grapheme: &GraphemeUnit, chars: &[char], pos: usize) -> Vec<usize> {
    let GraphemeUnit::Char(g) = grapheme else {
        // A block-reference grapheme names a class of characters, not a
        // literal one; without a registry of block membership this matcher
        // cannot resolve it, so it never matches.
        return Vec::new();
    };
    let wanted: Vec<char> = g.text.chars().collect();
    if pos + wanted.len() <= chars.len() && chars[pos..pos + wanted.len()] == wanted[..] {
        vec![pos + wanted.len()]
    } else {
        Vec::new()
    }
}

fn match_class_once(class: CharClass, chars: &[char], pos: usize) -> Vec<usize> {
    match chars.get(pos) {
        Some(&ch) if class.matches(ch) => vec![pos + 1],
        _ => Vec::new(),
    }
}

fn match_set_once(negated: bool, members: &[SetMember], chars: &[char], pos: usize) -> Vec<usize> {
    let Some(&ch) = chars.get(pos) else {
        return Vec::new();
    };
    let hit = members.iter().any(|m| match m {
        SetMember::Grapheme(c) => *c == ch,
        SetMember::Range(lo, hi) => *lo <= ch && ch <= *hi,
        SetMember::Class(class) => class.matches(ch),
    });
    if hit != negated {
        vec![pos + 1]
    } else {
        Vec::new()
    }
}

/// Repeatedly applies `once` starting from `pos`, per the repetition bounds
/// in `quantifier` (absent = exactly once), returning every reachable end
/// position. Terminates as soon as a repetition step makes no progress, so
/// a zero-width unit under `*`/`+` never loops.
fn repeat(
    once: impl Fn(usize) -> Vec<usize>,
    quantifier: &Option<Quantifier>,
    pos: usize,
    max_len: usize,
) -> Vec<usize> {
    let (min, max) = match quantifier {
        None => (1, Some(1)),
        Some(Quantifier { kind, .. }) => match kind {
            QuantifierKind::ZeroOrMore => (0, None),
            QuantifierKind::OneOrMore => (1, None),
            QuantifierKind::Exact(n) => (*n, Some(*n)),
            QuantifierKind::AtLeast(n) => (*n, None),
            QuantifierKind::Range(n, m) => (*n, Some(*m)),
        },
    };

    let mut reachable = vec![pos];
    let mut results: Vec<usize> = if min == 0 { vec![pos] } else { Vec::new() };
    let mut count: u32 = 0;
    let bound = max.unwrap_or(max_len as u32 + 1);

    while count < bound {
        let mut next: Vec<usize> = Vec::new();
        for &p in &reachable {
            next.extend(once(p));
        }
        next.sort_unstable();
        next.dedup();
        if next.is_empty() || next == reachable {
            break;
        }
        count += 1;
        reachable = next;
        if count >= min {
            results.extend(reachable.iter().copied());
        }
    }
    results.sort_unstable();
    results.dedup();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;
    use truth_error::ParseBudget;

    fn parse(body: &str) -> Vec<RegexUnit> {
        parse_pattern(body, &ParseBudget::default()).expect("parses").units
    }

    #[test]
    fn plus_quantified_digit_class_rejects_empty_and_matches_digits() {
        let units = parse("\\d+/");
        assert!(!matches_fully(&units, ""));
        assert!(matches_fully(&units, "12"));
        assert!(!matches_fully(&units, "1a"));
    }

    #[test]
    fn star_quantified_unit_can_match_empty() {
        let units = parse("a*/");
        assert!(can_match_empty(&units));
    }

    #[test]
    fn unquantified_literal_cannot_match_empty() {
        let units = parse("a/");
        assert!(!can_match_empty(&units));
    }

    #[test]
    fn group_alternation_matches_either_branch() {
        let units = parse("(cat|dog)/");
        assert!(matches_fully(&units, "cat"));
        assert!(matches_fully(&units, "dog"));
        assert!(!matches_fully(&units, "cow"));
    }

    #[test]
    fn partial_pattern_can_literally_match_a_comma() {
        let units = parse(",");
        assert!(matches_fully(&units, ","));
    }
}
