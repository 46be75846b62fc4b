//! Comma-separated identifier reading shared by declaration, annotation,
//! and infix-body parsing (`spec.md` §4.2 steps 7/9, §4.3 infix grammar).

use truth_position_tracking::ByteSpan;
use truth_scanner::{Grapheme, GraphemeUnit, Scanner};

/// One identifier read from a declaration or annotation list: its spelling
/// with any list-operator suffix stripped, whether that suffix was present,
/// and the byte span it occupied in the source it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRead {
    pub spelling: String,
    pub is_list: bool,
    pub span: ByteSpan,
}

/// Whether the cursor sits on the joint operator: `:` followed by a space,
/// a tab, or end of input (`spec.md` §4.2 step 8).
pub fn at_joint(scanner: &Scanner<'_>) -> bool {
    if !scanner.peek(":") {
        return false;
    }
    let after = &scanner.remaining()[1..];
    after.is_empty() || after.starts_with(' ') || after.starts_with('\t')
}

/// Reads one identifier at the cursor, stopping before an unescaped comma
/// or (if `stop_at_joint`) the joint operator. Returns `None` if the cursor
/// is already on a stop token, i.e. the identifier is empty.
///
/// `spec.md` §6: "List operator: `...` suffix on a term (term ends with the
/// list marker)" — recognized here as three consecutive, unescaped `.`
/// graphemes at the tail of the reading, stripped from the stored spelling.
pub fn read_identifier(scanner: &mut Scanner<'_>, stop_at_joint: bool) -> Option<IdentifierRead> {
    let start = scanner.position();
    let mut graphemes: Vec<Grapheme> = Vec::new();
    loop {
        if !scanner.more() || scanner.peek(",") {
            break;
        }
        if stop_at_joint && at_joint(scanner) {
            break;
        }
        match scanner.read_grapheme() {
            Some(GraphemeUnit::Char(g)) => graphemes.push(g),
            Some(GraphemeUnit::BlockReference(_)) | None => break,
        }
    }
    let end = scanner.position();
    if graphemes.is_empty() {
        return None;
    }

    let is_list = graphemes.len() >= 3
        && graphemes[graphemes.len() - 3..].iter().all(|g| !g.escaped && g.text == ".");
    let kept = if is_list { &graphemes[..graphemes.len() - 3] } else { &graphemes[..] };
    let spelling: String = kept.iter().map(|g| g.text.as_str()).collect();

    Some(IdentifierRead { spelling: spelling.trim().to_string(), is_list, span: ByteSpan::new(start, end) })
}

/// Reads a combinator-separated (`,`) list of identifiers, stopping at the
/// joint (if `stop_at_joint`) or end of input.
pub fn read_identifier_list(scanner: &mut Scanner<'_>, stop_at_joint: bool) -> Vec<IdentifierRead> {
    let mut out = Vec::new();
    loop {
        match read_identifier(scanner, stop_at_joint) {
            Some(id) => out.push(id),
            None => break,
        }
        if !scanner.read(",") {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_single_identifier_up_to_the_joint() {
        let mut s = Scanner::new("A : B");
        let id = read_identifier(&mut s, true).expect("identifier");
        assert_eq!(id.spelling, "A");
        assert!(at_joint(&s));
    }

    #[test]
    fn reads_a_comma_separated_list() {
        let mut s = Scanner::new("D, E");
        let ids = read_identifier_list(&mut s, true);
        assert_eq!(ids.iter().map(|i| i.spelling.as_str()).collect::<Vec<_>>(), vec!["D", "E"]);
    }

    #[test]
    fn recognizes_trailing_list_marker() {
        let mut s = Scanner::new("Items...");
        let id = read_identifier(&mut s, false).expect("identifier");
        assert_eq!(id.spelling, "Items");
        assert!(id.is_list);
    }

    #[test]
    fn escaped_ellipsis_is_not_a_list_marker() {
        let mut s = Scanner::new("Items\\...");
        let id = read_identifier(&mut s, false).expect("identifier");
        assert_eq!(id.spelling, "Items...");
        assert!(!id.is_list);
    }

    #[test]
    fn empty_identifier_at_joint_returns_none() {
        let mut s = Scanner::new(": x");
        assert!(read_identifier(&mut s, true).is_none());
    }
}
