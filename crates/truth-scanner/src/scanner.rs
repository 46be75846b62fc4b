//! Cursor over a single statement's source text, with escape decoding
//! (`spec.md` §4.1).

use truth_position_tracking::ByteSpan;

use crate::grapheme::{self, Grapheme, GraphemeUnit};

/// The tokens a `\` escape can precede to produce an escaped-but-literal
/// grapheme, other than a hex/name escape.
const ESCAPABLE_LITERALS: &[&str] = &[" ", "\t", ",", "...", "\\"];

/// A read cursor over one statement's text. Never crosses statement
/// boundaries — a fresh `Scanner` is built per statement.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Scanner { text, pos: 0 }
    }

    /// The byte offset of the cursor within the statement's text.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether there is more text left to read.
    pub fn more(&self) -> bool {
        self.pos < self.text.len()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// The unread tail of the statement's text.
    pub fn remaining(&self) -> &'a str {
        self.rest()
    }

    /// Advances the cursor by `n` bytes unconditionally. Callers are
    /// responsible for `n` landing on a char boundary within the text.
    pub fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    /// Checks whether `tok` occurs at the cursor, without consuming it.
    pub fn peek(&self, tok: &str) -> bool {
        self.rest().starts_with(tok)
    }

    /// Consumes `tok` if it occurs at the cursor. Returns whether it matched.
    pub fn read(&mut self, tok: &str) -> bool {
        if self.peek(tok) {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    /// Consumes `tok` only if it is immediately followed by end of input —
    /// used for terminal markers like a trailing ellipsis.
    pub fn read_then_terminal(&mut self, tok: &str) -> bool {
        if self.peek(tok) && self.rest().len() == tok.len() {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    /// Consumes a run of tabs and spaces at the cursor, returning its span.
    /// Returns an empty span if the cursor isn't on whitespace.
    pub fn read_whitespace(&mut self) -> ByteSpan {
        let start = self.pos;
        while let Some(ch) = self.rest().chars().next() {
            if ch == ' ' || ch == '\t' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        ByteSpan::new(start, self.pos)
    }

    /// Consumes text up to (not including) the first occurrence of any of
    /// `delims`, or to the end of the statement if none occur. Returns the
    /// consumed span.
    pub fn read_until(&mut self, delims: &[char]) -> ByteSpan {
        let start = self.pos;
        let found = self.rest().find(|c| delims.contains(&c));
        let len = found.unwrap_or_else(|| self.rest().len());
        self.pos += len;
        ByteSpan::new(start, self.pos)
    }

    /// Reads one grapheme at the cursor, applying escape rules. Returns
    /// `None` at end of input.
    ///
    /// `spec.md` §4.1 escape forms:
    /// - `\` + one of space, tab, comma, `...`, or `\` itself: an escaped
    ///   literal grapheme of that one character/token.
    /// - `\u{HEX}` with 1–5 lowercase hex digits: decodes to the named
    ///   Unicode scalar value.
    /// - `\u{Name}` where `Name` is a registered Unicode block name: a
    ///   symbolic block reference, not a literal character.
    /// - A bare `\` at end of input: the literal backslash character.
    /// - Anything else: the next user-perceived character, unescaped.
    pub fn read_grapheme(&mut self) -> Option<GraphemeUnit> {
        if !self.more() {
            return None;
        }
        if self.rest().starts_with('\\') {
            return Some(self.read_escape());
        }
        let (g, len) = grapheme::read_base_grapheme(self.rest())?;
        self.pos += len;
        Some(GraphemeUnit::Char(g))
    }

    fn read_escape(&mut self) -> GraphemeUnit {
        debug_assert!(self.rest().starts_with('\\'));
        let after_backslash = &self.rest()[1..];

        if let Some(unit) = self.try_read_unicode_escape(after_backslash) {
            return unit;
        }

        for literal in ESCAPABLE_LITERALS {
            if after_backslash.starts_with(literal) {
                self.pos += 1 + literal.len();
                return GraphemeUnit::Char(Grapheme::escaped(*literal));
            }
        }

        // Bare trailing backslash: the literal backslash character.
        self.pos += 1;
        GraphemeUnit::Char(Grapheme::escaped("\\"))
    }

    /// Attempts to parse `\u{...}` starting just after the leading `\` (i.e.
    /// `rest` begins with `u{`). Does not advance the cursor itself; the
    /// caller advances only once a full match is confirmed.
    fn try_read_unicode_escape(&mut self, rest: &str) -> Option<GraphemeUnit> {
        let inner = rest.strip_prefix("u{")?;
        let close = inner.find('}')?;
        let body = &inner[..close];
        let consumed = 1 + "u{".len() + body.len() + "}".len(); // backslash + u{ + body + }

        if !body.is_empty()
            && body.len() <= 5
            && body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            let code = u32::from_str_radix(body, 16).ok()?;
            let ch = char::from_u32(code)?;
            self.pos += consumed;
            return Some(GraphemeUnit::Char(Grapheme::escaped(ch.to_string())));
        }

        if grapheme::is_registered_block_name(body) {
            self.pos += consumed;
            return Some(GraphemeUnit::BlockReference(body.to_string()));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_and_peek_reflect_cursor_state() {
        let s = Scanner::new("abc");
        assert!(s.more());
        assert!(s.peek("ab"));
        assert!(!s.peek("ba"));
    }

    #[test]
    fn read_consumes_matching_prefix_only() {
        let mut s = Scanner::new("...rest");
        assert!(s.read("..."));
        assert_eq!(s.position(), 3);
        assert!(!s.read("..."));
    }

    #[test]
    fn read_then_terminal_requires_end_of_input() {
        let mut s = Scanner::new("...more");
        assert!(!s.read_then_terminal("..."));
        assert_eq!(s.position(), 0);

        let mut tail = Scanner::new("...");
        assert!(tail.read_then_terminal("..."));
        assert!(!tail.more());
    }

    #[test]
    fn read_whitespace_spans_tabs_and_spaces_only() {
        let mut s = Scanner::new("  \t x");
        let span = s.read_whitespace();
        assert_eq!(span, ByteSpan::new(0, 3));
        assert_eq!(s.position(), 3);
    }

    #[test]
    fn read_until_stops_at_first_delimiter() {
        let mut s = Scanner::new("abc,def");
        let span = s.read_until(&[',']);
        assert_eq!(span, ByteSpan::new(0, 3));
        assert!(s.read(","));
    }

    #[test]
    fn read_grapheme_yields_unescaped_chars() {
        let mut s = Scanner::new("ab");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::literal("a")));
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn read_grapheme_decodes_escaped_space() {
        let mut s = Scanner::new("\\ rest");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::escaped(" ")));
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn read_grapheme_decodes_escaped_ellipsis() {
        let mut s = Scanner::new("\\...x");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::escaped("...")));
        assert_eq!(s.position(), 4);
    }

    #[test]
    fn read_grapheme_decodes_hex_escape() {
        let mut s = Scanner::new("\\u{41}rest");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::escaped("A")));
        assert_eq!(s.position(), "\\u{41}".len());
    }

    #[test]
    fn read_grapheme_rejects_uppercase_hex_digits() {
        // Uppercase hex falls through to the block-name branch, and "41" in
        // uppercase form isn't a registered block, so neither matches —
        // it decays to the bare-backslash case.
        let mut s = Scanner::new("\\u{4A}rest");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::escaped("\\")));
    }

    #[test]
    fn read_grapheme_decodes_block_name_escape() {
        let mut s = Scanner::new("\\u{Arrows}rest");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::BlockReference("Arrows".to_string()));
        assert_eq!(s.position(), "\\u{Arrows}".len());
    }

    #[test]
    fn read_grapheme_bare_trailing_backslash_is_literal() {
        let mut s = Scanner::new("\\");
        let g = s.read_grapheme().expect("grapheme");
        assert_eq!(g, GraphemeUnit::Char(Grapheme::escaped("\\")));
        assert!(!s.more());
    }

    #[test]
    fn read_grapheme_returns_none_at_end_of_input() {
        let mut s = Scanner::new("");
        assert_eq!(s.read_grapheme(), None);
    }
}
