//! A single user-perceived character read from a statement, along with
//! escape-decoding rules (`spec.md` §4.1).

use unicode_segmentation::UnicodeSegmentation;

/// A handful of named Unicode blocks a `\u{Name}` escape can reference.
/// Truth treats these as symbolic placeholders rather than literal
/// characters — see [`GraphemeUnit::BlockReference`].
const REGISTERED_BLOCK_NAMES: &[&str] = &[
    "BasicLatin",
    "Latin1Supplement",
    "GeneralPunctuation",
    "CurrencySymbols",
    "Arrows",
    "MathematicalOperators",
    "BoxDrawing",
    "Emoticons",
    "Dingbats",
];

/// Returns whether `name` is a registered Unicode block name usable in a
/// `\u{Name}` escape.
pub fn is_registered_block_name(name: &str) -> bool {
    REGISTERED_BLOCK_NAMES.contains(&name)
}

/// One user-perceived character (an extended grapheme cluster), or an
/// escape that decoded to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grapheme {
    /// The literal text of this grapheme.
    pub text: String,
    /// Whether this grapheme was produced by an escape sequence.
    pub escaped: bool,
}

impl Grapheme {
    pub fn literal(text: impl Into<String>) -> Self {
        Grapheme { text: text.into(), escaped: false }
    }

    pub fn escaped(text: impl Into<String>) -> Self {
        Grapheme { text: text.into(), escaped: true }
    }
}

/// The result of decoding one scanner read: either a character-bearing
/// [`Grapheme`], or a symbolic Unicode-block reference produced by a
/// `\u{BlockName}` escape (`spec.md` §4.1) — which names a *class* of
/// characters, not a literal one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphemeUnit {
    Char(Grapheme),
    BlockReference(String),
}

/// Consumes one user-perceived character (an extended grapheme cluster per
/// UAX #29 — a base codepoint plus any combining marks or other joined
/// codepoints, e.g. multi-codepoint emoji) from the start of `text`.
/// Returns the grapheme and the number of bytes consumed.
pub fn read_base_grapheme(text: &str) -> Option<(Grapheme, usize)> {
    let cluster = text.graphemes(true).next()?;
    Some((Grapheme::literal(cluster), cluster.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_ascii_char() {
        let (g, len) = read_base_grapheme("ab").expect("grapheme");
        assert_eq!(g.text, "a");
        assert_eq!(len, 1);
    }

    #[test]
    fn absorbs_trailing_combining_marks() {
        // 'e' + COMBINING ACUTE ACCENT (U+0301)
        let text = "e\u{0301}x";
        let (g, len) = read_base_grapheme(text).expect("grapheme");
        assert_eq!(g.text, "e\u{0301}");
        assert_eq!(len, "e\u{0301}".len());
    }

    #[test]
    fn recognizes_registered_block_names() {
        assert!(is_registered_block_name("Arrows"));
        assert!(!is_registered_block_name("NotARealBlock"));
    }
}
