//! The `RegexUnit` tree produced by the pattern sub-parser (`spec.md` §4.3).

use truth_position_tracking::ByteSpan;
use truth_scanner::GraphemeUnit;

/// A named character class resolved from an escaped grapheme inside a
/// pattern (`\d`, `\s`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    NonDigit,
    Whitespace,
    NonWhitespace,
    WordChar,
    NonWordChar,
}

impl CharClass {
    /// Resolves the class named by the character following a `\` inside a
    /// pattern, if any.
    pub fn from_escape_char(ch: char) -> Option<CharClass> {
        match ch {
            'd' => Some(CharClass::Digit),
            'D' => Some(CharClass::NonDigit),
            's' => Some(CharClass::Whitespace),
            'S' => Some(CharClass::NonWhitespace),
            'w' => Some(CharClass::WordChar),
            'W' => Some(CharClass::NonWordChar),
            _ => None,
        }
    }

    /// Whether a single character falls in this class.
    pub fn matches(&self, ch: char) -> bool {
        match self {
            CharClass::Digit => ch.is_ascii_digit(),
            CharClass::NonDigit => !ch.is_ascii_digit(),
            CharClass::Whitespace => ch.is_whitespace(),
            CharClass::NonWhitespace => !ch.is_whitespace(),
            CharClass::WordChar => ch.is_alphanumeric() || ch == '_',
            CharClass::NonWordChar => !(ch.is_alphanumeric() || ch == '_'),
        }
    }
}

/// `*`, `+`, `{n}`, `{n,}`, `{n,m}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    ZeroOrMore,
    OneOrMore,
    Exact(u32),
    AtLeast(u32),
    Range(u32, u32),
}

/// A quantifier trailing a unit, with an optional restraint marker
/// (`spec.md` §4.3: "optionally followed by a restraint marker").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub restrained: bool,
}

/// One member of a `[...]` set: a literal grapheme, an `a-z` range, or a
/// nested named class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetMember {
    Grapheme(char),
    Range(char, char),
    Class(CharClass),
}

/// The three infix-delimiter shapes `spec.md` §4.3 recognizes at the top
/// level of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixDelimiter {
    /// `<…>`
    Normal,
    /// `<<…>>`
    PatternHole,
    /// `</…/>`
    Nominal,
}

/// An infix body: `declarations [joint annotations] quit-token`, captured as
/// raw text plus the flags `spec.md` §4.3 derives from its shape. Full
/// parsing of the declarations/annotations grammar is left to the statement
/// parser, which re-enters the ordinary statement grammar on `raw_body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixBody {
    pub delimiter: InfixDelimiter,
    pub raw_body: String,
    pub nominal: bool,
    pub pattern: bool,
    /// `true` when the body has a joint with no left-hand declarations.
    pub portability: bool,
    pub has_joint: bool,
    /// Byte span of the whole infix, delimiters included, within the
    /// pattern body text it was parsed from.
    pub span: ByteSpan,
    /// Byte span of `raw_body` alone (delimiters excluded).
    pub body_span: ByteSpan,
}

/// One unit in a parsed pattern's top-level (or group-nested) sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexUnit {
    Grapheme { grapheme: GraphemeUnit, quantifier: Option<Quantifier> },
    Sign { class: CharClass, quantifier: Option<Quantifier> },
    Set { negated: bool, members: Vec<SetMember>, quantifier: Option<Quantifier> },
    Group { alternatives: Vec<Vec<RegexUnit>>, quantifier: Option<Quantifier> },
    Infix(InfixBody),
}

impl RegexUnit {
    /// Whether this unit, as parsed, carries a quantifier (used to reject
    /// consecutive quantifiers and to compute totality).
    pub fn quantifier(&self) -> Option<Quantifier> {
        match self {
            RegexUnit::Grapheme { quantifier, .. }
            | RegexUnit::Sign { quantifier, .. }
            | RegexUnit::Set { quantifier, .. }
            | RegexUnit::Group { quantifier, .. } => *quantifier,
            RegexUnit::Infix(_) => None,
        }
    }
}
