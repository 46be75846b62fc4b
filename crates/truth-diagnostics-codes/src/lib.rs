//! Stable fault codes and severities for the Truth front end.
//!
//! This crate provides the canonical, closed enumeration of fault kinds a
//! document can carry (`spec.md` §4.8, §7). Faults are value objects:
//! identity doesn't matter, only `(code, severity, source, range)`.
//!
//! # Code Ranges
//!
//! | Range     | Category                          |
//! |-----------|------------------------------------|
//! | T001-T099 | Statement-level parse faults       |
//! | T100-T149 | Pattern/regex faults               |
//! | T150-T199 | Infix faults                       |
//! | T200-T249 | Declaration/annotation faults       |
//! | T300-T349 | Inter-document reference faults    |

use std::fmt;

/// Severity of a fault. Severity `Error` excludes the faulting source from
/// downstream type analysis (`is_cruft`); `Warning` and below do not
/// (`spec.md` §4.8, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Hint,
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// The source object a fault is attached to (`spec.md` §3, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultSourceKind {
    Statement,
    Span,
    InfixSpan,
}

/// Stable fault kinds for the Truth front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultKind {
    // Statement-level parse faults (T001-T099)
    TabsAndSpaces,
    StatementBeginsWithComma,
    StatementBeginsWithEllipsis,
    StatementBeginsWithEscapedSpace,
    StatementContainsOnlyEscapeCharacter,

    // Pattern/regex faults (T100-T149)
    PatternInvalid,
    PatternWithoutAnnotation,
    PatternCanMatchEmpty,
    PatternPartialWithCombinator,

    // Infix faults (T150-T199)
    InfixDuplicateIdentifier,
    InfixSelfReferential,
    InfixListOperatorInIdentifier,
    InfixPopulationMultipleDeclarations,
    InfixPortabilityMultipleDefinitions,
    InfixHoleListOperator,

    // Declaration/annotation faults (T200-T249)
    DuplicateDeclaration,
    ListIntrinsicExtendingList,

    // Inter-document reference faults (T300-T349)
    DuplicateReference,
    InsecureResourceReference,
    UnresolvedResource,
    CircularResourceReference,
}

impl FaultKind {
    /// Stable string code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::TabsAndSpaces => "T001",
            FaultKind::StatementBeginsWithComma => "T002",
            FaultKind::StatementBeginsWithEllipsis => "T003",
            FaultKind::StatementBeginsWithEscapedSpace => "T004",
            FaultKind::StatementContainsOnlyEscapeCharacter => "T005",
            FaultKind::PatternInvalid => "T100",
            FaultKind::PatternWithoutAnnotation => "T101",
            FaultKind::PatternCanMatchEmpty => "T102",
            FaultKind::PatternPartialWithCombinator => "T103",
            FaultKind::InfixDuplicateIdentifier => "T150",
            FaultKind::InfixSelfReferential => "T151",
            FaultKind::InfixListOperatorInIdentifier => "T152",
            FaultKind::InfixPopulationMultipleDeclarations => "T153",
            FaultKind::InfixPortabilityMultipleDefinitions => "T154",
            FaultKind::InfixHoleListOperator => "T155",
            FaultKind::DuplicateDeclaration => "T200",
            FaultKind::ListIntrinsicExtendingList => "T201",
            FaultKind::DuplicateReference => "T300",
            FaultKind::InsecureResourceReference => "T301",
            FaultKind::UnresolvedResource => "T302",
            FaultKind::CircularResourceReference => "T303",
        }
    }

    /// Default human-readable message template for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            FaultKind::TabsAndSpaces => "Statement indent mixes tabs and spaces",
            FaultKind::StatementBeginsWithComma => "Statement begins with a comma",
            FaultKind::StatementBeginsWithEllipsis => "Statement begins with an ellipsis",
            FaultKind::StatementBeginsWithEscapedSpace => "Statement begins with an escaped space",
            FaultKind::StatementContainsOnlyEscapeCharacter => {
                "Statement contains only an escape character"
            }
            FaultKind::PatternInvalid => "Pattern could not be parsed",
            FaultKind::PatternWithoutAnnotation => "Pattern has no annotation",
            FaultKind::PatternCanMatchEmpty => "Pattern can match the empty string",
            FaultKind::PatternPartialWithCombinator => {
                "Partial pattern literally matches the combinator"
            }
            FaultKind::InfixDuplicateIdentifier => "Duplicate identifier within one infix side",
            FaultKind::InfixSelfReferential => {
                "Infix type appears on both sides of the infix"
            }
            FaultKind::InfixListOperatorInIdentifier => {
                "Infix identifier uses the list operator"
            }
            FaultKind::InfixPopulationMultipleDeclarations => {
                "Population infix has multiple declarations"
            }
            FaultKind::InfixPortabilityMultipleDefinitions => {
                "Portability infix has multiple compatible definitions"
            }
            FaultKind::InfixHoleListOperator => "Infix hole uses the list operator",
            FaultKind::DuplicateDeclaration => "Duplicate declaration in this statement",
            FaultKind::ListIntrinsicExtendingList => {
                "A list-marked annotation cannot extend a list-marked declaration"
            }
            FaultKind::DuplicateReference => "Duplicate URI reference in this document",
            FaultKind::InsecureResourceReference => {
                "Insecure file:// reference from an http(s) document"
            }
            FaultKind::UnresolvedResource => "Referenced resource could not be resolved",
            FaultKind::CircularResourceReference => "Reference would create a dependency cycle",
        }
    }

    /// Default severity (`spec.md` §4.2, §4.7, §4.8).
    pub fn severity(&self) -> Severity {
        match self {
            FaultKind::TabsAndSpaces => Severity::Warning,
            FaultKind::PatternWithoutAnnotation => Severity::Warning,
            FaultKind::PatternCanMatchEmpty => Severity::Warning,

            FaultKind::StatementBeginsWithComma
            | FaultKind::StatementBeginsWithEllipsis
            | FaultKind::StatementBeginsWithEscapedSpace
            | FaultKind::StatementContainsOnlyEscapeCharacter
            | FaultKind::PatternInvalid
            | FaultKind::PatternPartialWithCombinator
            | FaultKind::InfixDuplicateIdentifier
            | FaultKind::InfixSelfReferential
            | FaultKind::InfixListOperatorInIdentifier
            | FaultKind::InfixPopulationMultipleDeclarations
            | FaultKind::InfixPortabilityMultipleDefinitions
            | FaultKind::InfixHoleListOperator
            | FaultKind::DuplicateDeclaration
            | FaultKind::ListIntrinsicExtendingList
            | FaultKind::DuplicateReference
            | FaultKind::InsecureResourceReference
            | FaultKind::UnresolvedResource
            | FaultKind::CircularResourceReference => Severity::Error,
        }
    }

    /// The `source` variant this kind is parameterized by (`spec.md` §3).
    pub fn source_kind(&self) -> FaultSourceKind {
        match self {
            FaultKind::TabsAndSpaces
            | FaultKind::StatementBeginsWithComma
            | FaultKind::StatementBeginsWithEllipsis
            | FaultKind::StatementBeginsWithEscapedSpace
            | FaultKind::StatementContainsOnlyEscapeCharacter
            | FaultKind::PatternInvalid
            | FaultKind::DuplicateReference
            | FaultKind::InsecureResourceReference
            | FaultKind::UnresolvedResource
            | FaultKind::CircularResourceReference => FaultSourceKind::Statement,

            FaultKind::PatternWithoutAnnotation
            | FaultKind::PatternCanMatchEmpty
            | FaultKind::PatternPartialWithCombinator
            | FaultKind::DuplicateDeclaration
            | FaultKind::ListIntrinsicExtendingList => FaultSourceKind::Span,

            FaultKind::InfixDuplicateIdentifier
            | FaultKind::InfixSelfReferential
            | FaultKind::InfixListOperatorInIdentifier
            | FaultKind::InfixPopulationMultipleDeclarations
            | FaultKind::InfixPortabilityMultipleDefinitions
            | FaultKind::InfixHoleListOperator => FaultSourceKind::InfixSpan,
        }
    }

    /// Whether this fault marks its source as cruft (excluded from semantic
    /// analysis). Equivalent to `severity() == Severity::Error`.
    pub fn is_cruft(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(FaultKind::TabsAndSpaces.as_str(), "T001");
        assert_eq!(FaultKind::DuplicateReference.as_str(), "T300");
    }

    #[test]
    fn tabs_and_spaces_is_warning_not_cruft() {
        assert_eq!(FaultKind::TabsAndSpaces.severity(), Severity::Warning);
        assert!(!FaultKind::TabsAndSpaces.is_cruft());
    }

    #[test]
    fn statement_begins_with_comma_is_error_and_cruft() {
        assert_eq!(FaultKind::StatementBeginsWithComma.severity(), Severity::Error);
        assert!(FaultKind::StatementBeginsWithComma.is_cruft());
    }

    #[test]
    fn source_kinds_match_spec_sources() {
        assert_eq!(FaultKind::TabsAndSpaces.source_kind(), FaultSourceKind::Statement);
        assert_eq!(FaultKind::DuplicateDeclaration.source_kind(), FaultSourceKind::Span);
        assert_eq!(FaultKind::InfixSelfReferential.source_kind(), FaultSourceKind::InfixSpan);
    }
}
