//! Fault value objects (`spec.md` §4.8): a closed fault kind, its severity,
//! and a 1-based `[start, end]` range computed from the object that raised
//! it.

use truth_diagnostics_codes::{FaultKind, Severity};
use truth_position_tracking::ByteSpan;

/// The kind of object a fault's range was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOrigin {
    Statement,
    Span,
    InfixSpan,
}

/// A single reported fault. Faults are value objects — two faults with the
/// same fields are interchangeable regardless of how they were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: FaultKind,
    pub severity: Severity,
    pub message: String,
    pub origin: FaultOrigin,
    /// 1-based `[start, end]`, inclusive-exclusive as computed per source
    /// kind (`spec.md` §4.8).
    pub range: (usize, usize),
}

impl Fault {
    /// `spec.md` §4.8: `[indent+1, source_text.len+1]`, except
    /// `TabsAndSpaces` which uses `[1, indent+1]`.
    pub fn for_statement(kind: FaultKind, indent: usize, source_text_len: usize) -> Fault {
        let range = if kind == FaultKind::TabsAndSpaces {
            (1, indent + 1)
        } else {
            (indent + 1, source_text_len + 1)
        };
        Fault { severity: kind.severity(), message: kind.message().to_string(), kind, origin: FaultOrigin::Statement, range }
    }

    pub fn for_span(kind: FaultKind, boundary: ByteSpan) -> Fault {
        Fault {
            severity: kind.severity(),
            message: kind.message().to_string(),
            kind,
            origin: FaultOrigin::Span,
            range: boundary.to_fault_range(),
        }
    }

    pub fn for_infix_span(kind: FaultKind, boundary: ByteSpan) -> Fault {
        Fault {
            severity: kind.severity(),
            message: kind.message().to_string(),
            kind,
            origin: FaultOrigin::InfixSpan,
            range: boundary.to_fault_range(),
        }
    }

    /// Severity `error` excludes the source from downstream type analysis
    /// (`spec.md` §4.8, §7).
    pub fn is_cruft(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_and_spaces_range_spans_the_indent_from_column_one() {
        let fault = Fault::for_statement(FaultKind::TabsAndSpaces, 3, 10);
        assert_eq!(fault.range, (1, 4));
    }

    #[test]
    fn other_statement_faults_range_from_indent_to_text_length() {
        let fault = Fault::for_statement(FaultKind::StatementBeginsWithComma, 2, 10);
        assert_eq!(fault.range, (3, 11));
    }

    #[test]
    fn span_faults_use_one_based_boundary() {
        let fault = Fault::for_span(FaultKind::DuplicateDeclaration, ByteSpan::new(4, 9));
        assert_eq!(fault.range, (5, 10));
    }

    #[test]
    fn error_severity_is_cruft_warning_is_not() {
        let error_fault = Fault::for_statement(FaultKind::StatementBeginsWithComma, 0, 5);
        let warning_fault = Fault::for_statement(FaultKind::TabsAndSpaces, 0, 5);
        assert!(error_fault.is_cruft());
        assert!(!warning_fault.is_cruft());
    }
}
