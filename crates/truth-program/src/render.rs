//! Canonical single-line fault rendering (`spec.md` §6 "Fault rendering":
//! `"<message> (<uri-store-form-or-empty> Line <1-based>, Col
//! <startCol>-<endCol>)"`. Cols omitted if range empty. URI omitted when
//! protocol ∈ {internal, none, unknown}").

use truth_ast::Fault;
use truth_document::Document;

/// Renders `fault`, attributed to the statement at `line_number` (1-based)
/// in `document`. Callers own the line-number lookup — usually the index a
/// `FaultRecord`'s statement currently occupies in `document.statements()`
/// plus one — since `Statement` itself carries no line field.
pub fn render_fault(document: &Document, line_number: usize, fault: &Fault) -> String {
    let uri = document.uri().filter(|u| !u.protocol().is_omitted_from_rendering()).map(|u| u.store_string()).unwrap_or_default();
    let (start, end) = fault.range;
    let location = if start == end {
        join_location(&uri, format!("Line {line_number}"))
    } else {
        join_location(&uri, format!("Line {line_number}, Col {start}-{end}"))
    };
    format!("{} ({location})", fault.message)
}

fn join_location(uri: &str, rest: String) -> String {
    if uri.is_empty() {
        rest
    } else {
        format!("{uri} {rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use truth_ast::{FaultOrigin, Interner};
    use truth_diagnostics_codes::{FaultKind, Severity};
    use truth_uri::{Protocol, Uri};

    fn fault(range: (usize, usize)) -> Fault {
        Fault {
            kind: FaultKind::StatementBeginsWithComma,
            severity: Severity::Error,
            message: "statement begins with a combinator".to_string(),
            origin: FaultOrigin::Statement,
            range,
        }
    }

    #[test]
    fn renders_with_a_web_uri_and_nonempty_range() {
        let mut interner = Interner::new();
        let document = Document::from_text("A : B", Some(Uri::new(Protocol::Https, "example.com/doc")), &mut interner, &truth_error::ParseBudget::default());
        let rendered = render_fault(&document, 3, &fault((1, 5)));
        assert_eq!(rendered, "statement begins with a combinator (https://example.com/doc Line 3, Col 1-5)");
    }

    #[test]
    fn omits_the_uri_for_internal_protocol() {
        let mut interner = Interner::new();
        let document = Document::from_text("A : B", Some(Uri::new(Protocol::Internal, "lib/core")), &mut interner, &truth_error::ParseBudget::default());
        let rendered = render_fault(&document, 1, &fault((1, 5)));
        assert_eq!(rendered, "statement begins with a combinator (Line 1, Col 1-5)");
    }

    #[test]
    fn omits_columns_for_an_empty_range() {
        let mut interner = Interner::new();
        let document = Document::from_text("A : B", None, &mut interner, &truth_error::ParseBudget::default());
        let rendered = render_fault(&document, 7, &fault((4, 4)));
        assert_eq!(rendered, "statement begins with a combinator (Line 7)");
    }
}
