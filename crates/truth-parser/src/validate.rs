//! Post-parse fault validations (`spec.md` §4.2, final paragraph).

use truth_ast::{CruftObject, Fault, Pattern, SpanDraft, Subject};
use truth_diagnostics_codes::FaultKind;
use truth_position_tracking::ByteSpan;
use truth_regex::{InfixBody, RegexUnit};

/// Flags every declaration after the first with the same `TermId` as an
/// earlier one (`spec.md` §4.2: "Duplicate declaration subjects (same
/// spelling) in one statement").
pub fn duplicate_declarations(declarations: &[SpanDraft]) -> Vec<(Fault, CruftObject)> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for decl in declarations {
        if let Subject::Term { id, .. } = &decl.subject {
            if !seen.insert(*id) {
                let fault = Fault::for_span(FaultKind::DuplicateDeclaration, decl.boundary);
                out.push((fault, CruftObject::Span(decl.boundary)));
            }
        }
    }
    out
}

/// `spec.md` §4.2: "If any declaration is a list-marked term and any
/// annotation is list-marked term → `ListIntrinsicExtendingList` on each
/// offending annotation span."
pub fn list_intrinsic_extending_list(
    declarations: &[SpanDraft],
    annotations: &[SpanDraft],
) -> Vec<(Fault, CruftObject)> {
    let any_list_declaration = declarations.iter().any(|d| d.subject.is_list_term());
    if !any_list_declaration {
        return Vec::new();
    }
    annotations
        .iter()
        .filter(|a| a.subject.is_list_term())
        .map(|a| {
            let fault = Fault::for_span(FaultKind::ListIntrinsicExtendingList, a.boundary);
            (fault, CruftObject::Span(a.boundary))
        })
        .collect()
}

/// Pattern-specific faults that depend on the full statement (the pattern's
/// declaration span plus its statement's annotation text), per `spec.md`
/// §4.2: `PatternWithoutAnnotation`, `PatternCanMatchEmpty`,
/// `PatternPartialWithCombinator`.
pub fn pattern_faults(pattern_span: ByteSpan, pattern: &Pattern, sum: &str) -> Vec<(Fault, CruftObject)> {
    let mut out = Vec::new();
    if sum.trim().is_empty() {
        out.push((
            Fault::for_span(FaultKind::PatternWithoutAnnotation, pattern_span),
            CruftObject::Span(pattern_span),
        ));
    }
    if truth_regex::can_match_empty(&pattern.units) {
        out.push((
            Fault::for_span(FaultKind::PatternCanMatchEmpty, pattern_span),
            CruftObject::Span(pattern_span),
        ));
    }
    if !pattern.total && truth_regex::matches_fully(&pattern.units, ",") {
        out.push((
            Fault::for_span(FaultKind::PatternPartialWithCombinator, pattern_span),
            CruftObject::Span(pattern_span),
        ));
    }
    out
}

/// Recursively collects every [`InfixBody`] appearing anywhere in a parsed
/// pattern's unit tree, including inside group alternatives.
fn collect_infixes(units: &[RegexUnit], out: &mut Vec<&InfixBody>) {
    for unit in units {
        match unit {
            RegexUnit::Infix(body) => out.push(body),
            RegexUnit::Group { alternatives, .. } => {
                for alt in alternatives {
                    collect_infixes(alt, out);
                }
            }
            _ => {}
        }
    }
}

/// Infix-specific faults (`spec.md` §4.2, §4.3): one infix body's
/// declarations/annotations are read with the same identifier grammar as a
/// statement's, then checked for the fault conditions the spec lists.
pub fn infix_faults(pattern: &Pattern) -> Vec<(Fault, CruftObject)> {
    let mut infixes = Vec::new();
    collect_infixes(&pattern.units, &mut infixes);

    let mut out = Vec::new();
    for infix in infixes {
        out.extend(check_one_infix(infix));
    }
    out
}

fn check_one_infix(infix: &InfixBody) -> Vec<(Fault, CruftObject)> {
    let mut out = Vec::new();
    let mut scanner = truth_scanner::Scanner::new(&infix.raw_body);
    let declarations = crate::identifier::read_identifier_list(&mut scanner, true);
    let annotations = if scanner.read(":") {
        crate::identifier::read_identifier_list(&mut scanner, false)
    } else {
        Vec::new()
    };

    let mut push = |kind: FaultKind| {
        out.push((Fault::for_infix_span(kind, infix.span), CruftObject::InfixSpan(infix.span)));
    };

    if has_duplicate_spelling(&declarations) || has_duplicate_spelling(&annotations) {
        push(FaultKind::InfixDuplicateIdentifier);
    }

    let decl_spellings: std::collections::HashSet<&str> =
        declarations.iter().map(|d| d.spelling.as_str()).collect();
    if annotations.iter().any(|a| decl_spellings.contains(a.spelling.as_str())) {
        push(FaultKind::InfixSelfReferential);
    }

    let any_list_identifier =
        declarations.iter().chain(annotations.iter()).any(|id| id.is_list);
    if any_list_identifier {
        if infix.pattern {
            push(FaultKind::InfixHoleListOperator);
        } else {
            push(FaultKind::InfixListOperatorInIdentifier);
        }
    }

    if !infix.portability && declarations.len() > 1 {
        push(FaultKind::InfixPopulationMultipleDeclarations);
    }
    if infix.portability && annotations.len() > 1 {
        push(FaultKind::InfixPortabilityMultipleDefinitions);
    }

    out
}

fn has_duplicate_spelling(ids: &[crate::identifier::IdentifierRead]) -> bool {
    let mut seen = std::collections::HashSet::new();
    ids.iter().any(|id| !seen.insert(id.spelling.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use truth_ast::TermId;
    use truth_position_tracking::ByteSpan;

    fn term_span(id: u32, boundary: ByteSpan, is_list: bool) -> SpanDraft {
        SpanDraft::new(boundary, Subject::term(TermId(id), is_list))
    }

    #[test]
    fn flags_second_occurrence_of_same_term_id() {
        let declarations = vec![
            term_span(1, ByteSpan::new(0, 1), false),
            term_span(1, ByteSpan::new(3, 4), false),
        ];
        let faults = duplicate_declarations(&declarations);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].0.kind, FaultKind::DuplicateDeclaration);
    }

    #[test]
    fn list_declaration_with_list_annotation_is_flagged() {
        let declarations = vec![term_span(1, ByteSpan::new(0, 1), true)];
        let annotations = vec![term_span(2, ByteSpan::new(4, 5), true)];
        let faults = list_intrinsic_extending_list(&declarations, &annotations);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].0.kind, FaultKind::ListIntrinsicExtendingList);
    }

    #[test]
    fn non_list_declaration_never_flags_list_annotations() {
        let declarations = vec![term_span(1, ByteSpan::new(0, 1), false)];
        let annotations = vec![term_span(2, ByteSpan::new(4, 5), true)];
        assert!(list_intrinsic_extending_list(&declarations, &annotations).is_empty());
    }

    #[test]
    fn self_referential_infix_is_flagged() {
        let infix = InfixBody {
            delimiter: truth_regex::InfixDelimiter::Normal,
            raw_body: "Foo : Foo".to_string(),
            nominal: false,
            pattern: false,
            portability: false,
            has_joint: true,
            span: ByteSpan::new(0, 11),
            body_span: ByteSpan::new(1, 10),
        };
        let faults = check_one_infix(&infix);
        assert!(faults.iter().any(|(f, _)| f.kind == FaultKind::InfixSelfReferential));
    }

    #[test]
    fn population_infix_with_multiple_declarations_is_flagged() {
        let infix = InfixBody {
            delimiter: truth_regex::InfixDelimiter::Normal,
            raw_body: "Foo, Bar".to_string(),
            nominal: false,
            pattern: false,
            portability: false,
            has_joint: false,
            span: ByteSpan::new(0, 10),
            body_span: ByteSpan::new(1, 9),
        };
        let faults = check_one_infix(&infix);
        assert!(faults.iter().any(|(f, _)| f.kind == FaultKind::InfixPopulationMultipleDeclarations));
    }
}
