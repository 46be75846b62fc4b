//! Orchestrates one statement parse: scanner + pattern sub-parser +
//! post-parse validations, per the ten-step algorithm in `spec.md` §4.2.

use std::rc::Rc;

use truth_ast::{
    CruftObject, Fault, Interner, Pattern as AstPattern, SpanDraft, Statement, StatementFlags,
    Subject,
};
use truth_diagnostics_codes::FaultKind;
use truth_error::ParseBudget;
use truth_position_tracking::ByteSpan;
use truth_regex::PATTERN_DELIMITER;
use truth_scanner::Scanner;
use truth_uri::Uri;

use crate::identifier::{at_joint, read_identifier_list};
use crate::validate;

/// Parses one line of Truth source text into a [`Statement`]. Always
/// succeeds in producing a `Statement` — unparsability is modeled with
/// `is_cruft` and an attached fault, not a `Result` (`spec.md` §7).
pub fn parse_statement(source_text: &str, interner: &mut Interner, budget: &ParseBudget) -> Rc<Statement> {
    let mut scanner = Scanner::new(source_text);
    let mut faults: Vec<Fault> = Vec::new();
    let mut cruft_objects: Vec<CruftObject> = Vec::new();
    let mut flags = StatementFlags::default();

    // Step 1: leading whitespace → indent.
    let indent_span = scanner.read_whitespace();
    let indent = indent_span.len();
    let indent_text = &source_text[indent_span.to_range()];
    if indent_text.contains(' ') && indent_text.contains('\t') {
        faults.push(Fault::for_statement(FaultKind::TabsAndSpaces, indent, source_text.len()));
    }

    // Step 2: nothing left → whitespace-only statement.
    if !scanner.more() {
        flags.is_whitespace = true;
        return Statement::new(
            source_text.to_string(),
            indent,
            None,
            String::new(),
            flags,
            vec![],
            vec![],
            cruft_objects,
            faults,
        );
    }

    // Step 3: comment.
    if scanner.peek("//") {
        let after = &scanner.remaining()[2..];
        if after.is_empty() || after.starts_with(' ') || after.starts_with('\t') {
            flags.is_comment = true;
            return Statement::new(
                source_text.to_string(),
                indent,
                None,
                String::new(),
                flags,
                vec![],
                vec![],
                cruft_objects,
                faults,
            );
        }
    }

    // Step 4: unparsable-prefix probes. These flag cruft but do not stop
    // the parser from attempting the rest of the grammar on the same text.
    probe_unparsable_prefix(&scanner, indent, source_text, &mut flags, &mut faults, &mut cruft_objects);

    // Step 5: try a URI. Success short-circuits the rest of the grammar —
    // a URI statement has exactly one declaration and no annotations.
    if let Some((uri, consumed)) = Uri::parse_source(scanner.remaining()) {
        let start = scanner.position();
        scanner.advance_by(consumed);
        flags.has_uri = true;
        let declarations = vec![SpanDraft::new(ByteSpan::new(start, start + consumed), Subject::Uri(uri))];
        return Statement::new(
            source_text.to_string(),
            indent,
            None,
            String::new(),
            flags,
            declarations,
            vec![],
            cruft_objects,
            faults,
        );
    }

    // Step 6: try a pattern.
    if scanner.peek(PATTERN_DELIMITER) {
        return parse_pattern_statement(
            scanner,
            source_text,
            indent,
            flags,
            faults,
            cruft_objects,
            budget,
            interner,
        );
    }

    // Step 7: ordinary declarations.
    let declaration_reads = read_identifier_list(&mut scanner, true);
    let declarations: Vec<SpanDraft> = declaration_reads
        .into_iter()
        .map(|id| {
            let term_id = interner.intern(&id.spelling);
            SpanDraft::new(id.span, Subject::term(term_id, id.is_list))
        })
        .collect();

    finish_statement(scanner, source_text, indent, declarations, None, flags, faults, cruft_objects, interner)
}

fn probe_unparsable_prefix(
    scanner: &Scanner<'_>,
    indent: usize,
    source_text: &str,
    flags: &mut StatementFlags,
    faults: &mut Vec<Fault>,
    cruft_objects: &mut Vec<CruftObject>,
) {
    let mut flag = |kind: FaultKind| {
        flags.is_cruft = true;
        faults.push(Fault::for_statement(kind, indent, source_text.len()));
        cruft_objects.push(CruftObject::Statement);
    };
    if scanner.peek(",") {
        flag(FaultKind::StatementBeginsWithComma);
    } else if scanner.peek("...") {
        flag(FaultKind::StatementBeginsWithEllipsis);
    } else if scanner.peek("\\") {
        let after = &scanner.remaining()[1..];
        if after.starts_with(' ') || after.starts_with('\t') {
            flag(FaultKind::StatementBeginsWithEscapedSpace);
        } else if after.is_empty() {
            flag(FaultKind::StatementContainsOnlyEscapeCharacter);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn parse_pattern_statement(
    mut scanner: Scanner<'_>,
    source_text: &str,
    indent: usize,
    mut flags: StatementFlags,
    mut faults: Vec<Fault>,
    mut cruft_objects: Vec<CruftObject>,
    budget: &ParseBudget,
    interner: &mut Interner,
) -> Rc<Statement> {
    let open_offset = scanner.position();
    scanner.advance_by(PATTERN_DELIMITER.len());
    let body = scanner.remaining();

    match truth_regex::parse_pattern(body, budget) {
        Ok(parsed) => {
            scanner.advance_by(parsed.bytes_consumed);
            flags.has_pattern = true;
            if parsed.total {
                flags.has_total_pattern = true;
            } else {
                flags.has_partial_pattern = true;
            }
            let pattern_span = ByteSpan::new(open_offset, scanner.position());
            let pattern = AstPattern { units: parsed.units, total: parsed.total, crc: 0 };
            let declarations = vec![SpanDraft::new(pattern_span, Subject::Pattern(pattern))];
            finish_statement(
                scanner,
                source_text,
                indent,
                declarations,
                Some(pattern_span),
                flags,
                faults,
                cruft_objects,
                interner,
            )
        }
        Err(_) => {
            flags.has_pattern = true;
            flags.is_cruft = true;
            faults.push(Fault::for_statement(FaultKind::PatternInvalid, indent, source_text.len()));
            cruft_objects.push(CruftObject::Statement);
            Statement::new(
                source_text.to_string(),
                indent,
                None,
                String::new(),
                flags,
                vec![],
                vec![],
                cruft_objects,
                faults,
            )
        }
    }
}

/// Steps 8–10 plus post-parse validations, shared by the plain-declaration
/// and pattern-declaration paths.
#[allow(clippy::too_many_arguments)]
fn finish_statement(
    mut scanner: Scanner<'_>,
    source_text: &str,
    indent: usize,
    mut declarations: Vec<SpanDraft>,
    pattern_span: Option<ByteSpan>,
    mut flags: StatementFlags,
    mut faults: Vec<Fault>,
    mut cruft_objects: Vec<CruftObject>,
    interner: &mut Interner,
) -> Rc<Statement> {
    // Step 8: the joint. A pattern declaration may leave whitespace
    // between its closing delimiter and the joint that ordinary
    // declaration reading would otherwise have absorbed itself.
    scanner.read_whitespace();
    let joint_position = if at_joint(&scanner) {
        let pos = scanner.position();
        scanner.read(":");
        Some(pos)
    } else {
        None
    };

    // Step 9: annotations, only once a joint was found.
    let mut annotations: Vec<SpanDraft> = Vec::new();
    if joint_position.is_some() {
        let annotation_reads = read_identifier_list(&mut scanner, false);
        annotations = annotation_reads
            .into_iter()
            .map(|id| {
                let term_id = interner.intern(&id.spelling);
                SpanDraft::new(id.span, Subject::term(term_id, id.is_list))
            })
            .collect();
    }
    let sum = match joint_position {
        Some(pos) => source_text[pos + 1..].trim().to_string(),
        None => String::new(),
    };

    // Step 10: vacuous / refresh.
    if let Some(pos) = joint_position {
        if declarations.is_empty() && annotations.is_empty() {
            flags.is_vacuous = true;
            declarations.push(SpanDraft::new(ByteSpan::empty(pos), Subject::Void));
        } else if !declarations.is_empty() && annotations.is_empty() {
            flags.is_refresh = true;
        }
    }

    push_results(&mut faults, &mut cruft_objects, validate::duplicate_declarations(&declarations));
    push_results(
        &mut faults,
        &mut cruft_objects,
        validate::list_intrinsic_extending_list(&declarations, &annotations),
    );

    if let (Some(span), Some(SpanDraft { subject: Subject::Pattern(pattern), .. })) =
        (pattern_span, declarations.first())
    {
        push_results(&mut faults, &mut cruft_objects, validate::pattern_faults(span, pattern, &sum));
        push_results(&mut faults, &mut cruft_objects, validate::infix_faults(pattern));
    }

    // The pattern's CRC depends on the statement's own annotation texts,
    // computed only now that annotations are known (`spec.md` §4.3).
    if let Some(SpanDraft { subject: Subject::Pattern(pattern), .. }) = declarations.first_mut() {
        let annotation_texts: Vec<&str> = annotations
            .iter()
            .filter_map(|a| match &a.subject {
                Subject::Term { id, .. } => Some(interner.spelling(*id)),
                _ => None,
            })
            .collect();
        pattern.crc = truth_regex::compute_pattern_crc(&annotation_texts);
    }

    Statement::new(
        source_text.to_string(),
        indent,
        joint_position,
        sum,
        flags,
        declarations,
        annotations,
        cruft_objects,
        faults,
    )
}

fn push_results(faults: &mut Vec<Fault>, cruft_objects: &mut Vec<CruftObject>, results: Vec<(Fault, CruftObject)>) {
    for (fault, obj) in results {
        let is_cruft = fault.is_cruft();
        faults.push(fault);
        if is_cruft {
            cruft_objects.push(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Rc<Statement> {
        let mut interner = Interner::new();
        parse_statement(text, &mut interner, &ParseBudget::default())
    }

    #[test]
    fn s1_parses_two_ordinary_statements() {
        let first = parse("A : B");
        assert_eq!(first.all_declarations.len(), 1);
        assert_eq!(first.all_annotations.len(), 1);
        assert_eq!(first.joint_position, Some(2));

        let second = parse("C : D, E");
        assert_eq!(second.all_declarations.len(), 1);
        assert_eq!(second.all_annotations.len(), 2);
        assert_eq!(second.joint_position, Some(2));
    }

    #[test]
    fn s2_tabs_and_spaces_warns_without_cruft() {
        let statement = parse("\t A");
        assert_eq!(statement.indent, 2);
        assert_eq!(statement.faults.len(), 1);
        assert_eq!(statement.faults[0].kind, FaultKind::TabsAndSpaces);
        assert!(!statement.flags.is_cruft);
    }

    #[test]
    fn s6_total_pattern_rejects_empty_and_has_no_cruft_fault() {
        let statement = parse("/\\d+/ : Number");
        assert!(statement.flags.has_pattern);
        assert!(statement.flags.has_total_pattern);
        let decl = statement.sole_declaration().expect("sole declaration");
        let Subject::Pattern(pattern) = &decl.subject else { panic!("expected pattern") };
        assert!(!truth_regex::can_match_empty(&pattern.units));
        assert!(truth_regex::matches_fully(&pattern.units, "12"));
        assert!(!statement.faults.iter().any(|f| f.kind == FaultKind::PatternCanMatchEmpty));
    }

    #[test]
    fn whitespace_only_line_has_no_declarations() {
        let statement = parse("   ");
        assert!(statement.flags.is_whitespace);
        assert!(statement.is_noop());
    }

    #[test]
    fn comment_line_is_noop() {
        let statement = parse("// a note");
        assert!(statement.flags.is_comment);
        assert!(statement.is_noop());
    }

    #[test]
    fn vacuous_statement_has_a_void_declaration() {
        let statement = parse(":");
        assert!(statement.flags.is_vacuous);
        assert_eq!(statement.all_declarations.len(), 1);
        assert!(statement.all_declarations[0].subject.is_void());
    }

    #[test]
    fn refresh_statement_has_declarations_and_a_joint_but_no_annotations() {
        let statement = parse("A :");
        assert!(statement.flags.is_refresh);
        assert_eq!(statement.all_annotations.len(), 0);
    }

    #[test]
    fn uri_statement_has_no_annotations_and_a_single_declaration() {
        let statement = parse("file//a/b.truth");
        assert!(statement.flags.has_uri);
        assert_eq!(statement.all_declarations.len(), 1);
        assert_eq!(statement.all_annotations.len(), 0);
        assert_eq!(statement.joint_position, None);
    }

    #[test]
    fn duplicate_declarations_are_flagged() {
        let statement = parse("A, A : B");
        assert!(statement.faults.iter().any(|f| f.kind == FaultKind::DuplicateDeclaration));
    }

    #[test]
    fn statement_beginning_with_comma_is_cruft() {
        let statement = parse(", A : B");
        assert!(statement.flags.is_cruft);
        assert!(statement.faults.iter().any(|f| f.kind == FaultKind::StatementBeginsWithComma));
    }

    #[test]
    fn list_marked_declaration_extended_by_list_marked_annotation_is_flagged() {
        let statement = parse("Items... : Other...");
        assert!(statement.faults.iter().any(|f| f.kind == FaultKind::ListIntrinsicExtendingList));
    }
}
