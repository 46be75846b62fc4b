//! Spine computation: crossing a declaration span with its ancestor
//! statements' declarations to produce the phrase-trie paths it inflates
//! (`spec.md` §4.6: "a span's spines enumerate all paths formed by crossing
//! declarations of ancestor statements (one spine per Cartesian
//! combination)").
//!
//! This lives in the edit engine rather than `truth-phrase-graph` because it
//! needs a document's indentation-based ancestry, which that crate has no
//! access to.

use std::rc::Rc;

use truth_ast::{Span, Statement, Subject, TermId};
use truth_document::ancestry_of;
use truth_phrase_graph::SpineStep;

/// The annotation-side term ids of a statement, in order — the `clarifiers`
/// a phrase records when this statement produces it (`spec.md` §3 "Phrase").
pub fn clarifiers_of(statement: &Statement) -> Vec<TermId> {
    statement
        .all_annotations
        .iter()
        .filter_map(|span| match &span.subject {
            Subject::Term { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

/// Every spine produced by crossing `span` (one of `statement`'s own
/// declarations, at `statement_index` in `statements`) with the declarations
/// of each of its ancestors, one combination per ancestor declaration choice.
pub fn spines_for_span(statements: &[Rc<Statement>], statement_index: usize, statement: &Statement, span: &Span) -> Vec<Vec<SpineStep>> {
    let ancestry = ancestry_of(statements, statement_index);
    let mut combos: Vec<Vec<Subject>> = vec![Vec::new()];
    for ancestor in &ancestry {
        let subjects: Vec<Subject> = ancestor.all_declarations.iter().map(|s| s.subject.clone()).collect();
        if subjects.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(combos.len() * subjects.len());
        for combo in &combos {
            for subject in &subjects {
                let mut extended = combo.clone();
                extended.push(subject.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    let own_clarifiers = clarifiers_of(statement);
    combos
        .into_iter()
        .map(|combo| {
            let mut steps: Vec<SpineStep> = combo
                .into_iter()
                .zip(ancestry.iter())
                .map(|(subject, ancestor)| SpineStep::new(subject, clarifiers_of(ancestor)))
                .collect();
            steps.push(SpineStep::new(span.subject.clone(), own_clarifiers.clone()));
            steps
        })
        .collect()
}

/// Every spine for every one of `statement`'s own declarations.
pub fn spines_for_statement(statements: &[Rc<Statement>], statement_index: usize, statement: &Statement) -> Vec<(Span, Vec<Vec<SpineStep>>)> {
    statement
        .all_declarations
        .iter()
        .map(|span| (span.clone(), spines_for_span(statements, statement_index, statement, span)))
        .collect()
}
