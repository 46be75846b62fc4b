//! `edit_atomic`: converts editor-style range edits into the `insert` /
//! `delete` / `update` calls the transaction engine understands (`spec.md`
//! §4.5: "converts editor-style `{range, text}` operations ... detecting
//! the common pure-update, pure-delete-of-line-range, and
//! pure-insert-at-line-boundary cases; the fallback is
//! delete-all-affected-lines-then-insert-new").
//!
//! Columns are UTF-16 code units, matching the convention editors speak
//! (`truth-position-tracking`).

use std::rc::Rc;

use truth_ast::Interner;
use truth_document::Document;
use truth_error::ContractError;
use truth_position_tracking::utf16_column_to_byte_offset;

use crate::engine::edit;
use crate::events::EditOutcome;
use crate::mutator::MutatorCall;

/// One editor-style replacement: the half-open `[start, end)` range (0-based
/// line, UTF-16 column) is replaced by `text`.
#[derive(Debug, Clone)]
pub struct RangeEdit {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub text: String,
}

/// Applies a batch of [`RangeEdit`]s as one transaction. Edits are planned
/// against a local copy of the document's current lines, in order, so each
/// edit's line numbers are resolved against the state left by the edits
/// before it — the same convention editors use when they batch multiple
/// content changes into one notification.
pub fn edit_atomic(
    document: &Rc<Document>,
    interner: &mut Interner,
    budget: &truth_error::ParseBudget,
    range_edits: &[RangeEdit],
) -> Result<EditOutcome, ContractError> {
    let mut lines: Vec<String> = document.statements().iter().map(|s| s.source_text.clone()).collect();
    let mut calls: Vec<MutatorCall> = Vec::new();
    for range in range_edits {
        plan_one(&mut lines, range, &mut calls);
    }

    edit(document, interner, budget, |mutator| {
        for call in &calls {
            match call {
                MutatorCall::Update { text, at } => mutator.update(text.clone(), *at),
                MutatorCall::Delete { at, count } => mutator.delete(*at, *count),
                MutatorCall::Insert { text, at } => mutator.insert(text.clone(), *at),
            }
        }
    })
}

fn plan_one(lines: &mut Vec<String>, range: &RangeEdit, calls: &mut Vec<MutatorCall>) {
    let line_count = lines.len();
    let start_line = range.start_line.min(line_count);
    let end_line = range.end_line.min(line_count);

    // Pure insert at a line boundary: nothing deleted, whole new lines only.
    if start_line == end_line && range.start_col == 0 && range.end_col == 0 {
        calls.push(MutatorCall::Insert { text: range.text.clone(), at: start_line });
        let inserted: Vec<String> = range.text.split('\n').map(String::from).collect();
        splice_insert(lines, start_line, inserted);
        return;
    }

    // Pure update: confined to one existing line, replacement has no newline.
    if start_line == end_line && start_line < line_count && !range.text.contains('\n') {
        let new_line = splice_line(&lines[start_line], range.start_col, range.end_col, &range.text);
        calls.push(MutatorCall::Update { text: new_line.clone(), at: start_line });
        lines[start_line] = new_line;
        return;
    }

    // Pure delete of a whole line range: nothing inserted, boundaries at col 0.
    if range.text.is_empty() && range.start_col == 0 && range.end_col == 0 && end_line > start_line {
        let count = end_line - start_line;
        calls.push(MutatorCall::Delete { at: start_line, count });
        lines.drain(start_line..end_line);
        return;
    }

    // Fallback: delete every affected line, then insert the recombined text.
    let has_end_line = end_line < line_count;
    let last_line = if has_end_line { end_line } else { line_count.saturating_sub(1) };

    let prefix = if start_line < line_count {
        let line = &lines[start_line];
        line[..col_byte(line, range.start_col)].to_string()
    } else {
        String::new()
    };
    let suffix = if has_end_line {
        let line = &lines[last_line];
        line[col_byte(line, range.end_col)..].to_string()
    } else {
        String::new()
    };
    let combined = format!("{prefix}{}{suffix}", range.text);
    let replacement: Vec<String> = combined.split('\n').map(String::from).collect();

    if start_line < line_count {
        let delete_count = if has_end_line { last_line - start_line + 1 } else { line_count - start_line };
        calls.push(MutatorCall::Delete { at: start_line, count: delete_count });
        lines.drain(start_line..(start_line + delete_count));
    }
    calls.push(MutatorCall::Insert { text: replacement.join("\n"), at: start_line });
    splice_insert(lines, start_line, replacement);
}

fn col_byte(line: &str, col: usize) -> usize {
    utf16_column_to_byte_offset(line, col as u32).min(line.len())
}

fn splice_line(line: &str, start_col: usize, end_col: usize, insert: &str) -> String {
    let start_byte = col_byte(line, start_col);
    let end_byte = col_byte(line, end_col).max(start_byte);
    format!("{}{}{}", &line[..start_byte], insert, &line[end_byte..])
}

fn splice_insert(lines: &mut Vec<String>, at: usize, inserted: Vec<String>) {
    let at = at.min(lines.len());
    for (offset, line) in inserted.into_iter().enumerate() {
        lines.insert(at + offset, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use truth_error::ParseBudget;

    fn doc(text: &str) -> Rc<Document> {
        let mut interner = Interner::new();
        Document::from_text(text, None, &mut interner, &ParseBudget::default())
    }

    #[test]
    fn a_single_line_column_replacement_is_a_pure_update() {
        let d = doc("A : B");
        let mut interner = Interner::new();
        let budget = ParseBudget::default();
        let range = RangeEdit { start_line: 0, start_col: 4, end_line: 0, end_col: 5, text: "C".to_string() };
        let outcome = edit_atomic(&d, &mut interner, &budget, std::slice::from_ref(&range)).expect("edit_atomic");
        assert_eq!(d.statement_count(), 1);
        assert_eq!(d.statement(0).unwrap().source_text, "A : C");
        assert!(outcome.mutated);
    }

    #[test]
    fn a_whole_line_range_delete_removes_exactly_those_lines() {
        let d = doc("A\nB\nC");
        let mut interner = Interner::new();
        let budget = ParseBudget::default();
        let range = RangeEdit { start_line: 1, start_col: 0, end_line: 2, end_col: 0, text: String::new() };
        edit_atomic(&d, &mut interner, &budget, std::slice::from_ref(&range)).expect("edit_atomic");
        assert_eq!(d.statement_count(), 2);
        assert_eq!(d.statement(0).unwrap().source_text, "A");
        assert_eq!(d.statement(1).unwrap().source_text, "C");
    }

    #[test]
    fn an_insert_at_a_line_boundary_does_not_touch_existing_lines() {
        let d = doc("A\nB");
        let mut interner = Interner::new();
        let budget = ParseBudget::default();
        let range = RangeEdit { start_line: 1, start_col: 0, end_line: 1, end_col: 0, text: "X\n".to_string() };
        edit_atomic(&d, &mut interner, &budget, std::slice::from_ref(&range)).expect("edit_atomic");
        assert_eq!(d.statement_count(), 3);
        assert_eq!(d.statement(1).unwrap().source_text, "X");
        assert_eq!(d.statement(2).unwrap().source_text, "B");
    }

    #[test]
    fn a_cross_line_replacement_falls_back_to_delete_then_insert() {
        let d = doc("A : B\nC : D");
        let mut interner = Interner::new();
        let budget = ParseBudget::default();
        let range = RangeEdit { start_line: 0, start_col: 4, end_line: 1, end_col: 1, text: "X\nY".to_string() };
        edit_atomic(&d, &mut interner, &budget, std::slice::from_ref(&range)).expect("edit_atomic");
        assert_eq!(d.statement_count(), 2);
        assert_eq!(d.statement(0).unwrap().source_text, "A : X");
        assert_eq!(d.statement(1).unwrap().source_text, "Y : D");
    }

    #[test]
    fn two_batched_edits_resolve_against_each_others_effect_in_order() {
        let d = doc("A\nB\nC");
        let mut interner = Interner::new();
        let budget = ParseBudget::default();
        let ranges = vec![
            RangeEdit { start_line: 0, start_col: 0, end_line: 1, end_col: 0, text: String::new() },
            RangeEdit { start_line: 0, start_col: 1, end_line: 0, end_col: 1, text: "!".to_string() },
        ];
        edit_atomic(&d, &mut interner, &budget, &ranges).expect("edit_atomic");
        assert_eq!(d.statement_count(), 2);
        assert_eq!(d.statement(0).unwrap().source_text, "B!");
        assert_eq!(d.statement(1).unwrap().source_text, "C");
    }
}
