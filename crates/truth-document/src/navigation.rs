//! Indentation-based tree superimposed on the flat statement list
//! (`spec.md` §4.4).
//!
//! No-op statements (comments and whitespace) are skipped by every scan
//! here; they retain their positional slot in the buffer.

use std::rc::Rc;

use truth_ast::Statement;

use crate::document::Document;

/// A comment line collected by [`Document::get_notes`].
#[derive(Debug, Clone)]
pub struct Note {
    pub index: usize,
    pub statement: Rc<Statement>,
}

/// Ancestor chain of the statement at `index` within `statements`, root-most
/// first, exclusive of the statement itself (`spec.md` §4.4). Exposed as a
/// free function (not just a `Document` method) so the edit engine can run
/// it over a not-yet-committed statement buffer.
pub fn ancestry_of(statements: &[Rc<Statement>], index: usize) -> Vec<Rc<Statement>> {
    let Some(target) = statements.get(index) else { return Vec::new() };
    let mut chain = Vec::new();
    let mut floor = target.indent;
    let mut i = index;
    while i > 0 && floor > 0 {
        i -= 1;
        let candidate = &statements[i];
        if candidate.is_noop() {
            continue;
        }
        if candidate.indent < floor {
            chain.push(Rc::clone(candidate));
            floor = candidate.indent;
        }
    }
    chain.reverse();
    chain
}

/// First strictly-smaller-indent non-noop predecessor of the statement at
/// `index`, or `None` if it is a top-level statement. Exposed as a free
/// function (alongside [`ancestry_of`]) so the edit engine can run it over a
/// not-yet-committed statement buffer (`spec.md` §4.4, §4.5).
pub fn parent_of(statements: &[Rc<Statement>], index: usize) -> Option<Rc<Statement>> {
    let target = statements.get(index)?;
    scan_parent(statements, index, target.indent)
}

/// Same scan as [`parent_of`], but for an imaginary statement at
/// `(virtual_line, virtual_indent)` that has not been inserted yet
/// (`spec.md` §4.4 `get_parent_from_position`).
pub fn parent_from_position(statements: &[Rc<Statement>], virtual_line: usize, virtual_indent: usize) -> Option<Rc<Statement>> {
    scan_parent(statements, virtual_line, virtual_indent)
}

/// Whether the statement at `index` has any descendant at all (`spec.md`
/// §4.4 `has_descendants`), as a free function over an arbitrary buffer.
pub fn has_descendants_of(statements: &[Rc<Statement>], index: usize) -> bool {
    let Some(target) = statements.get(index) else { return false };
    for candidate in statements.iter().skip(index + 1) {
        if candidate.is_noop() {
            continue;
        }
        return candidate.indent > target.indent;
    }
    false
}

impl Document {
    /// Ancestor chain of the statement at `index`, root-most first,
    /// exclusive of the statement itself (`spec.md` §4.4).
    pub fn get_ancestry(&self, index: usize) -> Vec<Rc<Statement>> {
        ancestry_of(&self.statements.borrow(), index)
    }

    /// First strictly-smaller-indent non-noop predecessor of the statement
    /// at `index`, or `None` if it is a top-level statement (parent is the
    /// document itself).
    pub fn get_parent(&self, index: usize) -> Option<Rc<Statement>> {
        parent_of(&self.statements.borrow(), index)
    }

    /// Same scan as [`Document::get_parent`], but for an imaginary statement
    /// at `(virtual_line, virtual_indent)` that has not been inserted yet.
    pub fn get_parent_from_position(&self, virtual_line: usize, virtual_indent: usize) -> Option<Rc<Statement>> {
        parent_from_position(&self.statements.borrow(), virtual_line, virtual_indent)
    }

    /// Other statements sharing the immediate parent of the statement at
    /// `index` (the statement itself is excluded).
    pub fn get_siblings(&self, index: usize) -> Vec<Rc<Statement>> {
        let statements = self.statements.borrow();
        let Some(target) = statements.get(index) else { return Vec::new() };
        let indent = target.indent;
        let lower_bound = enclosing_parent_index(&statements, index, indent);
        let mut siblings = Vec::new();
        for (i, candidate) in statements.iter().enumerate() {
            if i == index || candidate.is_noop() {
                continue;
            }
            if let Some(bound) = lower_bound {
                if i <= bound {
                    continue;
                }
            }
            if candidate.indent < indent {
                break;
            }
            if candidate.indent == indent {
                siblings.push(Rc::clone(candidate));
            }
        }
        siblings
    }

    /// Direct children of the statement at `index`. The "child indent" is
    /// the lowest indent seen among immediate children, tolerating
    /// irregular deeper indentation among siblings (`spec.md` §4.4).
    pub fn get_children(&self, index: usize) -> Vec<Rc<Statement>> {
        let statements = self.statements.borrow();
        let Some(target) = statements.get(index) else { return Vec::new() };
        let parent_indent = target.indent;
        let mut child_indent: Option<usize> = None;
        let mut candidates = Vec::new();
        for candidate in statements.iter().skip(index + 1) {
            if candidate.is_noop() {
                continue;
            }
            if candidate.indent <= parent_indent {
                break;
            }
            child_indent = Some(match child_indent {
                Some(current) => current.min(candidate.indent),
                None => candidate.indent,
            });
            candidates.push(Rc::clone(candidate));
        }
        let Some(child_indent) = child_indent else { return Vec::new() };
        candidates.into_iter().filter(|c| c.indent == child_indent).collect()
    }

    pub fn has_descendants(&self, index: usize) -> bool {
        has_descendants_of(&self.statements.borrow(), index)
    }

    /// Every descendant of the statement at `index`, in document order,
    /// optionally including the statement itself first.
    pub fn each_descendant(&self, index: usize, include_initial: bool) -> Vec<Rc<Statement>> {
        let statements = self.statements.borrow();
        let Some(target) = statements.get(index) else { return Vec::new() };
        let mut result = Vec::new();
        if include_initial {
            result.push(Rc::clone(target));
        }
        for candidate in statements.iter().skip(index + 1) {
            if candidate.is_noop() {
                continue;
            }
            if candidate.indent <= target.indent {
                break;
            }
            result.push(Rc::clone(candidate));
        }
        result
    }

    /// Comment lines immediately preceding the statement at `index`, sharing
    /// its indent, reading backwards until a non-comment non-whitespace
    /// statement terminates the run (`spec.md` §4.4).
    pub fn get_notes(&self, index: usize) -> Vec<Note> {
        let statements = self.statements.borrow();
        let Some(target) = statements.get(index) else { return Vec::new() };
        let mut notes = Vec::new();
        let mut i = index;
        while i > 0 {
            i -= 1;
            let candidate = &statements[i];
            if candidate.flags.is_whitespace {
                continue;
            }
            if candidate.flags.is_comment && candidate.indent == target.indent {
                notes.push(Note { index: i, statement: Rc::clone(candidate) });
                continue;
            }
            break;
        }
        notes.reverse();
        notes
    }
}

fn scan_parent(statements: &[Rc<Statement>], index: usize, indent: usize) -> Option<Rc<Statement>> {
    if indent == 0 {
        return None;
    }
    let mut i = index.min(statements.len());
    while i > 0 {
        i -= 1;
        let candidate = &statements[i];
        if candidate.is_noop() {
            continue;
        }
        if candidate.indent < indent {
            return Some(Rc::clone(candidate));
        }
    }
    None
}

/// Index of the nearest enclosing parent statement (per [`scan_parent`]), used
/// by [`Document::get_siblings`] to avoid crossing into a different subtree
/// when two separate sibling groups happen to share an indent level.
fn enclosing_parent_index(statements: &[Rc<Statement>], index: usize, indent: usize) -> Option<usize> {
    if indent == 0 {
        return None;
    }
    let mut i = index;
    while i > 0 {
        i -= 1;
        let candidate = &statements[i];
        if candidate.is_noop() {
            continue;
        }
        if candidate.indent < indent {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use truth_ast::Interner;

    fn doc(text: &str) -> Rc<Document> {
        let mut interner = Interner::new();
        Document::from_text(text, None, &mut interner, &truth_error::ParseBudget::default())
    }

    fn spellings(statements: &[Rc<Statement>]) -> Vec<usize> {
        statements.iter().map(|s| s.indent).collect()
    }

    #[test]
    fn get_ancestry_is_root_most_first_and_indent_monotonic() {
        let d = doc("A\n\tB\n\t\tC\n\t\tD");
        let ancestry = d.get_ancestry(3);
        assert_eq!(spellings(&ancestry), vec![0, 1]);
    }

    #[test]
    fn get_parent_returns_none_at_top_level() {
        let d = doc("A\n\tB");
        assert!(d.get_parent(0).is_none());
        assert!(d.get_parent(1).is_some());
    }

    #[test]
    fn get_children_tolerates_irregular_deeper_indentation() {
        let d = doc("A\n\tB\n\t\t\tC\n\tD");
        let children = d.get_children(0);
        assert_eq!(children.len(), 2);
        assert_eq!(spellings(&children), vec![1, 1]);
    }

    #[test]
    fn get_siblings_excludes_self_and_deeper_statements() {
        let d = doc("A\n\tB\n\tC\n\t\tD");
        let siblings = d.get_siblings(1);
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn has_descendants_is_false_for_a_leaf() {
        let d = doc("A\n\tB");
        assert!(d.has_descendants(0));
        assert!(!d.has_descendants(1));
    }

    #[test]
    fn each_descendant_stops_at_the_first_shallower_statement() {
        let d = doc("A\n\tB\n\t\tC\nD");
        let descendants = d.each_descendant(0, false);
        assert_eq!(descendants.len(), 2);
    }

    #[test]
    fn noop_statements_are_skipped_by_ancestry_and_children() {
        let d = doc("A\n\n\tB");
        let children = d.get_children(0);
        assert_eq!(children.len(), 1);
        assert_eq!(d.get_parent(2).unwrap().indent, 0);
    }

    #[test]
    fn get_notes_collects_same_indent_comments_until_non_comment() {
        let d = doc("A\n// first\n// second\nB");
        let notes = d.get_notes(3);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].index, 1);
        assert_eq!(notes[1].index, 2);
    }

    #[test]
    fn get_notes_stops_at_a_non_comment_non_whitespace_statement() {
        let d = doc("A\n// note\nB\nC");
        let notes = d.get_notes(3);
        assert!(notes.is_empty());
    }
}
