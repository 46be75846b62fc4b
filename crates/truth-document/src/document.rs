//! `Document`: an ordered statement buffer plus its cross-document
//! bookkeeping (`spec.md` §3 "Document").

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use truth_ast::{Interner, Statement};
use truth_error::ContractError;
use truth_phrase_graph::Phrase;
use truth_uri::Uri;

/// One parsed Truth document: its statements in source order, the
/// indentation tree superimposed on them (`navigation.rs`), its phrase
/// trie's root, its edit-transaction guard and version stamp, and its
/// cross-document dependency/dependent links (`spec.md` §3).
pub struct Document {
    own_uri: RefCell<Option<Uri>>,
    pub(crate) statements: RefCell<Vec<Rc<Statement>>>,
    version: Cell<u64>,
    in_edit: Cell<bool>,
    pub root: Rc<Phrase>,
    dependencies: RefCell<Vec<Rc<Document>>>,
    dependents: RefCell<Vec<Weak<Document>>>,
}

impl Document {
    /// Parses `source_text` line by line into a fresh document (`spec.md`
    /// §6: "Line terminator: `\n`. A trailing line without a terminator is
    /// still a statement").
    pub fn from_text(
        source_text: &str,
        own_uri: Option<Uri>,
        interner: &mut Interner,
        budget: &truth_error::ParseBudget,
    ) -> Rc<Document> {
        let statements: Vec<Rc<Statement>> = if source_text.is_empty() {
            Vec::new()
        } else {
            source_text.split('\n').map(|line| truth_parser::parse_statement(line, interner, budget)).collect()
        };
        Rc::new(Document {
            own_uri: RefCell::new(own_uri),
            statements: RefCell::new(statements),
            version: Cell::new(0),
            in_edit: Cell::new(false),
            root: Phrase::root(),
            dependencies: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
        })
    }

    pub fn statement_count(&self) -> usize {
        self.statements.borrow().len()
    }

    pub fn statement(&self, index: usize) -> Option<Rc<Statement>> {
        self.statements.borrow().get(index).cloned()
    }

    pub fn statements(&self) -> Vec<Rc<Statement>> {
        self.statements.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Bumps the version stamp; called by the edit engine once per
    /// transaction that produced at least one mutation (`spec.md` §3, §4.5
    /// "Finalization").
    pub fn bump_version(&self) {
        self.version.set(self.version.get() + 1);
    }

    pub fn uri(&self) -> Option<Uri> {
        self.own_uri.borrow().clone()
    }

    /// Assigns this document's own identifying URI. Collision checking
    /// against other documents in the same program is the caller's
    /// responsibility (`truth-program`); this only stores the value.
    pub fn set_uri(&self, uri: Option<Uri>) {
        *self.own_uri.borrow_mut() = uri;
    }

    /// `spec.md` §3: "uri_statements: subsequence of statements whose
    /// declaration is a Uri (preserves document order)".
    pub fn uri_statements(&self) -> Vec<Rc<Statement>> {
        self.statements.borrow().iter().filter(|s| s.flags.has_uri).cloned().collect()
    }

    pub fn dependencies(&self) -> Vec<Rc<Document>> {
        self.dependencies.borrow().clone()
    }

    pub fn dependents(&self) -> Vec<Rc<Document>> {
        self.dependents.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    /// Replaces `dependencies` wholesale; used by the reference resolver
    /// after recomputing them from a document's current `uri_statements`
    /// (`spec.md` §4.7 step 7). Does not touch `dependents` on either side —
    /// callers are expected to have already applied the symmetric
    /// add/remove deltas (`spec.md` §4.7 step 6).
    pub fn set_dependencies(&self, dependencies: Vec<Rc<Document>>) {
        *self.dependencies.borrow_mut() = dependencies;
    }

    pub fn add_dependent(&self, dependent: &Rc<Document>) {
        self.dependents.borrow_mut().push(Rc::downgrade(dependent));
    }

    pub fn remove_dependent(&self, dependent: &Rc<Document>) {
        self.dependents.borrow_mut().retain(|d| !matches!(d.upgrade(), Some(existing) if Rc::ptr_eq(&existing, dependent)));
    }

    /// Acquires the reentrancy guard for an edit transaction (`spec.md` §4.5,
    /// §5, §7: "nested transaction attempt ... fail fast").
    pub fn begin_edit(&self) -> Result<(), ContractError> {
        if self.in_edit.get() {
            return Err(ContractError::DoubleTransaction);
        }
        self.in_edit.set(true);
        Ok(())
    }

    /// Releases the reentrancy guard. Idempotent: safe to call on every exit
    /// path, including after a panic unwound through the mutator.
    pub fn end_edit(&self) {
        self.in_edit.set(false);
    }

    pub fn in_edit(&self) -> bool {
        self.in_edit.get()
    }

    /// Replaces the statement buffer wholesale. Used by the edit engine
    /// after it has computed the new statement list for a transaction; not
    /// exposed as a general-purpose mutator (`spec.md` §4.5 owns all
    /// mutation policy).
    pub fn replace_statements(&self, statements: Vec<Rc<Statement>>) {
        *self.statements.borrow_mut() = statements;
    }

    /// `spec.md` §8 property 4: "`Document.toString(keep_original=true)`
    /// returns the concatenation of `source_text` for each statement joined
    /// by `\n` — identical to the originally loaded text." With
    /// `keep_original=false`, statements are re-rendered from their parsed
    /// declarations/joint/annotations instead of their original text.
    pub fn to_string_repr(&self, keep_original: bool) -> String {
        let statements = self.statements.borrow();
        if keep_original {
            return statements.iter().map(|s| s.source_text.as_str()).collect::<Vec<_>>().join("\n");
        }
        statements.iter().map(|s| render_canonical(s)).collect::<Vec<_>>().join("\n")
    }
}

fn render_canonical(statement: &Statement) -> String {
    let indent = "\t".repeat(statement.indent);
    if statement.flags.is_whitespace {
        return indent;
    }
    if statement.flags.is_comment {
        return format!("{indent}// {}", statement.sum);
    }
    let declarations = render_subjects(&statement.all_declarations);
    if statement.joint_position.is_none() {
        return format!("{indent}{declarations}");
    }
    let annotations = render_subjects(&statement.all_annotations);
    if annotations.is_empty() {
        format!("{indent}{declarations} :")
    } else {
        format!("{indent}{declarations} : {annotations}")
    }
}

fn render_subjects(spans: &[truth_ast::Span]) -> String {
    spans
        .iter()
        .filter(|s| !s.subject.is_void())
        .map(|s| format!("{:?}", s.subject))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Rc<Document> {
        let mut interner = Interner::new();
        Document::from_text(text, None, &mut interner, &truth_error::ParseBudget::default())
    }

    #[test]
    fn splits_source_text_into_one_statement_per_line() {
        let d = doc("A : B\nC : D, E");
        assert_eq!(d.statement_count(), 2);
    }

    #[test]
    fn to_string_with_keep_original_round_trips_the_source_text() {
        let text = "A : B\n\tC : D\n// a note\n";
        let d = doc(text);
        assert_eq!(d.to_string_repr(true), text.trim_end_matches('\n').to_string() + "\n");
    }

    #[test]
    fn uri_statements_preserves_document_order() {
        let d = doc("file//a\nA : B\nfile//b");
        let uris = d.uri_statements();
        assert_eq!(uris.len(), 2);
    }

    #[test]
    fn version_starts_at_zero_and_bumps() {
        let d = doc("A : B");
        assert_eq!(d.version(), 0);
        d.bump_version();
        assert_eq!(d.version(), 1);
    }

    #[test]
    fn begin_edit_twice_fails_with_double_transaction() {
        let d = doc("A : B");
        assert!(d.begin_edit().is_ok());
        assert_eq!(d.begin_edit(), Err(ContractError::DoubleTransaction));
        d.end_edit();
        assert!(d.begin_edit().is_ok());
    }

    #[test]
    fn dependents_reflects_only_still_alive_documents() {
        let a = doc("A : B");
        {
            let b = doc("C : D");
            a.add_dependent(&b);
            assert_eq!(a.dependents().len(), 1);
        }
        assert_eq!(a.dependents().len(), 0);
    }
}
