//! `Program`: the host facade over a set of live documents (`spec.md` §6
//! "Program-level API": "open document from text or URI, delete document,
//! register cause listener, query root types, force verification drain").

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use truth_ast::{Interner, Statement};
use truth_document::Document;
use truth_edit::{InvalidationSet, Mutator, RangeEdit};
use truth_error::{ContractError, ParseBudget};
use truth_phrase_graph::{clarifier_key, Phrase, SpineStep};
use truth_resolver::{resolve_references, DocumentSource, ReferenceFault, ResolveError as ResolverLoadError};
use truth_uri::Uri;

use crate::cause::{Cause, FaultRecord, StatementSet};
use crate::config::ProgramConfig;
use crate::render::render_fault;
use crate::uri_reader::{UriReadError, UriReader};

/// One `Program`'s view of a document set. `spec.md` §9 "Global program
/// state": "there is no process-wide mutable state; each `Program` instance
/// owns its documents... Shared interning of `Term` is per-program".
pub struct Program {
    config: ProgramConfig,
    interner: RefCell<Interner>,
    documents: RefCell<Vec<Rc<Document>>>,
    listeners: RefCell<Vec<Box<dyn FnMut(&Cause)>>>,
    uri_reader: RefCell<Box<dyn UriReader>>,
    /// The last published fault snapshot per document (own statement faults
    /// plus the resolver's), keyed by document identity, for
    /// `CauseFaultChange`'s symmetric-difference computation.
    fault_snapshots: RefCell<FxHashMap<*const Document, Vec<FaultRecord>>>,
    /// The reference resolver's own faults, cached separately because it
    /// does not necessarily re-run on every transaction — a transaction with
    /// no URI-statement churn must still carry its document's prior resolver
    /// faults forward into the merged snapshot.
    resolver_faults: RefCell<FxHashMap<*const Document, Vec<FaultRecord>>>,
    /// Phrases awaiting the (out-of-scope) semantic type analyzer's
    /// verification, accumulated on revalidation (`spec.md` §5 "the phrase
    /// verification queue").
    verification_queue: RefCell<Vec<Weak<Phrase>>>,
}

impl Program {
    pub fn new(config: ProgramConfig, uri_reader: Box<dyn UriReader>) -> Program {
        let interner = Interner::with_capacity(config.initial_term_capacity);
        Program {
            config,
            interner: RefCell::new(interner),
            documents: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            uri_reader: RefCell::new(uri_reader),
            fault_snapshots: RefCell::new(FxHashMap::default()),
            resolver_faults: RefCell::new(FxHashMap::default()),
            verification_queue: RefCell::new(Vec::new()),
        }
    }

    pub fn parse_budget(&self) -> ParseBudget {
        self.config.parse_budget
    }

    /// Registers a new cause listener, called synchronously in registration
    /// order for every subsequent cause (`spec.md` §9).
    pub fn register_cause_listener(&self, listener: Box<dyn FnMut(&Cause)>) {
        self.listeners.borrow_mut().push(listener);
    }

    fn publish(&self, cause: Cause) {
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(&cause);
        }
    }

    pub fn documents(&self) -> Vec<Rc<Document>> {
        self.documents.borrow().clone()
    }

    pub fn get_document_by_uri(&self, uri: &Uri) -> Option<Rc<Document>> {
        let key = uri.store_string();
        self.documents.borrow().iter().find(|d| d.uri().is_some_and(|u| u.store_string() == key)).cloned()
    }

    /// `spec.md` §6: opens a document from literal text, rejecting a `uri`
    /// collision with one already live in this program.
    pub fn open_document_from_text(&self, text: &str, uri: Option<Uri>) -> Result<Rc<Document>, ContractError> {
        if let Some(uri) = &uri {
            if self.get_document_by_uri(uri).is_some() {
                return Err(ContractError::UriAlreadyInUse { uri: uri.store_string() });
            }
        }
        Ok(self.register_new_document(text, uri))
    }

    /// `spec.md` §6: opens a document whose text must first be loaded
    /// through the configured [`UriReader`]. Returns the already-open
    /// document without reloading it if `uri` is already known.
    pub fn open_document_from_uri(&self, uri: &Uri) -> Result<Rc<Document>, UriReadError> {
        if let Some(existing) = self.get_document_by_uri(uri) {
            return Ok(existing);
        }
        let text = self.uri_reader.borrow_mut().read(uri)?;
        Ok(self.register_new_document(&text, Some(uri.clone())))
    }

    /// Parses, registers, and publishes `DocumentCreate` for a brand-new
    /// document, then resolves every reference it starts with — all of them
    /// count as `added`, since the document itself did not exist a moment
    /// ago (`spec.md` §4.7).
    fn register_new_document(&self, text: &str, uri: Option<Uri>) -> Rc<Document> {
        let document = {
            let mut interner = self.interner.borrow_mut();
            Document::from_text(text, uri, &mut interner, &self.config.parse_budget)
        };
        self.documents.borrow_mut().push(Rc::clone(&document));
        self.publish(Cause::DocumentCreate(Rc::clone(&document)));

        let added = document.uri_statements();
        if !added.is_empty() {
            let faults = {
                let mut adapter = SourceAdapter { program: self };
                resolve_references(&document, &added, &mut adapter).faults
            };
            self.store_resolver_faults(&document, faults);
        }
        self.refresh_fault_snapshot(&document);
        document
    }

    /// `spec.md` §6 "delete document": fires `DocumentDelete` before this
    /// program stops tracking it. A document still held as a dependency by
    /// a live dependent is not force-unloaded — nothing in the spec
    /// describes cascading deletes.
    pub fn delete_document(&self, document: &Rc<Document>) {
        self.publish(Cause::DocumentDelete(Rc::clone(document)));
        for dependency in document.dependencies() {
            dependency.remove_dependent(document);
        }
        self.documents.borrow_mut().retain(|d| !Rc::ptr_eq(d, document));
        let key = Rc::as_ptr(document);
        self.fault_snapshots.borrow_mut().remove(&key);
        self.resolver_faults.borrow_mut().remove(&key);
    }

    /// `spec.md` §6 "`CauseDocumentUriChange(document, new_uri)` — after
    /// `update_uri`".
    pub fn update_uri(&self, document: &Rc<Document>, new_uri: Option<Uri>) -> Result<(), ContractError> {
        if let Some(uri) = &new_uri {
            if let Some(existing) = self.get_document_by_uri(uri) {
                if !Rc::ptr_eq(&existing, document) {
                    return Err(ContractError::UriAlreadyInUse { uri: uri.store_string() });
                }
            }
        }
        document.set_uri(new_uri.clone());
        self.publish(Cause::DocumentUriChange(Rc::clone(document), new_uri));
        Ok(())
    }

    /// Runs one edit transaction and publishes every cause it produces, in
    /// the order `spec.md` §5 requires: paired `Invalidate`/`Revalidate`,
    /// then reference resolution, then `EditComplete`, then the fault-change
    /// delta.
    pub fn edit<F>(&self, document: &Rc<Document>, mutator_fn: F) -> Result<truth_edit::EditOutcome, ContractError>
    where
        F: FnOnce(&mut Mutator),
    {
        let outcome = {
            let mut interner = self.interner.borrow_mut();
            truth_edit::edit(document, &mut interner, &self.config.parse_budget, mutator_fn)?
        };
        self.finish_transaction(document, &outcome);
        Ok(outcome)
    }

    /// As [`Program::edit`], but for a batch of editor-style range edits
    /// (`truth_edit::edit_atomic`).
    pub fn edit_atomic(&self, document: &Rc<Document>, range_edits: &[RangeEdit]) -> Result<truth_edit::EditOutcome, ContractError> {
        let outcome = {
            let mut interner = self.interner.borrow_mut();
            truth_edit::edit_atomic(document, &mut interner, &self.config.parse_budget, range_edits)?
        };
        self.finish_transaction(document, &outcome);
        Ok(outcome)
    }

    fn finish_transaction(&self, document: &Rc<Document>, outcome: &truth_edit::EditOutcome) {
        if !outcome.mutated {
            return;
        }
        self.publish(Cause::Invalidate(Rc::clone(document), to_statement_set(&outcome.invalidate)));
        self.publish(Cause::Revalidate(Rc::clone(document), to_statement_set(&outcome.revalidate)));

        if !outcome.added_uri_statements.is_empty() || !outcome.removed_uri_statements.is_empty() {
            let faults = {
                let mut adapter = SourceAdapter { program: self };
                resolve_references(document, &outcome.added_uri_statements, &mut adapter).faults
            };
            self.store_resolver_faults(document, faults);
        }

        self.publish(Cause::EditComplete(Rc::clone(document)));
        self.enqueue_for_verification(document, &outcome.revalidate);
        self.refresh_fault_snapshot(document);
    }

    fn store_resolver_faults(&self, document: &Rc<Document>, faults: Vec<ReferenceFault>) {
        let records = faults.into_iter().map(|f| FaultRecord { statement: f.statement, fault: f.fault }).collect();
        self.resolver_faults.borrow_mut().insert(Rc::as_ptr(document), records);
    }

    /// Rescans `document`'s own statement faults, unions in the cached
    /// resolver faults, and publishes the symmetric difference against the
    /// previous snapshot as `CauseFaultChange` (`spec.md` §4.8). A full
    /// rescan rather than a tracked delta: `EditOutcome` exposes which
    /// parents were invalidated/revalidated, not which individual statements
    /// gained or lost a fault, so a snapshot diff is the simplest correct
    /// approach available at this layer.
    fn refresh_fault_snapshot(&self, document: &Rc<Document>) {
        let key = Rc::as_ptr(document);
        let mut snapshot = self.collect_statement_faults(document);
        if let Some(resolver) = self.resolver_faults.borrow().get(&key) {
            snapshot.extend(resolver.iter().cloned());
        }

        let previous = self.fault_snapshots.borrow_mut().insert(key, snapshot.clone()).unwrap_or_default();
        let added: Vec<FaultRecord> = snapshot.iter().filter(|f| !previous.contains(f)).cloned().collect();
        let removed: Vec<FaultRecord> = previous.iter().filter(|f| !snapshot.contains(f)).cloned().collect();
        if !added.is_empty() || !removed.is_empty() {
            self.publish(Cause::FaultChange { added, removed });
        }
    }

    fn collect_statement_faults(&self, document: &Document) -> Vec<FaultRecord> {
        document
            .statements()
            .into_iter()
            .filter(|s| !s.is_disposed())
            .flat_map(|s| s.faults.iter().map(|f| FaultRecord { statement: Rc::clone(&s), fault: f.clone() }).collect::<Vec<_>>())
            .collect()
    }

    /// Walks the spines of every revalidated statement (or the whole
    /// document, on a whole-document revalidation) and enqueues the phrase
    /// leaves they land on for the external type analyzer.
    fn enqueue_for_verification(&self, document: &Rc<Document>, revalidate: &InvalidationSet) {
        let statements = document.statements();
        let targets: Vec<(usize, Rc<Statement>)> = if revalidate.whole_document {
            statements.iter().cloned().enumerate().collect()
        } else {
            revalidate.indices.iter().copied().zip(revalidate.statements.iter().cloned()).collect()
        };

        let mut queue = self.verification_queue.borrow_mut();
        for (index, statement) in &targets {
            for (_, spines) in truth_edit::spines_for_statement(&statements, *index, statement) {
                for spine in &spines {
                    if let Some(leaf) = walk_spine(&document.root, spine) {
                        queue.push(Rc::downgrade(&leaf));
                    }
                }
            }
        }
    }

    /// The distinct subjects declared directly under `document`'s root,
    /// i.e. the per-document "root types memo" (`spec.md` §4.5
    /// "Finalization": "clear per-document derived caches (root types
    /// memo)").
    pub fn query_root_types(&self, document: &Document) -> Vec<Rc<Phrase>> {
        document.root.children()
    }

    /// Drains every phrase queued for verification since the last drain,
    /// dropping any that have since been disposed or dropped outright
    /// (`spec.md` §5: "disposal of a phrase... cancels any pending
    /// verification").
    pub fn force_verification_drain(&self) -> Vec<Rc<Phrase>> {
        self.verification_queue.borrow_mut().drain(..).filter_map(|weak| weak.upgrade()).filter(|p| !p.is_disposed()).collect()
    }

    /// Renders `record` using its statement's current line number in
    /// `document` (`spec.md` §6 "Fault rendering"). `None` if the statement
    /// is no longer part of `document` (it was disposed by a later
    /// transaction after the fault was recorded).
    pub fn render_fault(&self, document: &Document, record: &FaultRecord) -> Option<String> {
        let index = document.statements().iter().position(|s| Rc::ptr_eq(s, &record.statement))?;
        Some(render_fault(document, index + 1, &record.fault))
    }
}

fn to_statement_set(set: &InvalidationSet) -> StatementSet {
    StatementSet { statements: set.statements.clone(), indices: set.indices.clone(), whole_document: set.whole_document }
}

fn walk_spine(root: &Rc<Phrase>, spine: &[SpineStep]) -> Option<Rc<Phrase>> {
    let mut current = Rc::clone(root);
    for step in spine {
        current = current.peek_with_clarifier(&step.subject, &clarifier_key(&step.clarifiers))?;
    }
    Some(current)
}

/// Bridges `Program`'s `&self`-based interior mutability (every field is a
/// `RefCell`) to `truth_resolver::DocumentSource`'s `&mut self` signature:
/// the adapter itself is a disposable stack value, so `&mut self` here
/// borrows only the adapter, not the `Program` behind its shared reference.
struct SourceAdapter<'a> {
    program: &'a Program,
}

impl DocumentSource for SourceAdapter<'_> {
    fn get_document_by_uri(&self, uri: &Uri) -> Option<Rc<Document>> {
        self.program.get_document_by_uri(uri)
    }

    fn add_document_from_uri(&mut self, uri: &Uri) -> Result<Rc<Document>, ResolverLoadError> {
        self.program.open_document_from_uri(uri).map_err(|_| ResolverLoadError::LoadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell as StdRefCell;
    use std::collections::HashMap;
    use truth_diagnostics_codes::FaultKind;
    use truth_uri::Protocol;

    struct MapReader(HashMap<String, String>);

    impl UriReader for MapReader {
        fn read(&mut self, uri: &Uri) -> Result<String, UriReadError> {
            self.0.get(&uri.store_string()).cloned().ok_or_else(|| UriReadError::NotFound(uri.store_string()))
        }
    }

    fn program() -> Program {
        Program::new(ProgramConfig::default(), Box::new(crate::NullUriReader))
    }

    #[test]
    fn opening_a_document_fires_document_create() {
        let program = program();
        let fired = Rc::new(StdRefCell::new(false));
        let flag = Rc::clone(&fired);
        program.register_cause_listener(Box::new(move |cause| {
            if matches!(cause, Cause::DocumentCreate(_)) {
                *flag.borrow_mut() = true;
            }
        }));

        let document = program.open_document_from_text("A : B", None).expect("opens");
        assert_eq!(document.statement_count(), 1);
        assert!(*fired.borrow());
    }

    #[test]
    fn opening_two_documents_with_the_same_uri_fails() {
        let program = program();
        let uri = Uri::new(Protocol::Internal, "a");
        program.open_document_from_text("A : B", Some(uri.clone())).expect("first open succeeds");
        let result = program.open_document_from_text("C : D", Some(uri));
        assert!(matches!(result, Err(ContractError::UriAlreadyInUse { .. })));
    }

    #[test]
    fn an_unresolvable_reference_raises_a_fault_change_with_unresolved_resource() {
        let program = program();
        let added = Rc::new(StdRefCell::new(Vec::new()));
        let log = Rc::clone(&added);
        program.register_cause_listener(Box::new(move |cause| {
            if let Cause::FaultChange { added, .. } = cause {
                log.borrow_mut().extend(added.iter().map(|f| f.fault.kind));
            }
        }));

        program.open_document_from_text("internal//missing\nA : B", None).expect("opens");
        assert_eq!(added.borrow().to_vec(), vec![FaultKind::UnresolvedResource]);
    }

    #[test]
    fn loading_a_referenced_document_fires_its_document_create_during_the_referrers_own_open() {
        let mut backing = HashMap::new();
        backing.insert("internal://lib".to_string(), "C : D".to_string());
        let program = Program::new(ProgramConfig::default(), Box::new(MapReader(backing)));

        let creates = Rc::new(StdRefCell::new(0));
        let count = Rc::clone(&creates);
        program.register_cause_listener(Box::new(move |cause| {
            if matches!(cause, Cause::DocumentCreate(_)) {
                *count.borrow_mut() += 1;
            }
        }));

        let referrer = program.open_document_from_text("internal//lib\nA : B", None).expect("opens");
        assert_eq!(referrer.dependencies().len(), 1);
        assert_eq!(*creates.borrow(), 2);
    }

    #[test]
    fn a_pure_update_transaction_pairs_invalidate_and_revalidate_before_edit_complete() {
        let program = program();
        let document = program.open_document_from_text("A\n\tB\n\tC", None).expect("opens");

        let order: Rc<StdRefCell<Vec<&'static str>>> = Rc::new(StdRefCell::new(Vec::new()));
        let log = Rc::clone(&order);
        program.register_cause_listener(Box::new(move |cause| match cause {
            Cause::Invalidate(..) => log.borrow_mut().push("invalidate"),
            Cause::Revalidate(..) => log.borrow_mut().push("revalidate"),
            Cause::EditComplete(_) => log.borrow_mut().push("edit_complete"),
            _ => {}
        }));

        let before = document.version();
        program.edit(&document, |mutator| mutator.update("A".to_string(), 0)).expect("edits");
        assert_eq!(order.borrow().to_vec(), vec!["invalidate", "revalidate", "edit_complete"]);
        assert_eq!(document.version(), before + 1);
    }

    #[test]
    fn deleting_a_document_fires_document_delete_and_forgets_it() {
        let program = program();
        let document = program.open_document_from_text("A : B", None).expect("opens");
        let deleted = Rc::new(StdRefCell::new(false));
        let flag = Rc::clone(&deleted);
        program.register_cause_listener(Box::new(move |cause| {
            if matches!(cause, Cause::DocumentDelete(_)) {
                *flag.borrow_mut() = true;
            }
        }));

        program.delete_document(&document);
        assert!(*deleted.borrow());
        assert!(program.documents().is_empty());
    }

    #[test]
    fn query_root_types_lists_the_documents_top_level_subjects() {
        let program = program();
        let document = program.open_document_from_text("A : X\nB : Y", None).expect("opens");
        let roots = program.query_root_types(&document);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn force_verification_drain_empties_the_queue() {
        let program = program();
        let document = program.open_document_from_text("A", None).expect("opens");
        program.edit(&document, |mutator| mutator.update("A".to_string(), 0)).expect("edits");
        let first = program.force_verification_drain();
        assert!(!first.is_empty());
        assert!(program.force_verification_drain().is_empty());
    }
}
