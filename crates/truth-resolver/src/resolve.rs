//! The reference-resolution algorithm itself (`spec.md` §4.7).

use std::rc::Rc;

use rustc_hash::FxHashSet;
use truth_ast::{Fault, Statement, Subject};
use truth_diagnostics_codes::FaultKind;
use truth_document::Document;
use truth_uri::{is_insecure_reference, Protocol, Uri};

use crate::source::{DocumentSource, ResolveError};

/// A fault raised against a specific URI statement during resolution. The
/// resolver has no fault queue of its own — the caller (`truth-program`)
/// folds these into its own `report_async`/`CauseFaultChange` bookkeeping.
#[derive(Debug, Clone)]
pub struct ReferenceFault {
    pub statement: Rc<Statement>,
    pub fault: Fault,
}

/// Everything one `resolve_references` call produced: new faults, and the
/// symmetric add/remove delta against the document's dependency list
/// (`spec.md` §4.7 step 6).
#[derive(Debug, Clone, Default)]
pub struct ResolveOutcome {
    pub faults: Vec<ReferenceFault>,
    pub added_deps: Vec<Rc<Document>>,
    pub removed_deps: Vec<Rc<Document>>,
}

/// Recomputes `document`'s dependency set from its current (post-edit)
/// `uri_statements`, reporting faults for the URI statements named in
/// `added` (`spec.md` §4.7). `document`'s statement buffer is assumed
/// already up to date — the edit engine has applied the transaction before
/// this runs, so `deleted` URI statements are simply absent from it and
/// need no separate subtraction step here.
pub fn resolve_references(document: &Rc<Document>, added: &[Rc<Statement>], source: &mut dyn DocumentSource) -> ResolveOutcome {
    let statements = document.statements();
    let mut proposed: Vec<(usize, Rc<Statement>)> =
        statements.iter().enumerate().filter(|(_, s)| s.flags.has_uri).map(|(i, s)| (i, Rc::clone(s))).collect();
    // `spec.md` §4.7 step 2: "sort by line_number descending... determines
    // which occurrence wins a duplicate check" (`DESIGN.md`: last
    // occurrence in the document — the lowest line number processed last —
    // is the one that is never flagged).
    proposed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut faults = Vec::new();
    let mut faulty: Vec<Rc<Statement>> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for (_, statement) in &proposed {
        let Some(uri) = statement_uri(statement) else { continue };
        let key = uri.store_string();
        if seen.contains(&key) {
            faults.push(raise(statement, FaultKind::DuplicateReference));
            faulty.push(Rc::clone(statement));
        }
        seen.push(key);
    }

    let referrer_protocol = document.uri().map(|u| u.protocol()).unwrap_or(Protocol::None);
    let mut new_deps: Vec<Rc<Document>> = Vec::new();

    // `spec.md` §3: "dependencies... in the same order as the first
    // occurrence of each URI". The descending sort above exists only to
    // pick the duplicate-check survivor (`spec.md` §4.7 step 2); the
    // dependency list itself is built in ascending (first-occurrence)
    // document order.
    let mut in_first_occurrence_order = proposed.clone();
    in_first_occurrence_order.sort_by(|a, b| a.0.cmp(&b.0));

    for (_, statement) in &in_first_occurrence_order {
        if faulty.iter().any(|f| Rc::ptr_eq(f, statement)) {
            continue;
        }
        let Some(uri) = statement_uri(statement) else { continue };
        let is_added = added.iter().any(|a| Rc::ptr_eq(a, statement));

        if is_added && is_insecure_reference(referrer_protocol, uri.protocol()) {
            faults.push(raise(statement, FaultKind::InsecureResourceReference));
            continue;
        }

        let target = resolve_target(&uri, is_added, source);
        let Some(target) = target else {
            if is_added {
                faults.push(raise(statement, FaultKind::UnresolvedResource));
            }
            continue;
        };

        if is_added && creates_cycle(document, &target) {
            faults.push(raise(statement, FaultKind::CircularResourceReference));
            continue;
        }

        if !new_deps.iter().any(|d| Rc::ptr_eq(d, &target)) {
            new_deps.push(target);
        }
    }

    let old_deps = document.dependencies();
    let added_deps: Vec<Rc<Document>> = new_deps.iter().filter(|d| !old_deps.iter().any(|o| Rc::ptr_eq(o, d))).cloned().collect();
    let removed_deps: Vec<Rc<Document>> = old_deps.iter().filter(|o| !new_deps.iter().any(|d| Rc::ptr_eq(d, o))).cloned().collect();

    for dep in &added_deps {
        dep.add_dependent(document);
    }
    for dep in &removed_deps {
        dep.remove_dependent(document);
    }
    document.set_dependencies(new_deps);

    tracing::debug!(
        added = added_deps.len(),
        removed = removed_deps.len(),
        faults = faults.len(),
        "resolved document references"
    );

    ResolveOutcome { faults, added_deps, removed_deps }
}

/// `spec.md` §4.7 step 4: previously-resolved references are looked up
/// only; a newly added reference falls back to loading the document if it
/// is not already known to the program.
fn resolve_target(uri: &Uri, is_added: bool, source: &mut dyn DocumentSource) -> Option<Rc<Document>> {
    if let Some(existing) = source.get_document_by_uri(uri) {
        return Some(existing);
    }
    if !is_added {
        return None;
    }
    match source.add_document_from_uri(uri) {
        Ok(loaded) => Some(loaded),
        Err(ResolveError::LoadFailed) => None,
    }
}

/// Depth-first search from `candidate` through its `dependencies`, looking
/// for a path back to `document` (`spec.md` §4.7 step 4: "if adding this
/// reference would create a cycle").
fn creates_cycle(document: &Rc<Document>, candidate: &Rc<Document>) -> bool {
    let mut stack = vec![Rc::clone(candidate)];
    let mut visited: FxHashSet<*const Document> = FxHashSet::default();
    while let Some(current) = stack.pop() {
        if Rc::ptr_eq(&current, document) {
            return true;
        }
        if !visited.insert(Rc::as_ptr(&current)) {
            continue;
        }
        stack.extend(current.dependencies());
    }
    false
}

fn statement_uri(statement: &Statement) -> Option<Uri> {
    match statement.sole_declaration().map(|span| &span.subject) {
        Some(Subject::Uri(uri)) => Some(uri.clone()),
        _ => None,
    }
}

fn raise(statement: &Rc<Statement>, kind: FaultKind) -> ReferenceFault {
    ReferenceFault { statement: Rc::clone(statement), fault: Fault::for_statement(kind, statement.indent, statement.source_text.len()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use truth_ast::Interner;
    use truth_error::ParseBudget;

    #[derive(Default)]
    struct FakeSource {
        known: RefCell<HashMap<String, Rc<Document>>>,
        load_fails: Vec<String>,
    }

    impl FakeSource {
        fn register(&self, uri: &Uri, document: Rc<Document>) {
            self.known.borrow_mut().insert(uri.store_string(), document);
        }
    }

    impl DocumentSource for FakeSource {
        fn get_document_by_uri(&self, uri: &Uri) -> Option<Rc<Document>> {
            self.known.borrow().get(&uri.store_string()).cloned()
        }

        fn add_document_from_uri(&mut self, uri: &Uri) -> Result<Rc<Document>, ResolveError> {
            if self.load_fails.contains(&uri.store_string()) {
                return Err(ResolveError::LoadFailed);
            }
            let mut interner = Interner::new();
            let loaded = Document::from_text("A : B", Some(Uri::new(uri.protocol(), uri.path())), &mut interner, &ParseBudget::default());
            self.known.borrow_mut().insert(uri.store_string(), Rc::clone(&loaded));
            Ok(loaded)
        }
    }

    fn doc(text: &str, own_uri: Option<Uri>) -> Rc<Document> {
        let mut interner = Interner::new();
        Document::from_text(text, own_uri, &mut interner, &ParseBudget::default())
    }

    #[test]
    fn a_newly_added_reference_resolves_and_becomes_a_dependency() {
        let referrer = doc("internal//target\nA : B", None);
        let target = doc("C : D", Some(Uri::new(truth_uri::Protocol::Internal, "target")));
        let mut source = FakeSource::default();
        source.register(&target.uri().unwrap(), Rc::clone(&target));

        let added = vec![referrer.statement(0).unwrap()];
        let outcome = resolve_references(&referrer, &added, &mut source);

        assert!(outcome.faults.is_empty());
        assert_eq!(outcome.added_deps.len(), 1);
        assert_eq!(referrer.dependencies().len(), 1);
        assert_eq!(target.dependents().len(), 1);
    }

    #[test]
    fn an_unresolvable_new_reference_reports_unresolved_resource() {
        let referrer = doc("internal//missing\nA : B", None);
        let mut source = FakeSource { load_fails: vec!["internal://missing".to_string()], ..Default::default() };
        let added = vec![referrer.statement(0).unwrap()];
        let outcome = resolve_references(&referrer, &added, &mut source);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].fault.kind, FaultKind::UnresolvedResource);
        assert!(referrer.dependencies().is_empty());
    }

    #[test]
    fn an_https_referrer_pointing_at_file_is_flagged_insecure() {
        let referrer = doc("file//local\nA : B", Some(Uri::new(truth_uri::Protocol::Https, "example.com/doc")));
        let mut source = FakeSource::default();
        let added = vec![referrer.statement(0).unwrap()];
        let outcome = resolve_references(&referrer, &added, &mut source);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].fault.kind, FaultKind::InsecureResourceReference);
    }

    #[test]
    fn duplicate_uris_flag_every_occurrence_but_the_last_in_document_order() {
        let referrer = doc("internal//target\nA : B\ninternal//target", None);
        let target = doc("C : D", Some(Uri::new(truth_uri::Protocol::Internal, "target")));
        let mut source = FakeSource::default();
        source.register(&target.uri().unwrap(), Rc::clone(&target));

        let added = vec![referrer.statement(0).unwrap(), referrer.statement(2).unwrap()];
        let outcome = resolve_references(&referrer, &added, &mut source);

        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].fault.kind, FaultKind::DuplicateReference);
        // The lower line number (index 0) is the one flagged; the later
        // occurrence at index 2 wins and contributes the dependency.
        assert!(Rc::ptr_eq(&outcome.faults[0].statement, &referrer.statement(0).unwrap()));
    }

    #[test]
    fn a_reference_back_to_an_ancestor_is_reported_as_circular() {
        let referrer = doc("internal//target\nA : B", Some(Uri::new(truth_uri::Protocol::Internal, "referrer")));
        let target = doc("internal//referrer\nC : D", Some(Uri::new(truth_uri::Protocol::Internal, "target")));
        let mut source = FakeSource::default();
        source.register(&target.uri().unwrap(), Rc::clone(&target));
        source.register(&referrer.uri().unwrap(), Rc::clone(&referrer));

        // `target` already depends on `referrer` (simulating a prior
        // resolution), so adding `referrer -> target` would close a cycle.
        target.set_dependencies(vec![Rc::clone(&referrer)]);

        let added = vec![referrer.statement(0).unwrap()];
        let outcome = resolve_references(&referrer, &added, &mut source);

        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].fault.kind, FaultKind::CircularResourceReference);
        assert!(referrer.dependencies().is_empty());
    }
}
