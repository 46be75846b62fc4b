//! The edit transaction engine: classifies a recorded call batch, runs the
//! fastest applicable path, and otherwise falls back to the general
//! invalidation-scope computation (`spec.md` §4.5).

use std::rc::Rc;

use truth_ast::{Interner, Statement};
use truth_document::{ancestry_of, has_descendants_of, parent_from_position, parent_of, Document};
use truth_error::{ContractError, ParseBudget};
use truth_phrase_graph::{InflatingSpan, Phrase};

use crate::classify::{call_shape, dedup_updates_by_index, CallShape};
use crate::events::{EditOutcome, InvalidationSet};
use crate::mutator::{Mutator, MutatorCall};
use crate::spine::spines_for_statement;

/// Acquires a document's edit guard for the duration of this value and
/// releases it on drop, including on an unwinding panic (`spec.md` §4.5,
/// §9: "the boolean `in_edit` guard must be set before running the mutator
/// and cleared on all exit paths including panics; use a scoped-acquisition
/// pattern").
struct EditGuard<'a> {
    document: &'a Document,
}

impl<'a> EditGuard<'a> {
    fn acquire(document: &'a Document) -> Result<Self, ContractError> {
        document.begin_edit()?;
        Ok(EditGuard { document })
    }
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        self.document.end_edit();
    }
}

/// Runs one edit transaction against `document`. `mutator_fn` records calls
/// against a [`Mutator`] but nothing is applied until it returns (`spec.md`
/// §4.5: "obtains a mutator... All calls are recorded, not applied
/// immediately").
pub fn edit<F>(
    document: &Rc<Document>,
    interner: &mut Interner,
    budget: &ParseBudget,
    mutator_fn: F,
) -> Result<EditOutcome, ContractError>
where
    F: FnOnce(&mut Mutator),
{
    let _guard = EditGuard::acquire(document)?;

    let mut mutator = Mutator::new();
    mutator_fn(&mut mutator);
    let calls = mutator.calls().to_vec();
    if calls.is_empty() {
        return Ok(EditOutcome::no_op(document.version()));
    }

    let old_statements = document.statements();
    let outcome = match call_shape(&calls) {
        CallShape::PureUpdate => {
            try_pure_update(&old_statements, &calls, interner, budget)
                .unwrap_or_else(|| general_path(&old_statements, &calls, interner, budget))
        }
        CallShape::PureDelete => {
            try_pure_delete(&old_statements, &calls).unwrap_or_else(|| general_path(&old_statements, &calls, interner, budget))
        }
        CallShape::PureInsert => {
            try_pure_insert(&old_statements, &calls, interner, budget)
                .unwrap_or_else(|| general_path(&old_statements, &calls, interner, budget))
        }
        CallShape::Mixed | CallShape::Empty => general_path(&old_statements, &calls, interner, budget),
    };

    apply_phrase_graph_deltas(document, &old_statements, &outcome);
    let mutated = outcome.mutated;
    document.replace_statements(outcome.new_statements);
    if mutated {
        document.bump_version();
    }

    Ok(EditOutcome {
        invalidate: outcome.invalidate,
        revalidate: outcome.revalidate,
        added_uri_statements: outcome.added_uri_statements,
        removed_uri_statements: outcome.removed_uri_statements,
        version: document.version(),
        mutated,
    })
}

/// Internal result of a classified path, before phrase-graph maintenance and
/// the final statement-buffer swap (which `edit()` performs uniformly for
/// every path).
struct PathResult {
    new_statements: Vec<Rc<Statement>>,
    invalidate: InvalidationSet,
    revalidate: InvalidationSet,
    added_uri_statements: Vec<Rc<Statement>>,
    removed_uri_statements: Vec<Rc<Statement>>,
    /// Statements present in `old_statements` that are gone from
    /// `new_statements` and whose declaration spines must be deflated.
    deflate: Vec<(usize, Rc<Statement>)>,
    /// Statements newly present in `new_statements` (by identity, not just
    /// position) whose declaration spines must be inflated.
    inflate: Vec<(usize, Rc<Statement>)>,
    mutated: bool,
}

/// `spec.md` §4.5 fast path 1: pure updates with no structural change.
fn try_pure_update(old_statements: &[Rc<Statement>], calls: &[MutatorCall], interner: &mut Interner, budget: &ParseBudget) -> Option<PathResult> {
    let deduped = dedup_updates_by_index(calls);
    let mut replacements = Vec::with_capacity(deduped.len());
    for call in &deduped {
        let MutatorCall::Update { text, at } = call else { return None };
        let old = old_statements.get(*at)?;
        let new = truth_parser::parse_statement(text, interner, budget);
        let structurally_same = new.indent == old.indent && (new.is_noop() == old.is_noop());
        if !structurally_same {
            return None;
        }
        replacements.push((*at, Rc::clone(old), new));
    }

    let mut new_statements = old_statements.to_vec();
    let mut deflate = Vec::new();
    let mut inflate = Vec::new();
    let mut added_uri_statements = Vec::new();
    let mut removed_uri_statements = Vec::new();
    for (at, old, new) in &replacements {
        if old.flags.has_uri {
            removed_uri_statements.push(Rc::clone(old));
        }
        if new.flags.has_uri {
            added_uri_statements.push(Rc::clone(new));
        }
        deflate.push((*at, Rc::clone(old)));
        new_statements[*at] = Rc::clone(new);
        inflate.push((*at, Rc::clone(new)));
    }

    let invalidate = InvalidationSet::of(replacements.iter().map(|(at, old, _)| (*at, Rc::clone(old))).collect());
    let revalidate = InvalidationSet::of(replacements.into_iter().map(|(at, _, new)| (at, new)).collect());

    Some(PathResult {
        new_statements,
        invalidate,
        revalidate,
        added_uri_statements,
        removed_uri_statements,
        deflate,
        inflate,
        mutated: true,
    })
}

/// `spec.md` §4.5 fast path 2: pure deletes, all of them leaves.
fn try_pure_delete(old_statements: &[Rc<Statement>], calls: &[MutatorCall]) -> Option<PathResult> {
    let mut victim_indices: Vec<usize> = Vec::new();
    for call in calls {
        let MutatorCall::Delete { at, count } = call else { return None };
        for offset in 0..*count {
            victim_indices.push(*at + offset);
        }
    }
    victim_indices.sort_unstable();
    victim_indices.dedup();

    for &index in &victim_indices {
        if has_descendants_of(old_statements, index) {
            return None;
        }
    }

    let mut invalidated = Vec::with_capacity(victim_indices.len());
    let mut removed_uri_statements = Vec::new();
    let mut deflate = Vec::new();
    for &index in &victim_indices {
        let statement = old_statements.get(index)?;
        invalidated.push((index, Rc::clone(statement)));
        if statement.flags.has_uri {
            removed_uri_statements.push(Rc::clone(statement));
        }
        deflate.push((index, Rc::clone(statement)));
    }

    let mut new_statements = Vec::with_capacity(old_statements.len() - victim_indices.len());
    for (i, statement) in old_statements.iter().enumerate() {
        if victim_indices.contains(&i) {
            statement.dispose();
        } else {
            new_statements.push(Rc::clone(statement));
        }
    }

    Some(PathResult {
        new_statements,
        invalidate: InvalidationSet::of(invalidated),
        revalidate: InvalidationSet::empty(),
        added_uri_statements: Vec::new(),
        removed_uri_statements,
        deflate,
        inflate: Vec::new(),
        mutated: true,
    })
}

/// `spec.md` §4.5 fast path 3: pure no-op inserts, applied silently.
fn try_pure_insert(old_statements: &[Rc<Statement>], calls: &[MutatorCall], interner: &mut Interner, budget: &ParseBudget) -> Option<PathResult> {
    let mut parsed: Vec<(usize, Rc<Statement>)> = Vec::with_capacity(calls.len());
    for call in calls {
        let MutatorCall::Insert { text, at } = call else { return None };
        for line in text.split('\n') {
            let statement = truth_parser::parse_statement(line, interner, budget);
            if !statement.is_noop() {
                return None;
            }
            parsed.push((*at, statement));
        }
    }

    let mut new_statements = old_statements.to_vec();
    // Insert in reverse `at` order so earlier insertion points are not
    // shifted by later ones within this batch.
    parsed.sort_by_key(|(at, _)| *at);
    for (at, statement) in parsed.into_iter().rev() {
        new_statements.insert(at, statement);
    }

    Some(PathResult {
        new_statements,
        invalidate: InvalidationSet::empty(),
        revalidate: InvalidationSet::empty(),
        added_uri_statements: Vec::new(),
        removed_uri_statements: Vec::new(),
        deflate: Vec::new(),
        inflate: Vec::new(),
        mutated: true,
    })
}

/// `spec.md` §4.5 "General path": compute invalidated parents, apply
/// mutations in recorded order, then compute the surviving revalidate set.
fn general_path(old_statements: &[Rc<Statement>], calls: &[MutatorCall], interner: &mut Interner, budget: &ParseBudget) -> PathResult {
    let (whole_document, invalidated_parents) = compute_invalidated_parents(old_statements, calls, interner, budget);

    let invalidate = if whole_document {
        InvalidationSet::whole_document()
    } else {
        let mut indexed: Vec<(usize, Rc<Statement>)> = invalidated_parents
            .iter()
            .filter_map(|parent| index_of(old_statements, parent).map(|i| (i, Rc::clone(parent))))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        InvalidationSet::of(indexed)
    };

    let mut working: Vec<Rc<Statement>> = old_statements.to_vec();
    let mut added_uri_statements = Vec::new();
    let mut removed_uri_statements = Vec::new();
    let mut deflate: Vec<(usize, Rc<Statement>)> = Vec::new();
    let mut inflate: Vec<Rc<Statement>> = Vec::new();

    for call in calls {
        match call {
            MutatorCall::Delete { at, count } => {
                let end = (*at + *count).min(working.len());
                for (offset, statement) in working.drain(*at..end).enumerate() {
                    if statement.flags.has_uri {
                        removed_uri_statements.push(Rc::clone(&statement));
                    }
                    statement.dispose();
                    deflate.push((*at + offset, statement));
                }
            }
            MutatorCall::Update { text, at } => {
                if *at >= working.len() {
                    continue;
                }
                let old = std::mem::replace(&mut working[*at], truth_parser::parse_statement(text, interner, budget));
                if old.flags.has_uri {
                    removed_uri_statements.push(Rc::clone(&old));
                }
                old.dispose();
                deflate.push((*at, old));
                let new = Rc::clone(&working[*at]);
                if new.flags.has_uri {
                    added_uri_statements.push(Rc::clone(&new));
                }
                inflate.push(new);
            }
            MutatorCall::Insert { text, at } => {
                let mut insertion_point = *at;
                for line in text.split('\n') {
                    let statement = truth_parser::parse_statement(line, interner, budget);
                    if statement.flags.has_uri {
                        added_uri_statements.push(Rc::clone(&statement));
                    }
                    inflate.push(Rc::clone(&statement));
                    working.insert(insertion_point, statement);
                    insertion_point += 1;
                }
            }
        }
    }

    // Deflation uses the spines implied by the *old* statement buffer (the
    // ancestry a removed declaration actually had); the indices recorded
    // above are each deflated statement's position in `old_statements`.
    // Any invalidated parent that was itself deleted must drop out of the
    // revalidate set (`spec.md` §4.5 general path step 3).
    let deleted_identities: Vec<Rc<Statement>> = deflate.iter().map(|(_, s)| Rc::clone(s)).collect();
    let surviving_parents: Vec<Rc<Statement>> = invalidated_parents
        .into_iter()
        .filter(|parent| !deleted_identities.iter().any(|d| Rc::ptr_eq(d, parent)))
        .collect();

    let revalidate = if whole_document {
        InvalidationSet::whole_document()
    } else {
        let mut indexed: Vec<(usize, Rc<Statement>)> = surviving_parents
            .iter()
            .filter_map(|parent| index_of(&working, parent).map(|i| (i, Rc::clone(parent))))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        InvalidationSet::of(indexed)
    };

    // `inflate` was collected without a final index; recompute it against
    // the finished `working` buffer so spine computation sees the right
    // ancestry.
    let inflate_indexed: Vec<(usize, Rc<Statement>)> =
        inflate.into_iter().filter_map(|statement| index_of(&working, &statement).map(|i| (i, statement))).collect();

    PathResult {
        new_statements: working,
        invalidate,
        revalidate,
        added_uri_statements,
        removed_uri_statements,
        deflate,
        inflate: inflate_indexed,
        mutated: true,
    }
}

/// `spec.md` §4.5 "General path": the invalidated-parent set, pruned to the
/// highest ancestor in each chain. `true` in the first element means the
/// whole document was invalidated and the second element should be ignored.
fn compute_invalidated_parents(
    old_statements: &[Rc<Statement>],
    calls: &[MutatorCall],
    interner: &mut Interner,
    budget: &ParseBudget,
) -> (bool, Vec<Rc<Statement>>) {
    let mut candidates: Vec<Rc<Statement>> = Vec::new();
    for call in calls {
        match call {
            MutatorCall::Delete { at, count } => {
                for offset in 0..*count {
                    let index = at + offset;
                    let Some(statement) = old_statements.get(index) else { continue };
                    if statement.is_noop() {
                        continue;
                    }
                    match parent_of(old_statements, index) {
                        Some(parent) => candidates.push(parent),
                        None => return (true, Vec::new()),
                    }
                }
            }
            MutatorCall::Insert { text, at } => {
                for (offset, line) in text.split('\n').enumerate() {
                    let statement = truth_parser::parse_statement(line, interner, budget);
                    if statement.is_noop() {
                        continue;
                    }
                    match parent_from_position(old_statements, at + offset, statement.indent) {
                        Some(parent) => candidates.push(parent),
                        None => return (true, Vec::new()),
                    }
                }
            }
            MutatorCall::Update { text, at } => {
                let statement = truth_parser::parse_statement(text, interner, budget);
                if statement.is_noop() {
                    continue;
                }
                match parent_from_position(old_statements, *at, statement.indent) {
                    Some(parent) => candidates.push(parent),
                    None => return (true, Vec::new()),
                }
            }
        }
    }

    (false, prune_to_highest_ancestors(old_statements, candidates))
}

/// Removes any candidate whose ancestry (in `statements`) contains another
/// candidate, keeping only the topmost ancestor of each chain (`spec.md`
/// §4.5: "Prune invalidated parents whose ancestry is strictly a descendant
/// of another invalidated parent").
fn prune_to_highest_ancestors(statements: &[Rc<Statement>], candidates: Vec<Rc<Statement>>) -> Vec<Rc<Statement>> {
    let mut unique: Vec<Rc<Statement>> = Vec::new();
    for candidate in candidates {
        if !unique.iter().any(|u| Rc::ptr_eq(u, &candidate)) {
            unique.push(candidate);
        }
    }
    unique
        .iter()
        .filter(|candidate| {
            let Some(index) = index_of(statements, candidate) else { return true };
            let ancestry = ancestry_of(statements, index);
            !unique.iter().any(|other| !Rc::ptr_eq(other, candidate) && ancestry.iter().any(|a| Rc::ptr_eq(a, other)))
        })
        .cloned()
        .collect()
}

fn index_of(statements: &[Rc<Statement>], needle: &Rc<Statement>) -> Option<usize> {
    statements.iter().position(|s| Rc::ptr_eq(s, needle))
}

/// Maintains the document's phrase trie for one transaction: deflate every
/// declaration span of a removed statement (against the *old* buffer's
/// ancestry), then inflate every declaration span of an added statement
/// (against the *new* buffer's ancestry) (`spec.md` §4.6 "Inflation" /
/// "Deflation").
fn apply_phrase_graph_deltas(document: &Document, old_statements: &[Rc<Statement>], outcome: &PathResult) {
    for (index, statement) in &outcome.deflate {
        for (span, spines) in spines_for_statement(old_statements, *index, statement) {
            let inflating_span = InflatingSpan::new(statement, &span);
            for spine in &spines {
                Phrase::deflate_spine(&document.root, spine, &inflating_span);
            }
        }
    }
    for (index, statement) in &outcome.inflate {
        for (span, spines) in spines_for_statement(&outcome.new_statements, *index, statement) {
            let inflating_span = InflatingSpan::new(statement, &span);
            for spine in &spines {
                Phrase::inflate_spine(&document.root, spine, inflating_span.clone());
            }
        }
    }
}
