//! `Phrase`: one node in a document's per-subject-path trie (`spec.md` §3
//! "Phrase", §4.6 "Phrase Graph").

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use truth_ast::{Span, Statement, Subject, TermId};
use truth_position_tracking::ByteSpan;

use crate::key::{clarifier_key, SubjectKey};

/// A declaration span's identity as recorded in a `Phrase`'s
/// `inflating_spans`. Spans are owned by their statement (`truth-ast`), not
/// by the phrase graph, so this holds a non-owning back-link plus the
/// boundary that disambiguates sibling declarations on the same statement
/// (`spec.md` §3 "Inflating span").
#[derive(Debug, Clone)]
pub struct InflatingSpan {
    pub statement: Weak<Statement>,
    pub boundary: ByteSpan,
}

impl InflatingSpan {
    pub fn new(statement: &Rc<Statement>, span: &Span) -> Self {
        InflatingSpan { statement: Rc::downgrade(statement), boundary: span.boundary }
    }

    fn same_span(&self, other: &InflatingSpan) -> bool {
        self.boundary == other.boundary && Weak::ptr_eq(&self.statement, &other.statement)
    }
}

/// One step of a spine: the subject a span contributes at this depth, and
/// the clarifiers (annotation term ids) of the statement that produced it
/// (`spec.md` §4.6 "Keying").
#[derive(Debug, Clone)]
pub struct SpineStep {
    pub subject: Subject,
    pub clarifiers: Vec<TermId>,
}

impl SpineStep {
    pub fn new(subject: Subject, clarifiers: Vec<TermId>) -> Self {
        SpineStep { subject, clarifiers }
    }
}

/// A node in the per-document phrase trie, representing a subject path of
/// length `length >= 0` (`spec.md` §3 "Phrase").
#[derive(Debug)]
pub struct Phrase {
    /// `self` for the root (`length == 0`), the owning parent otherwise.
    parent: Weak<Phrase>,
    pub terminal: Subject,
    pub length: usize,
    pub clarifiers: Vec<TermId>,
    pub clarifier_key: String,
    forwardings: RefCell<FxHashMap<(SubjectKey, String), Rc<Phrase>>>,
    inflating_spans: RefCell<Vec<InflatingSpan>>,
    pub is_hypothetical: bool,
}

impl Phrase {
    /// Builds the zero-length root phrase of a fresh document (`spec.md`
    /// §3: "A root Phrase (zero-length) whose `forwardings` map roots the
    /// document's phrase trie").
    pub fn root() -> Rc<Phrase> {
        Rc::new_cyclic(|weak| Phrase {
            parent: weak.clone(),
            terminal: Subject::Void,
            length: 0,
            clarifiers: Vec::new(),
            clarifier_key: String::new(),
            forwardings: RefCell::new(FxHashMap::default()),
            inflating_spans: RefCell::new(Vec::new()),
            is_hypothetical: false,
        })
    }

    /// The owning parent, or `Some(self)` for the root. `None` only if the
    /// tree's ownership chain above this node has already been dropped,
    /// which does not happen while any `Rc<Phrase>` to this node is held
    /// (invariant (b), `spec.md` §3).
    pub fn parent(&self) -> Option<Rc<Phrase>> {
        self.parent.upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.length == 0
    }

    pub fn inflating_span_count(&self) -> usize {
        self.inflating_spans.borrow().len()
    }

    pub fn is_disposed(&self) -> bool {
        !self.is_hypothetical && !self.is_root() && self.inflating_spans.borrow().is_empty()
    }

    /// All phrases this document has keyed by `subject`, regardless of
    /// clarifier (`spec.md` §4.6 "Lookup": `peek(subject)`). More than one
    /// result means `subject` is a homograph at this depth.
    pub fn peek(&self, subject: &Subject) -> Vec<Rc<Phrase>> {
        let key = SubjectKey::of(subject);
        self.forwardings
            .borrow()
            .iter()
            .filter(|((k, _), child)| *k == key && &child.terminal == subject)
            .map(|(_, child)| Rc::clone(child))
            .collect()
    }

    /// The single phrase keyed by `(subject, clarifier_key)`, if any
    /// (`spec.md` §4.6 "Lookup": `peek(subject, clarifier_key)`).
    pub fn peek_with_clarifier(&self, subject: &Subject, clarifier_key: &str) -> Option<Rc<Phrase>> {
        let key = (SubjectKey::of(subject), clarifier_key.to_string());
        self.forwardings.borrow().get(&key).filter(|child| &child.terminal == subject).cloned()
    }

    /// Every direct child of this phrase, regardless of subject or
    /// clarifier. Used by `truth-program`'s root-types query, which asks
    /// for the distinct subjects declared directly under a document's root
    /// rather than for one subject in particular.
    pub fn children(&self) -> Vec<Rc<Phrase>> {
        self.forwardings.borrow().values().cloned().collect()
    }

    /// Returns the existing child keyed by `(subject, clarifier_key)`, or
    /// creates and registers a new one.
    fn get_or_create_child(self: &Rc<Phrase>, subject: Subject, clarifiers: Vec<TermId>) -> Rc<Phrase> {
        let ck = clarifier_key(&clarifiers);
        if let Some(existing) = self.peek_with_clarifier(&subject, &ck) {
            return existing;
        }
        let child = Rc::new(Phrase {
            parent: Rc::downgrade(self),
            length: self.length + 1,
            clarifier_key: ck.clone(),
            clarifiers,
            terminal: subject,
            forwardings: RefCell::new(FxHashMap::default()),
            inflating_spans: RefCell::new(Vec::new()),
            is_hypothetical: false,
        });
        self.forwardings.borrow_mut().insert((SubjectKey::of(&child.terminal), ck), Rc::clone(&child));
        child
    }

    /// A transient phrase synthesized during lookup, never registered in a
    /// parent's forwardings (`spec.md` §4.6 "Lookup", §9 "Hypothetical
    /// phrases").
    fn hypothetical_child(self: &Rc<Phrase>, subject: Subject, clarifiers: Vec<TermId>) -> Rc<Phrase> {
        let ck = clarifier_key(&clarifiers);
        Rc::new(Phrase {
            parent: Rc::downgrade(self),
            length: self.length + 1,
            clarifier_key: ck,
            clarifiers,
            terminal: subject,
            forwardings: RefCell::new(FxHashMap::default()),
            inflating_spans: RefCell::new(Vec::new()),
            is_hypothetical: true,
        })
    }

    /// Walks `spine` from `root`, creating any missing nodes, and pushes
    /// `inflating_span` into every visited node's `inflating_spans`
    /// (`spec.md` §4.6 "Inflation"). Returns the leaf phrase.
    pub fn inflate_spine(root: &Rc<Phrase>, spine: &[SpineStep], inflating_span: InflatingSpan) -> Rc<Phrase> {
        let mut current = Rc::clone(root);
        for step in spine {
            current = current.get_or_create_child(step.subject.clone(), step.clarifiers.clone());
            current.inflating_spans.borrow_mut().push(inflating_span.clone());
        }
        current
    }

    /// Walks `spine` from `root`, removing `inflating_span` from every
    /// visited node, and disposes (removes from the parent's forwardings)
    /// any node whose `inflating_spans` becomes empty, leaf-first
    /// (`spec.md` §4.6 "Deflation").
    pub fn deflate_spine(root: &Rc<Phrase>, spine: &[SpineStep], inflating_span: &InflatingSpan) {
        let mut path: Vec<Rc<Phrase>> = Vec::with_capacity(spine.len());
        let mut current = Rc::clone(root);
        for step in spine {
            let Some(child) = current.peek_with_clarifier(&step.subject, &clarifier_key(&step.clarifiers)) else {
                tracing::debug!("deflate_spine: spine diverges from the trie, stopping early");
                return;
            };
            path.push(Rc::clone(&child));
            current = child;
        }
        for phrase in path.into_iter().rev() {
            {
                let mut spans = phrase.inflating_spans.borrow_mut();
                if let Some(pos) = spans.iter().position(|s| s.same_span(inflating_span)) {
                    spans.remove(pos);
                }
            }
            if phrase.inflating_spans.borrow().is_empty() {
                if let Some(parent) = phrase.parent() {
                    if !Rc::ptr_eq(&parent, &phrase) {
                        let key = (SubjectKey::of(&phrase.terminal), phrase.clarifier_key.clone());
                        parent.forwardings.borrow_mut().remove(&key);
                    }
                }
            } else {
                // An ancestor phrase still has other spans (or other
                // descendants) keeping it alive; nothing further up needs
                // disposing.
                break;
            }
        }
    }

    /// `spec.md` §4.6 "Lookup": the single-path form of
    /// `from_path_components`. `None` if any step is ambiguous (`peek`
    /// returns more than one match); a `clarifier_key_hint` narrows the
    /// first step instead of requiring it to be unambiguous on its own.
    pub fn from_path_components_single(
        root: &Rc<Phrase>,
        path: &[Subject],
        clarifier_key_hint: Option<&str>,
    ) -> Option<Rc<Phrase>> {
        let mut current = Rc::clone(root);
        for (i, subject) in path.iter().enumerate() {
            let resolved = if i == 0 {
                if let Some(ck) = clarifier_key_hint {
                    current.peek_with_clarifier(subject, ck)
                } else {
                    only_match(current.peek(subject))?
                }
            } else {
                only_match(current.peek(subject))?
            };
            current = match resolved {
                Some(found) => found,
                None => current.hypothetical_child(subject.clone(), Vec::new()),
            };
        }
        Some(current)
    }

    /// `spec.md` §4.6 "Lookup": the multi-path (possibly ambiguous) form of
    /// `from_path_components`. Returns every phrase reachable by `path`,
    /// branching at any depth where `peek` returns more than one match.
    pub fn from_path_components_multi(root: &Rc<Phrase>, path: &[Subject]) -> Vec<Rc<Phrase>> {
        let mut frontier = vec![Rc::clone(root)];
        for subject in path {
            let mut next = Vec::new();
            for phrase in &frontier {
                let matches = phrase.peek(subject);
                if matches.is_empty() {
                    next.push(phrase.hypothetical_child(subject.clone(), Vec::new()));
                } else {
                    next.extend(matches);
                }
            }
            frontier = next;
        }
        frontier
    }
}

fn only_match(mut matches: Vec<Rc<Phrase>>) -> Option<Option<Rc<Phrase>>> {
    match matches.len() {
        0 => Some(None),
        1 => Some(Some(matches.remove(0))),
        _ => None,
    }
}

/// A directed edge from a phrase along one of its clarifiers to candidate
/// resolved phrases in ancestor or dependent scopes (`spec.md` §4.6
/// "Outbounds (forks)", GLOSSARY "Fork / Outbound").
#[derive(Debug)]
pub struct Fork {
    pub origin: Rc<Phrase>,
    pub via: TermId,
    pub successors: Vec<Rc<Phrase>>,
}

/// Computes the outbound forks of `phrase`: for every clarifier term on it,
/// collect candidate successors from `peek(term)` across each ancestor of
/// `phrase` (reversed, nearest first) and across `dependency_roots` (the
/// root phrases of every document in the transitive dependency closure).
pub fn compute_forks(phrase: &Rc<Phrase>, dependency_roots: &[Rc<Phrase>]) -> Vec<Fork> {
    if phrase.is_hypothetical {
        return Vec::new();
    }
    let mut ancestors = Vec::new();
    let mut cursor = phrase.parent();
    while let Some(p) = cursor {
        if Rc::ptr_eq(&p, phrase) {
            break;
        }
        let is_root = p.is_root();
        ancestors.push(Rc::clone(&p));
        if is_root {
            break;
        }
        cursor = p.parent();
    }

    phrase
        .clarifiers
        .iter()
        .map(|&term| {
            let subject = Subject::term(term, false);
            let mut successors = Vec::new();
            for ancestor in &ancestors {
                successors.extend(ancestor.peek(&subject));
            }
            for root in dependency_roots {
                successors.extend(root.peek(&subject));
            }
            Fork { origin: Rc::clone(phrase), via: term, successors }
        })
        .collect()
}
