//! Per-program term interning (`spec.md` §9: "Shared interning of `Term` is
//! per-program").

use rustc_hash::FxHashMap;

/// Identity of an interned term. Two terms with the same spelling always
/// share the same id within one [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

/// A string-to-id table scoped to a single program. Interning is
/// append-only: terms are never evicted, since a `TermId` may be held by
/// phrases and fault messages for the program's lifetime.
#[derive(Debug, Default)]
pub struct Interner {
    ids: FxHashMap<String, TermId>,
    spellings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Interner::default()
    }

    /// Pre-sizes the backing tables for programs that can estimate their
    /// term count up front (`truth-program`'s `ProgramConfig`).
    pub fn with_capacity(capacity: usize) -> Self {
        Interner { ids: FxHashMap::with_capacity_and_hasher(capacity, Default::default()), spellings: Vec::with_capacity(capacity) }
    }

    /// Returns the id for `spelling`, interning it if this is the first
    /// occurrence.
    pub fn intern(&mut self, spelling: &str) -> TermId {
        if let Some(&id) = self.ids.get(spelling) {
            return id;
        }
        let id = TermId(self.spellings.len() as u32);
        self.spellings.push(spelling.to_string());
        self.ids.insert(spelling.to_string(), id);
        id
    }

    /// Looks up an already-interned term without creating one.
    pub fn lookup(&self, spelling: &str) -> Option<TermId> {
        self.ids.get(spelling).copied()
    }

    /// The original spelling for an id. Panics only if `id` was never
    /// produced by this interner, which callers treat as a logic error.
    pub fn spelling(&self, id: TermId) -> &str {
        &self.spellings[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.spellings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spellings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_spelling_interns_to_the_same_id() {
        let mut interner = Interner::new();
        let a = interner.intern("Number");
        let b = interner.intern("Number");
        assert_eq!(a, b);
    }

    #[test]
    fn different_spellings_get_different_ids() {
        let mut interner = Interner::new();
        let a = interner.intern("Number");
        let b = interner.intern("String");
        assert_ne!(a, b);
    }

    #[test]
    fn spelling_round_trips_through_interning() {
        let mut interner = Interner::new();
        let id = interner.intern("Positive");
        assert_eq!(interner.spelling(id), "Positive");
    }

    #[test]
    fn lookup_does_not_intern_unknown_spellings() {
        let interner = Interner::new();
        assert_eq!(interner.lookup("Unknown"), None);
    }
}
