//! Edit transaction engine: mutator recording, fast-path classification,
//! invalidation-scope computation, invalidate/revalidate pairing (`spec.md`
//! §4.5 "Edit Transactions").

mod atomic;
mod classify;
mod engine;
mod events;
mod mutator;
mod spine;

pub use atomic::{edit_atomic, RangeEdit};
pub use classify::{call_shape, dedup_updates_by_index, CallShape};
pub use engine::edit;
pub use events::{EditOutcome, InvalidationSet};
pub use mutator::{Mutator, MutatorCall};
pub use spine::{clarifiers_of, spines_for_span, spines_for_statement};
