//! Transaction classification: does a recorded call batch qualify for a fast
//! path, or does it need the general invalidation-scope computation
//! (`spec.md` §4.5).

use crate::mutator::MutatorCall;

/// The uniform shape of a call batch, checked before any fast path is
/// attempted: "no mixed delete/insert/update" (`spec.md` §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    PureUpdate,
    PureDelete,
    PureInsert,
    Mixed,
    Empty,
}

pub fn call_shape(calls: &[MutatorCall]) -> CallShape {
    let mut has_update = false;
    let mut has_delete = false;
    let mut has_insert = false;
    for call in calls {
        match call {
            MutatorCall::Update { .. } => has_update = true,
            MutatorCall::Delete { .. } => has_delete = true,
            MutatorCall::Insert { .. } => has_insert = true,
        }
    }
    match (has_update, has_delete, has_insert) {
        (false, false, false) => CallShape::Empty,
        (true, false, false) => CallShape::PureUpdate,
        (false, true, false) => CallShape::PureDelete,
        (false, false, true) => CallShape::PureInsert,
        _ => CallShape::Mixed,
    }
}

/// Sorts update calls by `at` ascending, dropping overrides on the same
/// index and keeping the last one recorded (`spec.md` §4.5 fast path 1).
pub fn dedup_updates_by_index(calls: &[MutatorCall]) -> Vec<MutatorCall> {
    let mut by_index: Vec<(usize, MutatorCall)> = Vec::new();
    for call in calls {
        let at = call.at();
        if let Some(existing) = by_index.iter_mut().find(|(i, _)| *i == at) {
            existing.1 = call.clone();
        } else {
            by_index.push((at, call.clone()));
        }
    }
    by_index.sort_by_key(|(i, _)| *i);
    by_index.into_iter().map(|(_, call)| call).collect()
}
