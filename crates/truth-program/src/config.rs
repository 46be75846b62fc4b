//! `ProgramConfig`: the small set of knobs a host picks when constructing a
//! [`crate::Program`] (`spec.md` §9 "Global program state": "there is no
//! process-wide mutable state; each `Program` instance owns its documents").

use truth_error::ParseBudget;

/// Construction-time configuration for a [`crate::Program`]. There is no
/// on-disk config file to load this from (the spec carries no persistent
/// index), so this is plain in-process data, `Default`-constructed the way
/// `ParseBudget` is.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Budget passed to every statement parse this program performs.
    pub parse_budget: ParseBudget,
    /// Initial capacity hint for the per-program term interner.
    pub initial_term_capacity: usize,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        ProgramConfig { parse_budget: ParseBudget::default(), initial_term_capacity: 256 }
    }
}
