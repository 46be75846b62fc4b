//! Programmer-error types for the Truth front end.
//!
//! `spec.md` §7 distinguishes two failure classes: user-facing faults
//! (catalogued in `truth-diagnostics-codes`, never thrown) and programmer
//! errors — contract violations that fail fast and never mutate state. This
//! crate covers the latter.

use thiserror::Error;

/// A contract violation: the caller used an API outside of its documented
/// preconditions. These never appear in a document's fault set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// `edit()` was called while another edit transaction on the same
    /// document was still in progress (`spec.md` §4.5, §5).
    #[error("edit transaction already in progress on this document")]
    DoubleTransaction,

    /// A mutator method (`delete`/`insert`/`update`) was invoked outside of
    /// an active `edit()` transaction.
    #[error("mutation attempted outside of an edit transaction")]
    NotInEdit,

    /// `Document::update_uri` was asked to assign a URI already bound to a
    /// different document in the owning `Program`.
    #[error("uri is already assigned to another document: {uri}")]
    UriAlreadyInUse { uri: String },

    /// A navigation helper received an argument that cannot be represented,
    /// e.g. a negative line index.
    #[error("invalid argument to navigation helper: {reason}")]
    InvalidNavigationArgument { reason: String },
}

/// Result alias for fallible internal operations that can only fail with a
/// [`ContractError`].
pub type ContractResult<T> = Result<T, ContractError>;

/// Budget limits bounding parser/pattern-sub-parser work on adversarial
/// input, the way `ParseBudget` bounds the teacher's statement parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBudget {
    /// Maximum nesting depth for regex groups within one pattern.
    pub max_group_depth: usize,
    /// Maximum number of faults to collect for a single statement before
    /// giving up on further validation passes.
    pub max_faults_per_statement: usize,
}

impl Default for ParseBudget {
    fn default() -> Self {
        Self { max_group_depth: 64, max_faults_per_statement: 64 }
    }
}

impl ParseBudget {
    /// A strict budget suitable for parsing untrusted input.
    pub fn strict() -> Self {
        Self { max_group_depth: 16, max_faults_per_statement: 16 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_generous() {
        let budget = ParseBudget::default();
        assert!(budget.max_group_depth >= 16);
    }

    #[test]
    fn contract_error_messages_are_stable() {
        assert_eq!(
            ContractError::DoubleTransaction.to_string(),
            "edit transaction already in progress on this document"
        );
    }
}
