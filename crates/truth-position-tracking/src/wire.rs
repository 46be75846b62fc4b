//! Wire-friendly position/range types for passing fault locations to a host
//! process (serialized with `serde`, never used internally).

use serde::{Deserialize, Serialize};

use crate::ByteSpan;

/// A 1-based `(line, column)` pair, matching `spec.md` §6's
/// `Line <1-based>, Col <startCol>-<endCol>` fault rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub line: u32,
    pub column: u32,
}

/// A wire-serializable range, inclusive on both ends to match the fault
/// rendering convention in `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRange {
    pub start: WirePosition,
    pub end: WirePosition,
}

impl WireRange {
    /// Builds a range from a 1-based line and a statement-local [`ByteSpan`].
    pub fn from_span(line: u32, span: ByteSpan) -> Self {
        let (start_col, end_col) = span.to_fault_range();
        WireRange {
            start: WirePosition { line, column: start_col as u32 },
            end: WirePosition { line, column: end_col as u32 },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.line == self.end.line && self.start.column == self.end.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_span_uses_one_based_columns() {
        let range = WireRange::from_span(3, ByteSpan::new(2, 5));
        assert_eq!(range.start.column, 3);
        assert_eq!(range.end.column, 6);
        assert_eq!(range.start.line, 3);
    }
}
