//! Byte-span and line/column position tracking for the Truth front end.

mod convert;
mod line_index;
mod span;
mod wire;

pub use convert::{byte_offset_to_utf16_column, utf16_column_to_byte_offset};
pub use line_index::LineIndex;
pub use span::ByteSpan;
pub use wire::{WirePosition, WireRange};
