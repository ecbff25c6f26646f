//! Shared value types.

pub mod pagination;
pub mod range;

pub use pagination::{Cursor, Page};
pub use range::{ByteRange, ResolvedRange};
