//! Tag domain entities.

pub mod model;
pub mod status;

pub use model::{Tag, TagSummary, TagWithUsage, DEFAULT_TAG_COLOR};
pub use status::TagStatus;
