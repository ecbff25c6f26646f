//! File domain entities.

pub mod category;
pub mod model;
pub mod status;

pub use category::Category;
pub use model::{File, FileWithTags, NewFile};
pub use status::FileStatus;
