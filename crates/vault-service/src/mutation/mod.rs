//! State transitions on folders, files, and tags.

pub mod entries;
pub mod folders;
pub mod outcome;
pub mod service;
pub mod tags;

pub use folders::FolderDeletion;
pub use outcome::{BatchOutcome, ItemFailure};
pub use service::MutationService;
pub use tags::TagDeleteMode;
