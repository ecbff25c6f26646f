//! Folder hierarchy traversal.

pub mod tree;

pub use tree::FolderTree;
