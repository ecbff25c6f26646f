//! Read side of the catalog: listings, pagination, navigation, lookups.

pub mod navigation;
pub mod service;

pub use navigation::SiblingNav;
pub use service::{CatalogService, Entries, PagedFilesQuery, TagListFilter};
