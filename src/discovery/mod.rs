//! Static API discovery documents.

pub mod catalog;

pub use catalog::{DiscoveryCatalog, DISCOVERY_CONTENT_TYPE};
