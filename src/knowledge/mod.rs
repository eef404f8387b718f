//! Knowledge Base
//!
//! Built-in crop-health catalog and the bootstrap that seeds it.

mod bootstrap;
mod catalog;

pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use catalog::{CatalogEntry, CATALOG};
