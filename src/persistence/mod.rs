//! Persistence Module
//!
//! Snapshot files for durable knowledge bases.

pub mod snapshot;

pub use snapshot::{SnapshotData, SNAPSHOT_VERSION};
