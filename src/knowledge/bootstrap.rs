//! Knowledge Base Bootstrap
//!
//! Seeds an empty store from the catalog and persists it.
//!
//! Only an empty store is seeded. Once a snapshot holds entries, later
//! catalog changes never reach it; delete the snapshot to reseed.

use serde::Serialize;
use tracing::info;

use super::catalog::CatalogEntry;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::providers::{embed_texts, EmbeddingProvider};
use crate::vector::VectorStore;

/// What a bootstrap run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// Store already had entries
    Skipped { existing: usize },
    /// Catalog inserted; `persisted` is true when a snapshot was written
    Seeded { inserted: usize, persisted: bool },
}

/// Populate `store` from `catalog` if, and only if, it is empty.
///
/// The whole catalog is embedded before anything is inserted, then
/// committed under a single write lock, so an embedding failure leaves the
/// store untouched.
pub async fn bootstrap(
    store: &VectorStore,
    embedder: &dyn EmbeddingProvider,
    catalog: &[CatalogEntry],
    config: &Config,
) -> Result<BootstrapOutcome> {
    check_dimension(embedder, config)?;

    let existing = store.count();
    if existing > 0 {
        info!(existing, "knowledge base already populated, skipping bootstrap");
        return Ok(BootstrapOutcome::Skipped { existing });
    }

    let batch_size = config.bootstrap_batch_size.max(1);
    let mut items = Vec::with_capacity(catalog.len());
    for batch in catalog.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|e| e.text.to_string()).collect();
        let vectors = embed_texts(embedder, "bootstrap", &texts, config.call_timeout).await?;
        items.extend(vectors.into_iter().zip(batch.iter().map(CatalogEntry::to_record)));
    }

    let inserted = items.len();
    if !store.seed_if_empty(items)? {
        // Someone else populated the store while we were embedding
        let existing = store.count();
        info!(existing, "knowledge base populated concurrently, skipping bootstrap");
        return Ok(BootstrapOutcome::Skipped { existing });
    }

    let persisted = store.snapshot_path().is_some();
    if persisted {
        store.save(None)?;
    }

    info!(inserted, persisted, "knowledge base initialized");
    Ok(BootstrapOutcome::Seeded {
        inserted,
        persisted,
    })
}

fn check_dimension(embedder: &dyn EmbeddingProvider, config: &Config) -> Result<()> {
    if embedder.dimension() != config.embedding_dimension {
        return Err(Error::DimensionMismatch {
            operation: "bootstrap",
            expected: config.embedding_dimension,
            actual: embedder.dimension(),
        });
    }
    Ok(())
}
