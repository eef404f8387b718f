//! CROPDOC - Crop-Health Knowledge Retrieval
//!
//! An in-memory vector store with exact cosine search and versioned
//! snapshots, seeded from a built-in crop-health catalog, behind an
//! orchestrator that answers text, image-label and speech queries.

pub mod config;
pub mod error;
pub mod knowledge;
pub mod metrics;
pub mod persistence;
pub mod providers;
pub mod retrieval;
pub mod vector;

pub use config::Config;
pub use error::{BoxError, Error, Result};
pub use knowledge::{bootstrap, BootstrapOutcome, CatalogEntry, CATALOG};
pub use metrics::Metrics;
pub use providers::{
    Availability, Capability, Classification, EmbeddingProvider, HashingEmbedder, MediaInput,
    SpeechAdapter, VisionAdapter,
};
pub use retrieval::{Action, AudioResponse, ImageAnalysis, Orchestrator, QueryResponse};
pub use vector::{MetadataValue, Record, SearchResult, VectorStore};
