//! Vector Module
//!
//! Knowledge records, similarity math and the in-memory vector store.

mod record;
mod similarity;
mod store;

pub use record::{MetadataValue, Record, SearchResult};
pub use similarity::{cosine_similarity, dot_product, magnitude, normalize_vector, normalized};
pub use store::{VectorEntry, VectorStore};
