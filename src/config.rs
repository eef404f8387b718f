//! Configuration

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration shared by the store, bootstrapper and orchestrator
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot file for the knowledge base (None = in-memory only)
    pub snapshot_path: Option<PathBuf>,

    /// Output width of the embedding provider
    pub embedding_dimension: usize,

    /// Results returned for text and audio queries
    pub text_top_k: usize,

    /// Results returned for the advice query derived from an image label
    pub advice_top_k: usize,

    /// Classifier confidence above which advice is retrieved
    pub confidence_threshold: f32,

    /// Upper bound on any single collaborator call (None = unbounded)
    pub call_timeout: Option<Duration>,

    /// Texts per embedding call while seeding the knowledge base
    pub bootstrap_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: Some(PathBuf::from("./data/knowledge_base.snap")),
            embedding_dimension: 384, // all-MiniLM-L6-v2
            text_top_k: 3,
            advice_top_k: 2,
            confidence_threshold: 0.6,
            call_timeout: Some(Duration::from_secs(30)),
            bootstrap_batch_size: 8,
        }
    }
}

impl Config {
    /// Set the snapshot file
    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Keep the knowledge base in memory only
    pub fn without_persistence(mut self) -> Self {
        self.snapshot_path = None;
        self
    }

    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.embedding_dimension = dim;
        self
    }

    pub fn with_text_top_k(mut self, k: usize) -> Self {
        self.text_top_k = k;
        self
    }

    pub fn with_advice_top_k(mut self, k: usize) -> Self {
        self.advice_top_k = k;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the collaborator call timeout (None disables it)
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.bootstrap_batch_size = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.text_top_k, 3);
        assert_eq!(config.advice_top_k, 2);
        assert!((config.confidence_threshold - 0.6).abs() < f32::EPSILON);
        assert!(config.snapshot_path.is_some());
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .without_persistence()
            .with_dimension(8)
            .with_batch_size(0)
            .with_call_timeout(None);

        assert!(config.snapshot_path.is_none());
        assert_eq!(config.embedding_dimension, 8);
        assert_eq!(config.bootstrap_batch_size, 1);
        assert!(config.call_timeout.is_none());
    }
}
