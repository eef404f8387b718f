//! Model Providers
//!
//! Interfaces to the external models the retrieval core depends on: text
//! embedding, image classification and speech transcription. Each is a
//! black box injected into the orchestrator at construction.

mod hashing;
mod precomputed;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::{self, BoxError, Error};

pub use hashing::HashingEmbedder;
pub use precomputed::{PrecomputedClassifier, PrecomputedTranscript};

/// Maps text to L2-normalized vectors of a fixed width
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Width of every vector this provider returns
    fn dimension(&self) -> usize;

    /// One vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BoxError>;
}

/// Image classifier
#[async_trait]
pub trait VisionAdapter: Send + Sync {
    fn availability(&self) -> Availability {
        Availability::Ready
    }

    async fn classify(&self, image: &MediaInput) -> Result<Classification, BoxError>;
}

/// Speech-to-text model
#[async_trait]
pub trait SpeechAdapter: Send + Sync {
    fn availability(&self) -> Availability {
        Availability::Ready
    }

    async fn transcribe(&self, audio: &MediaInput) -> Result<String, BoxError>;
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    /// In [0, 1]
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Whether an adapter can currently serve requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Ready,
    Unavailable { reason: String },
}

impl Availability {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready)
    }
}

/// Optional model-backed capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Vision,
    Speech,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Vision => write!(f, "vision"),
            Capability::Speech => write!(f, "speech"),
        }
    }
}

/// An image or audio clip handed to an adapter
#[derive(Debug, Clone)]
pub enum MediaInput {
    /// File on disk
    Path(PathBuf),
    /// In-memory upload
    Bytes { name: String, data: Bytes },
}

impl MediaInput {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        MediaInput::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        MediaInput::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Identifier recorded in session history
    pub fn reference(&self) -> String {
        match self {
            MediaInput::Path(path) => path.display().to_string(),
            MediaInput::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaInput::Path(path) => Some(path.as_path()),
            MediaInput::Bytes { .. } => None,
        }
    }
}

/// Run a collaborator call, failing with `Error::Timeout` once `limit` passes.
///
/// Dropping the future cancels the call; nothing here touches the store.
pub(crate) async fn bounded<F, T>(operation: &'static str, limit: Option<Duration>, call: F) -> error::Result<T>
where
    F: Future<Output = T>,
{
    match limit {
        Some(after) => tokio::time::timeout(after, call)
            .await
            .map_err(|_| Error::Timeout { operation, after }),
        None => Ok(call.await),
    }
}

/// Embed `texts`, checking the provider returned one vector per text.
pub(crate) async fn embed_texts(
    embedder: &dyn EmbeddingProvider,
    operation: &'static str,
    texts: &[String],
    limit: Option<Duration>,
) -> error::Result<Vec<Vec<f32>>> {
    let vectors = bounded(operation, limit, embedder.embed(texts))
        .await?
        .map_err(|source| Error::Embedding { operation, source })?;

    if vectors.len() != texts.len() {
        return Err(Error::Embedding {
            operation,
            source: format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )
            .into(),
        });
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl EmbeddingProvider for Stalled {
        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, BoxError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    struct ShortChanged;

    #[async_trait]
    impl EmbeddingProvider for ShortChanged {
        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, BoxError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    #[tokio::test]
    async fn test_embed_timeout() {
        let texts = vec!["late blight".to_string()];
        let err = embed_texts(&Stalled, "query_text", &texts, Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { operation: "query_text", .. }));
    }

    #[tokio::test]
    async fn test_embed_count_checked() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embed_texts(&ShortChanged, "seed", &texts, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding { operation: "seed", .. }));
    }

    #[test]
    fn test_media_reference() {
        let file = MediaInput::from_path("/tmp/leaf.jpg");
        assert_eq!(file.reference(), "/tmp/leaf.jpg");
        assert!(file.path().is_some());

        let upload = MediaInput::from_bytes("upload.wav", Bytes::from_static(b"RIFF"));
        assert_eq!(upload.reference(), "upload.wav");
        assert!(upload.path().is_none());
    }

    #[test]
    fn test_availability() {
        assert!(Availability::Ready.is_ready());
        let down = Availability::unavailable("model file missing");
        assert!(!down.is_ready());
        assert_eq!(
            serde_json::to_value(&down).unwrap(),
            serde_json::json!({"status": "unavailable", "reason": "model file missing"})
        );
    }
}
