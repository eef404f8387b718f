//! Retrieval Orchestrator
//!
//! Turns text, image classifications and speech into ranked knowledge.
//! Collaborator errors are never retried or masked; each surfaces as its
//! own `Error` variant so the caller can decide what to do.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::response::{Action, AnalysisRecord, AudioResponse, Capabilities, ImageAnalysis, QueryResponse};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::providers::{
    bounded, embed_texts, Availability, Capability, EmbeddingProvider, MediaInput, SpeechAdapter,
    VisionAdapter,
};
use crate::vector::VectorStore;

/// Routes queries of every modality into the vector store
pub struct Orchestrator {
    store: VectorStore,
    embedder: Arc<dyn EmbeddingProvider>,
    vision: Option<Arc<dyn VisionAdapter>>,
    speech: Option<Arc<dyn SpeechAdapter>>,
    config: Config,
    /// Append-only; never pruned
    history: Mutex<Vec<AnalysisRecord>>,
    metrics: Metrics,
}

impl Orchestrator {
    /// Fails with `DimensionMismatch` when the embedder or a populated store
    /// disagrees with `config.embedding_dimension`.
    pub fn new(store: VectorStore, embedder: Arc<dyn EmbeddingProvider>, config: Config) -> Result<Self> {
        let expected = config.embedding_dimension;
        for actual in [Some(embedder.dimension()), store.dimension()].into_iter().flatten() {
            if actual != expected {
                return Err(Error::DimensionMismatch {
                    operation: "orchestrator",
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            store,
            embedder,
            vision: None,
            speech: None,
            config,
            history: Mutex::new(Vec::new()),
            metrics: Metrics::new(),
        })
    }

    pub fn with_vision(mut self, vision: Arc<dyn VisionAdapter>) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechAdapter>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Ordered copy of every image analysis so far
    pub fn history(&self) -> Vec<AnalysisRecord> {
        self.history.lock().clone()
    }

    /// Which optional adapters can serve requests right now
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            vision: match self.vision_adapter() {
                Ok(_) => Availability::Ready,
                Err(e) => Availability::unavailable(unavailable_reason(e)),
            },
            speech: match self.speech_adapter() {
                Ok(_) => Availability::Ready,
                Err(e) => Availability::unavailable(unavailable_reason(e)),
            },
        }
    }

    /// Embed `text` and return the `top_k` closest records
    pub async fn query_text(&self, text: &str, top_k: usize) -> Result<QueryResponse> {
        self.observe("query_text", self.retrieve("query_text", text, top_k))
            .await
    }

    /// `query_text` with the configured result count
    pub async fn query(&self, text: &str) -> Result<QueryResponse> {
        self.query_text(text, self.config.text_top_k).await
    }

    /// Classify an image and, when the label is confident enough, retrieve
    /// advice for it. Low-confidence labels never reach the store.
    pub async fn analyze_and_query(&self, image: &MediaInput) -> Result<ImageAnalysis> {
        self.observe("analyze_and_query", self.analyze(image)).await
    }

    /// Transcribe audio and run the transcript as a text query
    pub async fn query_from_audio(&self, audio: &MediaInput) -> Result<AudioResponse> {
        self.observe("query_from_audio", self.listen(audio)).await
    }

    fn vision_adapter(&self) -> Result<&Arc<dyn VisionAdapter>> {
        let vision = self
            .vision
            .as_ref()
            .ok_or_else(|| not_configured(Capability::Vision))?;
        check(Capability::Vision, vision.availability())?;
        Ok(vision)
    }

    fn speech_adapter(&self) -> Result<&Arc<dyn SpeechAdapter>> {
        let speech = self
            .speech
            .as_ref()
            .ok_or_else(|| not_configured(Capability::Speech))?;
        check(Capability::Speech, speech.availability())?;
        Ok(speech)
    }

    async fn analyze(&self, image: &MediaInput) -> Result<ImageAnalysis> {
        let vision = self.vision_adapter()?;

        let classification = bounded("classify", self.config.call_timeout, vision.classify(image))
            .await?
            .map_err(|source| Error::Classification { source })?;

        let action = if classification.confidence > self.config.confidence_threshold {
            Action::ProvideAdvice
        } else {
            Action::RequestBetterImage
        };

        self.history.lock().push(AnalysisRecord {
            input: image.reference(),
            label: classification.label.clone(),
            confidence: classification.confidence,
            action,
            at: Utc::now(),
        });
        debug!(
            input = %image.reference(),
            label = %classification.label,
            confidence = classification.confidence,
            ?action,
            "image classified"
        );

        let advice = match action {
            Action::ProvideAdvice => {
                let query = advice_query(&classification.label);
                Some(
                    self.retrieve("analyze_and_query", &query, self.config.advice_top_k)
                        .await?,
                )
            }
            Action::RequestBetterImage => None,
        };

        Ok(ImageAnalysis {
            label: classification.label,
            confidence: classification.confidence,
            action,
            advice,
        })
    }

    async fn listen(&self, audio: &MediaInput) -> Result<AudioResponse> {
        let speech = self.speech_adapter()?;

        let transcription = bounded("transcribe", self.config.call_timeout, speech.transcribe(audio))
            .await?
            .map_err(|source| Error::Transcription { source })?;
        debug!(input = %audio.reference(), %transcription, "audio transcribed");

        let response = self
            .retrieve("query_from_audio", &transcription, self.config.text_top_k)
            .await?;
        Ok(AudioResponse {
            transcription,
            response,
        })
    }

    async fn retrieve(&self, operation: &'static str, text: &str, top_k: usize) -> Result<QueryResponse> {
        if text.trim().is_empty() {
            return Err(Error::Embedding {
                operation,
                source: "query text is empty".into(),
            });
        }

        let texts = [text.to_string()];
        let mut vectors = embed_texts(&*self.embedder, operation, &texts, self.config.call_timeout).await?;
        let query_vector = vectors.pop().unwrap_or_default();

        let results = self.store.search(&query_vector, top_k)?;
        Ok(QueryResponse {
            query: text.to_string(),
            results,
        })
    }

    /// Time an operation, record it, and log failures
    async fn observe<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed = started.elapsed();
        self.metrics.record(operation, elapsed, result.is_ok());

        match &result {
            Ok(_) => info!(operation, elapsed_us = elapsed.as_micros() as u64, "retrieval complete"),
            Err(e) => warn!(operation, error = %e, "retrieval failed"),
        }
        result
    }
}

fn check(capability: Capability, availability: Availability) -> Result<()> {
    match availability {
        Availability::Ready => Ok(()),
        Availability::Unavailable { reason } => Err(Error::Unavailable { capability, reason }),
    }
}

fn unavailable_reason(error: Error) -> String {
    match error {
        Error::Unavailable { reason, .. } => reason,
        other => other.to_string(),
    }
}

fn not_configured(capability: Capability) -> Error {
    Error::Unavailable {
        capability,
        reason: format!("no {} adapter configured", capability),
    }
}

/// Question used to look up treatment for a classifier label
pub fn advice_query(label: &str) -> String {
    let name: Vec<&str> = label.split('_').filter(|s| !s.is_empty()).collect();
    format!("What is {} and how do I treat it?", name.join(" "))
}
