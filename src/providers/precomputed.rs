//! Precomputed Adapters
//!
//! Vision and speech adapters that hand back a result produced elsewhere,
//! e.g. by a classifier or transcriber running out of process.

use async_trait::async_trait;

use super::{Classification, MediaInput, SpeechAdapter, VisionAdapter};
use crate::error::BoxError;

/// Returns a fixed classification for any image
#[derive(Debug, Clone)]
pub struct PrecomputedClassifier {
    result: Classification,
}

impl PrecomputedClassifier {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            result: Classification::new(label, confidence),
        }
    }
}

#[async_trait]
impl VisionAdapter for PrecomputedClassifier {
    async fn classify(&self, _image: &MediaInput) -> Result<Classification, BoxError> {
        if !(0.0..=1.0).contains(&self.result.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.result.confidence).into());
        }
        Ok(self.result.clone())
    }
}

/// Returns a fixed transcript for any audio clip
#[derive(Debug, Clone)]
pub struct PrecomputedTranscript {
    text: String,
}

impl PrecomputedTranscript {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl SpeechAdapter for PrecomputedTranscript {
    async fn transcribe(&self, _audio: &MediaInput) -> Result<String, BoxError> {
        if self.text.trim().is_empty() {
            return Err("transcript is empty".into());
        }
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_precomputed_classifier() {
        let vision = PrecomputedClassifier::new("Tomato_Late_blight", 0.82);
        assert!(vision.availability().is_ready());
        let result = vision
            .classify(&MediaInput::from_path("leaf.jpg"))
            .await
            .unwrap();
        assert_eq!(result, Classification::new("Tomato_Late_blight", 0.82));

        let bogus = PrecomputedClassifier::new("x", 1.5);
        assert!(bogus.availability().is_ready());
        let err = bogus
            .classify(&MediaInput::from_path("leaf.jpg"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[tokio::test]
    async fn test_precomputed_transcript() {
        let audio = MediaInput::from_path("q.wav");
        let speech = PrecomputedTranscript::new("how to treat aphids");
        assert_eq!(speech.transcribe(&audio).await.unwrap(), "how to treat aphids");

        let silent = PrecomputedTranscript::new("   ");
        assert!(silent.transcribe(&audio).await.is_err());
    }
}
