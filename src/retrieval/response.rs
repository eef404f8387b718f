//! Orchestrator Responses

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::providers::Availability;
use crate::vector::SearchResult;

/// Ranked knowledge for one query string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
}

impl QueryResponse {
    /// (score, text) pairs, best first
    pub fn answers(&self) -> impl Iterator<Item = (f32, &str)> + '_ {
        self.results
            .iter()
            .map(|r| (r.score, r.record.text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// What the caller should do with a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Confident label, advice retrieved
    ProvideAdvice,
    /// Label too uncertain to act on
    RequestBetterImage,
}

/// Result of `analyze_and_query`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAnalysis {
    pub label: String,
    pub confidence: f32,
    pub action: Action,
    /// Present only for `Action::ProvideAdvice`
    pub advice: Option<QueryResponse>,
}

/// Result of `query_from_audio`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioResponse {
    pub transcription: String,
    pub response: QueryResponse,
}

/// One classified image in the session history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub input: String,
    pub label: String,
    pub confidence: f32,
    pub action: Action,
    pub at: DateTime<Utc>,
}

/// Current state of the optional adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub vision: Availability,
    pub speech: Availability,
}
