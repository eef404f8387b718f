//! Retrieval Module
//!
//! Multimodal query orchestration over the knowledge base.

mod orchestrator;
mod response;

pub use orchestrator::{advice_query, Orchestrator};
pub use response::{Action, AnalysisRecord, AudioResponse, Capabilities, ImageAnalysis, QueryResponse};
