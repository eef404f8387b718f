//! Feature-Hashing Embedder
//!
//! Deterministic, model-free text embedding. Lower-cased alphanumeric
//! tokens, minus common stop words, and adjacent-token bigrams are hashed
//! (FNV-1a) into signed buckets and the result is L2-normalized. Texts that
//! share words land close together, which is enough to drive retrieval
//! when the real sentence model is not deployed.

use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::error::{BoxError, Error, Result};
use crate::vector::normalize_vector;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Bigrams count for less than single tokens
const BIGRAM_WEIGHT: f32 = 0.5;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "has",
    "have", "how", "i", "if", "in", "is", "it", "its", "my", "of", "on", "or", "the", "this", "to",
    "was", "what", "when", "where", "which", "who", "why", "with", "you", "your",
];

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Configuration {
                operation: "embedder",
                reason: "embedding dimension must be non-zero".to_string(),
            });
        }
        Ok(Self { dimension })
    }

    /// Embed a single text
    pub fn embed_one(&self, text: &str) -> std::result::Result<Vec<f32>, BoxError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(format!("no embeddable tokens in {:?}", text).into());
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in &tokens {
            self.accumulate(&mut vector, fnv1a(token.as_bytes()), 1.0);
        }
        for pair in tokens.windows(2) {
            let mut h = fnv1a(pair[0].as_bytes());
            h = fnv1a_extend(h, b" ");
            h = fnv1a_extend(h, pair[1].as_bytes());
            self.accumulate(&mut vector, h, BIGRAM_WEIGHT);
        }

        // Opposite-signed collisions can cancel out completely
        if vector.iter().all(|x| *x == 0.0) {
            return Err(format!("degenerate embedding for {:?}", text).into());
        }
        normalize_vector(&mut vector);
        Ok(vector)
    }

    fn accumulate(&self, vector: &mut [f32], hash: u64, weight: f32) {
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, BoxError> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    fnv1a_extend(FNV_OFFSET, bytes)
}

fn fnv1a_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
