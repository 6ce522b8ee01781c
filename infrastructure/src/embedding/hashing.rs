//! Feature-hashing embedder.
//!
//! Maps text to a fixed-length vector by hashing terms into buckets and
//! weighting them by frequency. Deterministic and local, so mining works
//! without an embedding service; similar wording lands close together,
//! paraphrases do not.

use async_trait::async_trait;
use concord_application::{EmbeddingGateway, GatewayError};
use std::collections::BTreeMap;

pub const DEFAULT_DIMENSIONS: usize = 256;

pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    /// A zero dimension is bumped to one.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// FNV-1a bucket of a term
    fn bucket(&self, term: &str) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % self.dimensions as u64) as usize
    }

    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    /// Unit-length vector for one text; the zero vector when it has no terms
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let terms = Self::terms(text);
        let mut vector = vec![0.0f32; self.dimensions];
        if terms.is_empty() {
            return vector;
        }

        let mut counts: BTreeMap<&str, f32> = BTreeMap::new();
        for term in &terms {
            *counts.entry(term.as_str()).or_default() += 1.0;
        }

        let total = terms.len() as f32;
        for (term, count) in counts {
            // longer terms carry more signal than short function words
            let weight = 1.0 + (term.len() as f32).ln();
            vector[self.bucket(term)] += count / total * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingGateway for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GatewayError> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }
}
