//! Cached embedding provider that never fails.

use std::cmp::Ordering;

use sieve_core::{CacheConfig, EmbeddingConfig, Error, OptimizerConfig, Result};
use tracing::{debug, warn};

use super::backend::{ConfiguredBackend, EmbeddingBackend};
use super::{Embedding, EmbeddingCache, cosine_similarity, local_embedding};

/// A candidate ranked by `find_similar`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    /// Candidate text
    pub text: String,
    /// Cosine similarity to the query
    pub score: f32,
    /// Position of the candidate in the input
    pub index: usize,
}

/// Turns text into vectors through a backend, a shared cache and a local fallback.
///
/// Every call yields a vector: backend failures are logged and replaced by
/// [`local_embedding`]. Fallback vectors are not cached, so a recovered
/// backend is used again on the next call.
pub struct EmbeddingProvider<B: EmbeddingBackend = ConfiguredBackend> {
    backend: B,
    cache: EmbeddingCache,
    dimensions: usize,
}

impl TryFrom<&OptimizerConfig> for EmbeddingProvider<ConfiguredBackend> {
    type Error = Error;

    fn try_from(config: &OptimizerConfig) -> Result<Self> {
        let backend = ConfiguredBackend::from_config(&config.embedding)?;
        Ok(Self::new(backend, &config.cache, config.embedding.local_dimensions))
    }
}

impl<B: EmbeddingBackend> EmbeddingProvider<B> {
    /// Create a provider over `backend`; `dimensions` sizes the local fallback
    pub fn new(backend: B, cache: &CacheConfig, dimensions: usize) -> Self {
        Self {
            backend,
            cache: EmbeddingCache::new(cache),
            dimensions,
        }
    }

    /// The shared cache
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Number of cached vectors
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached vector
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Local fallback vector for `text`
    pub fn fallback(&self, text: &str) -> Embedding {
        local_embedding(text, self.dimensions)
    }

    /// Embed one text, consulting the cache first.
    pub async fn embed(&self, text: &str) -> Embedding {
        let key = self.cache.key(text);
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }
        if !self.backend.is_enabled() {
            return self.fallback(text);
        }

        match self.backend.embed_batch(vec![text.to_owned()]).await {
            Ok(embeddings) => match embeddings.into_iter().next() {
                Some(embedding) if !embedding.is_empty() => {
                    self.cache.insert(key, embedding.clone());
                    embedding
                }
                _ => {
                    warn!("{} backend returned an empty embedding", self.backend.name());
                    self.fallback(text)
                }
            },
            Err(error) => {
                warn!(
                    "{} backend unavailable, using local embedding: {error}",
                    self.backend.name()
                );
                self.fallback(text)
            }
        }
    }

    /// Embed many texts, sending every cache miss in a single backend call.
    ///
    /// Output order matches input order. A failed batch falls back per item,
    /// and an empty vector inside a successful batch is replaced on its own.
    pub async fn embed_many(&self, texts: &[String]) -> Vec<Embedding> {
        let keys: Vec<u64> = texts.iter().map(|text| self.cache.key(text)).collect();
        let mut results: Vec<Option<Embedding>> =
            keys.iter().map(|key| self.cache.get(*key)).collect();
        let misses: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(index, cached)| cached.is_none().then_some(index))
            .collect();
        debug!(
            "Embedding {} texts: {} cached, {} to fetch",
            texts.len(),
            texts.len() - misses.len(),
            misses.len()
        );

        if !misses.is_empty() && self.backend.is_enabled() {
            let batch: Vec<String> = misses.iter().map(|index| texts[*index].clone()).collect();
            match self.backend.embed_batch(batch).await {
                Ok(embeddings) if embeddings.len() == misses.len() => {
                    for (index, embedding) in misses.iter().zip(embeddings) {
                        if embedding.is_empty() {
                            warn!("{} backend returned an empty embedding", self.backend.name());
                            continue;
                        }
                        self.cache.insert(keys[*index], embedding.clone());
                        results[*index] = Some(embedding);
                    }
                }
                Ok(embeddings) => warn!(
                    "{} backend returned {} embeddings for {} texts, using local embeddings",
                    self.backend.name(),
                    embeddings.len(),
                    misses.len()
                ),
                Err(error) => warn!(
                    "{} backend unavailable, using local embeddings: {error}",
                    self.backend.name()
                ),
            }
        }

        results
            .into_iter()
            .zip(texts)
            .map(|(embedding, text)| embedding.unwrap_or_else(|| self.fallback(text)))
            .collect()
    }

    /// Rank `candidates` by cosine similarity to `query`, best first, keeping at most `top_k`.
    ///
    /// The query and all candidates are embedded in one batch. Equal scores
    /// keep their input order.
    pub async fn find_similar(
        &self,
        query: &str,
        candidates: &[String],
        top_k: usize,
    ) -> Vec<SimilarMatch> {
        if candidates.is_empty() || top_k == 0 {
            return Vec::default();
        }

        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(query.to_owned());
        texts.extend(candidates.iter().cloned());
        let mut embeddings = self.embed_many(&texts).await.into_iter();
        let Some(query_embedding) = embeddings.next() else {
            return Vec::default();
        };

        let mut matches: Vec<SimilarMatch> = candidates
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (text, embedding))| SimilarMatch {
                text: text.clone(),
                score: cosine_similarity(&query_embedding, &embedding),
                index,
            })
            .collect();

        // Stable sort: ties stay in input order
        matches.sort_by(|match_a, match_b| {
            match_b
                .score
                .partial_cmp(&match_a.score)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(top_k);
        matches
    }
}

impl<B: EmbeddingBackend + Default> Default for EmbeddingProvider<B> {
    fn default() -> Self {
        Self::new(
            B::default(),
            &CacheConfig::default(),
            EmbeddingConfig::default().local_dimensions,
        )
    }
}
