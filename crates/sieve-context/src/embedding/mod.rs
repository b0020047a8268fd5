//! Embedding generation with a deterministic local fallback, caching and similarity search.

mod backend;
mod cache;
mod local;
mod ollama;
mod provider;
mod similarity;

pub use backend::{ConfiguredBackend, EmbeddingBackend, HttpEmbeddingBackend, OfflineBackend};
pub use cache::EmbeddingCache;
pub use local::{local_embedding, tokenize};
pub use ollama::OllamaEmbeddingBackend;
pub use provider::{EmbeddingProvider, SimilarMatch};
pub use similarity::cosine_similarity;

/// A single embedding vector
pub type Embedding = Vec<f32>;
