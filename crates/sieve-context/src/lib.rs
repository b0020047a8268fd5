//! Context selection engine for multi-file web projects.
//!
//! Given a `path → content` snapshot and a free-text request, the engine
//! scores every file, optionally blends in embedding similarity, and returns
//! the files or chunks that fit a token budget.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

/// Splitting files into scored chunks.
pub mod chunking;
/// Embedding backends, caching and similarity search.
pub mod embedding;
/// Scoring, selection and budgeting.
pub mod optimizer;

pub use chunking::{Chunker, chunk_file, reconstruct};
pub use embedding::{
    ConfiguredBackend, EmbeddingBackend, EmbeddingProvider, OfflineBackend, SimilarMatch,
    cosine_similarity,
};
pub use optimizer::ContextOptimizer;
