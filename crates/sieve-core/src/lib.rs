//! Core types, configuration and error handling for the context selection engine.
//!
//! This crate holds everything the engine and its callers share: the
//! relevance and output records, the tunable configuration and the error type.
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

/// Tunable configuration for chunking, scoring, selection and embeddings.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Data types exchanged with the caller.
pub mod types;

pub use config::{
    CacheConfig, ChunkingConfig, EmbeddingBackendKind, EmbeddingConfig, OptimizerConfig,
    ScoringConfig, SelectionConfig, TierBudget, TierConfig,
};
pub use error::{Error, Result};
pub use types::{
    Chunk, ChunkKind, Complexity, OptimizeOptions, OptimizedContext, ProjectFiles, ScoredFile, Strategy,
    estimate_tokens,
};
