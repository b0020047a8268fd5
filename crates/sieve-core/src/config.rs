//! Configuration types for chunking, scoring, selection, embeddings and caching.
//!
//! Every empirical constant of the pipeline lives here so it can be tuned per
//! corpus from a TOML file instead of being baked into the engine.

use crate::{Complexity, Error, Result};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Complete optimizer configuration.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Chunker thresholds
    pub chunking: ChunkingConfig,
    /// Lexical and fusion scoring
    pub scoring: ScoringConfig,
    /// Budgeted selection
    pub selection: SelectionConfig,
    /// Embedding backend
    pub embedding: EmbeddingConfig,
    /// Embedding cache
    pub cache: CacheConfig,
}

/// Chunker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Files at or below this many characters become a single chunk
    pub max_chunk_size: usize,
    /// Characters shared by consecutive fixed-size windows
    pub chunk_overlap: usize,
    /// Markup files up to `max_chunk_size * html_full_factor` stay whole
    pub html_full_factor: usize,
    /// Stylesheets need at least this many selectors to be split by rule
    pub min_css_selectors: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 2_000,
            chunk_overlap: 200,
            html_full_factor: 2,
            min_css_selectors: 3,
        }
    }
}

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the lexical score in the fused score
    pub lexical_weight: f64,
    /// Weight of the scaled embedding similarity in the fused score
    pub embedding_weight: f64,
    /// Number of top lexical candidates re-scored with embeddings
    pub embedding_candidates: usize,
    /// Characters of content appended to the path for the embedded text
    pub embedding_preview_chars: usize,
    /// Embedding re-scoring only runs for projects with more files than this
    pub embedding_min_files: usize,
    /// Maximum number of keywords kept from a query
    pub max_keywords: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            lexical_weight: 0.6,
            embedding_weight: 0.4,
            embedding_candidates: 20,
            embedding_preview_chars: 500,
            embedding_min_files: 5,
            max_keywords: 15,
        }
    }
}

/// File count and share of `max_tokens` allowed for one complexity tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBudget {
    /// Maximum number of files selected greedily
    pub file_limit: usize,
    /// Fraction of `max_tokens` the greedy pass may spend
    pub token_fraction: f64,
}

impl TierBudget {
    /// Create a new tier budget
    pub const fn new(file_limit: usize, token_fraction: f64) -> Self {
        Self {
            file_limit,
            token_fraction,
        }
    }

    /// Token budget for the greedy pass given the caller's `max_tokens`
    pub fn token_budget(&self, max_tokens: usize) -> usize {
        (max_tokens as f64 * self.token_fraction).floor() as usize
    }
}

/// Per-tier selection budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Trivial tier
    pub trivial: TierBudget,
    /// Simple tier
    pub simple: TierBudget,
    /// Moderate tier
    pub moderate: TierBudget,
    /// Complex tier
    pub complex: TierBudget,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            trivial: TierBudget::new(2, 0.3),
            simple: TierBudget::new(5, 0.5),
            moderate: TierBudget::new(10, 0.7),
            complex: TierBudget::new(15, 1.0),
        }
    }
}

impl TierConfig {
    /// Budget for the given complexity tier
    pub fn for_complexity(&self, complexity: Complexity) -> TierBudget {
        match complexity {
            Complexity::Trivial => self.trivial,
            Complexity::Simple => self.simple,
            Complexity::Moderate => self.moderate,
            Complexity::Complex => self.complex,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &TierBudget)> {
        [
            ("trivial", &self.trivial),
            ("simple", &self.simple),
            ("moderate", &self.moderate),
            ("complex", &self.complex),
        ]
        .into_iter()
    }
}

/// Selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Files must score strictly above this to be selected greedily
    pub min_score: f64,
    /// Selected files are returned whole when they fit in this share of `max_tokens`
    pub full_threshold: f64,
    /// Share of `max_tokens` chunk selection may fill
    pub chunk_budget: f64,
    /// Budgets per complexity tier
    pub tiers: TierConfig,
    /// File names always considered after the greedy pass
    pub critical_files: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_score: 5.0,
            full_threshold: 0.8,
            chunk_budget: 0.9,
            tiers: TierConfig::default(),
            critical_files: ["index.html", "App.tsx", "main.tsx", "styles.css", "script.js"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Which remote service produces embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackendKind {
    /// No remote service; every vector comes from the local fallback
    #[default]
    Offline,
    /// JSON endpoint accepting `{texts}` and returning `{embeddings}`
    Http,
    /// Ollama embeddings API
    Ollama,
}

impl FromStr for EmbeddingBackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "offline" | "local" | "none" => Ok(Self::Offline),
            "http" => Ok(Self::Http),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("unknown embedding backend: {other}"))),
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection
    pub backend: EmbeddingBackendKind,
    /// Endpoint URL (HTTP backend) or host (Ollama backend)
    pub url: String,
    /// Model name sent to the backend
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Dimension of the local hashed fallback vector
    pub local_dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackendKind::default(),
            url: "http://localhost:11434".to_owned(),
            model: "nomic-embed-text".to_owned(),
            timeout_secs: 30,
            local_dimensions: 128,
        }
    }
}

/// Embedding cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached vectors
    pub capacity: usize,
    /// Leading characters of a text that form its cache key
    pub key_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            key_chars: 200,
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be in (0, 1], got {value}")))
    }
}

impl OptimizerConfig {
    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!(
            "Loaded optimizer config from {}: backend={:?}, max_chunk_size={}",
            path.display(),
            config.embedding.backend,
            config.chunking.max_chunk_size
        );

        Ok(config)
    }

    /// Load config from `path` if given, otherwise use defaults; then apply
    /// environment overrides
    ///
    /// # Errors
    /// Returns an error if the file cannot be loaded or an override is invalid
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let header = "# Context selection configuration\n\
                      # Edit this file to tune chunking, scoring and budgets\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Override embedding settings from `SIEVE_EMBEDDING_BACKEND`,
    /// `SIEVE_EMBEDDING_URL`, `SIEVE_EMBEDDING_MODEL` and `OLLAMA_HOST`
    ///
    /// # Errors
    /// Returns an error if `SIEVE_EMBEDDING_BACKEND` names an unknown backend
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(backend) = env::var("SIEVE_EMBEDDING_BACKEND") {
            self.embedding.backend = backend.parse()?;
        }
        if let Ok(url) = env::var("SIEVE_EMBEDDING_URL") {
            self.embedding.url = url;
        } else if self.embedding.backend == EmbeddingBackendKind::Ollama
            && let Ok(host) = env::var("OLLAMA_HOST")
        {
            self.embedding.url = host;
        }
        if let Ok(model) = env::var("SIEVE_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        Ok(())
    }

    /// Check that every tunable is in range
    ///
    /// # Errors
    /// Returns a `Config` error naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.max_chunk_size == 0 {
            return Err(Error::Config("max_chunk_size must be positive".to_owned()));
        }
        if chunking.chunk_overlap >= chunking.max_chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than max_chunk_size ({})",
                chunking.chunk_overlap, chunking.max_chunk_size
            )));
        }

        let scoring = &self.scoring;
        if scoring.lexical_weight < 0.0
            || scoring.embedding_weight < 0.0
            || scoring.lexical_weight + scoring.embedding_weight <= 0.0
        {
            return Err(Error::Config(
                "fusion weights must be non-negative and not both zero".to_owned(),
            ));
        }

        for (name, tier) in self.selection.tiers.iter() {
            check_fraction(&format!("tiers.{name}.token_fraction"), tier.token_fraction)?;
        }
        check_fraction("full_threshold", self.selection.full_threshold)?;
        check_fraction("chunk_budget", self.selection.chunk_budget)?;

        if self.cache.capacity == 0 {
            return Err(Error::Config("cache capacity must be positive".to_owned()));
        }
        if self.embedding.local_dimensions == 0 {
            return Err(Error::Config("local_dimensions must be positive".to_owned()));
        }
        Ok(())
    }
}
