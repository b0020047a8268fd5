//! Selecting the slices of a project that fit a request's token budget.
//!
//! The pipeline runs lexical scoring, optional embedding fusion, tiered
//! greedy selection, the critical-file pass and finally the choice between
//! whole files and packed chunks.

mod keywords;
mod lexical;
mod packing;
mod selection;

use std::sync::Arc;

use sieve_core::{
    Error, OptimizeOptions, OptimizedContext, OptimizerConfig, ProjectFiles, Result, ScoredFile,
    Strategy, estimate_tokens,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chunking::Chunker;
use crate::embedding::{ConfiguredBackend, EmbeddingBackend, EmbeddingProvider, cosine_similarity};

pub use keywords::extract_keywords;
pub use lexical::{LexicalScorer, is_ignored};
pub use packing::{fitting_prefix, pack_chunks};
pub use selection::{Selection, sort_by_score};

/// Picks files or chunks for a query under a token budget.
///
/// The embedding provider sits behind an [`Arc`] so one cache can serve
/// several optimizers and concurrent requests.
pub struct ContextOptimizer<B: EmbeddingBackend = ConfiguredBackend> {
    config: OptimizerConfig,
    provider: Arc<EmbeddingProvider<B>>,
    chunker: Chunker,
}

impl TryFrom<OptimizerConfig> for ContextOptimizer<ConfiguredBackend> {
    type Error = Error;

    fn try_from(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let provider: EmbeddingProvider = EmbeddingProvider::try_from(&config)?;
        Ok(Self::new(config, Arc::new(provider)))
    }
}

impl<B: EmbeddingBackend + Default> Default for ContextOptimizer<B> {
    fn default() -> Self {
        Self::new(OptimizerConfig::default(), Arc::new(EmbeddingProvider::default()))
    }
}

impl<B: EmbeddingBackend> ContextOptimizer<B> {
    /// Create an optimizer sharing `provider`
    pub fn new(config: OptimizerConfig, provider: Arc<EmbeddingProvider<B>>) -> Self {
        let chunker = Chunker::new(config.chunking.clone());
        Self {
            config,
            provider,
            chunker,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Shared embedding provider
    pub fn provider(&self) -> &Arc<EmbeddingProvider<B>> {
        &self.provider
    }

    /// Select the context for `query`.
    ///
    /// Never fails: provider trouble degrades to local embeddings and an
    /// empty project yields an empty context.
    pub async fn optimize(
        &self,
        query: &str,
        files: &ProjectFiles,
        options: OptimizeOptions,
    ) -> OptimizedContext {
        let never = CancellationToken::new();
        match self.optimize_with_cancel(query, files, options, &never).await {
            Ok(context) => context,
            Err(error) => {
                warn!("Context optimization aborted: {error}");
                OptimizedContext::default()
            }
        }
    }

    /// Select the context for `query`, giving up once `cancel` fires.
    ///
    /// Cancellation is checked between stages and raced against the
    /// embedding round trip.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if `cancel` fires before the result is ready
    pub async fn optimize_with_cancel(
        &self,
        query: &str,
        files: &ProjectFiles,
        options: OptimizeOptions,
        cancel: &CancellationToken,
    ) -> Result<OptimizedContext> {
        ensure_active(cancel)?;
        let keywords = extract_keywords(query, self.config.scoring.max_keywords);
        debug!("Query keywords: {keywords:?}");

        let scorer = LexicalScorer::new(query, &keywords);
        let mut ranked: Vec<ScoredFile> = files
            .iter()
            .map(|(path, content)| ScoredFile::new(path, content, scorer.score(path, content)))
            .collect();
        sort_by_score(&mut ranked);
        ensure_active(cancel)?;

        if options.use_embeddings && files.len() > self.config.scoring.embedding_min_files {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = self.fuse_embeddings(query, &mut ranked) => {}
            }
            sort_by_score(&mut ranked);
        }
        ensure_active(cancel)?;

        let selection_config = &self.config.selection;
        let tier = selection_config.tiers.for_complexity(options.complexity);
        debug!(
            "Tier {:?}: up to {} files, {} tokens",
            options.complexity,
            tier.file_limit,
            tier.token_budget(options.max_tokens)
        );
        let mut selection =
            Selection::greedy(&ranked, tier, options.max_tokens, selection_config.min_score);
        let forced = selection.add_critical(
            &ranked,
            &selection_config.critical_files,
            options.max_tokens,
        );
        debug!(
            "Selected {} files ({} critical) using {} tokens",
            selection.len(),
            forced,
            selection.token_count()
        );
        ensure_active(cancel)?;

        let context = self.assemble(selection.into_files(), options.max_tokens);
        info!(
            "Optimized context: {} files, {} chunks, {} tokens, strategy {}",
            context.relevant_files.len(),
            context.chunks.len(),
            context.total_tokens,
            context.strategy
        );
        Ok(context)
    }

    /// Blend embedding similarity into the scores of the top-ranked files.
    ///
    /// Files past the candidate window and ignored paths keep their lexical score.
    async fn fuse_embeddings(&self, query: &str, ranked: &mut [ScoredFile]) {
        let scoring = &self.config.scoring;
        let count = scoring.embedding_candidates.min(ranked.len());
        let candidates = &mut ranked[..count];

        let mut texts = Vec::with_capacity(count + 1);
        texts.push(query.to_owned());
        texts.extend(candidates.iter().map(|file| {
            let preview: String = file.content.chars().take(scoring.embedding_preview_chars).collect();
            format!("{}\n{preview}", file.path)
        }));

        let embeddings = self.provider.embed_many(&texts).await;
        let Some((query_embedding, file_embeddings)) = embeddings.split_first() else {
            return;
        };

        for (file, embedding) in candidates.iter_mut().zip(file_embeddings) {
            if is_ignored(&file.path) {
                continue;
            }
            let similarity = f64::from(cosine_similarity(query_embedding, embedding));
            file.score = scoring
                .lexical_weight
                .mul_add(file.score, scoring.embedding_weight * similarity * 100.0);
        }
        debug!("Fused embedding similarity into {count} file scores");
    }

    /// Return the files whole when they fit, otherwise their best chunks.
    fn assemble(&self, files: Vec<ScoredFile>, max_tokens: usize) -> OptimizedContext {
        let selection_config = &self.config.selection;
        let file_tokens: usize = files.iter().map(ScoredFile::tokens).sum();
        let full_limit = max_tokens as f64 * selection_config.full_threshold;

        if files.is_empty() || file_tokens as f64 <= full_limit {
            return OptimizedContext {
                relevant_files: files,
                chunks: Vec::default(),
                total_tokens: file_tokens,
                strategy: Strategy::Full,
            };
        }

        let chunk_budget = (max_tokens as f64 * selection_config.chunk_budget).floor() as usize;
        let chunks = pack_chunks(&self.chunker, &files, chunk_budget);
        if chunks.is_empty() {
            let kept = fitting_prefix(files, max_tokens);
            warn!(
                "No chunk fits in {chunk_budget} tokens, keeping {} whole files",
                kept.len()
            );
            let total_tokens = kept.iter().map(ScoredFile::tokens).sum();
            return OptimizedContext {
                relevant_files: kept,
                chunks: Vec::default(),
                total_tokens,
                strategy: Strategy::Filtered,
            };
        }

        let total_tokens = chunks.iter().map(|chunk| estimate_tokens(&chunk.content)).sum();
        // The text travels in the chunks; keep only path and score here
        let relevant_files = files
            .into_iter()
            .map(|file| ScoredFile {
                content: String::new(),
                ..file
            })
            .collect();
        OptimizedContext {
            relevant_files,
            chunks,
            total_tokens,
            strategy: Strategy::Chunked,
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
