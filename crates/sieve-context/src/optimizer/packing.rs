//! Fitting oversized selections into the budget chunk by chunk.

use sieve_core::{Chunk, ScoredFile, estimate_tokens};

use crate::chunking::Chunker;

/// Chunk every file and keep the most important chunks that fit in `budget` tokens.
///
/// Chunks are ranked by importance; equal importance keeps file order, then
/// position within the file. A chunk that does not fit is skipped and
/// smaller ones after it are still considered.
pub fn pack_chunks(chunker: &Chunker, files: &[ScoredFile], budget: usize) -> Vec<Chunk> {
    let mut candidates: Vec<Chunk> = files
        .iter()
        .flat_map(|file| chunker.chunk_file(&file.path, &file.content))
        .collect();
    candidates.sort_by(|chunk_a, chunk_b| chunk_b.importance.cmp(&chunk_a.importance));

    let mut used = 0;
    let mut packed = Vec::default();
    for chunk in candidates {
        let tokens = estimate_tokens(&chunk.content);
        if used + tokens > budget {
            continue;
        }
        used += tokens;
        packed.push(chunk);
    }
    packed
}

/// The longest prefix of `files` whose total stays within `max_tokens`.
pub fn fitting_prefix(files: Vec<ScoredFile>, max_tokens: usize) -> Vec<ScoredFile> {
    let mut used = 0;
    files
        .into_iter()
        .take_while(|file| {
            used += file.tokens();
            used <= max_tokens
        })
        .collect()
}
