//! Budgeted file selection with guaranteed anchor files.

use std::path::Path;

use sieve_core::{ScoredFile, TierBudget};

use super::lexical::is_ignored;

/// Order by score descending, then path ascending.
pub fn sort_by_score(files: &mut [ScoredFile]) {
    files.sort_by(|file_a, file_b| {
        file_b
            .score
            .total_cmp(&file_a.score)
            .then_with(|| file_a.path.cmp(&file_b.path))
    });
}

/// Files picked for the context and the tokens they use.
#[derive(Debug, Default)]
pub struct Selection {
    files: Vec<ScoredFile>,
    token_count: usize,
}

impl Selection {
    /// Take files from the front of `ranked` while they clear `min_score` and
    /// fit both limits of `tier`, stopping at the first that does not.
    pub fn greedy(ranked: &[ScoredFile], tier: TierBudget, max_tokens: usize, min_score: f64) -> Self {
        let token_budget = tier.token_budget(max_tokens);
        let mut selection = Self::default();

        for file in ranked {
            if file.score <= min_score || selection.files.len() >= tier.file_limit {
                break;
            }
            let tokens = file.tokens();
            if selection.token_count + tokens > token_budget {
                break;
            }
            selection.push(file.clone(), tokens);
        }
        selection
    }

    /// Add the best-ranked file matching each critical file name, when it is
    /// not already selected and fits in what is left of `max_tokens`.
    ///
    /// Returns the number of files added.
    pub fn add_critical(&mut self, ranked: &[ScoredFile], critical_names: &[String], max_tokens: usize) -> usize {
        let mut added = 0;
        for name in critical_names {
            let Some(file) = ranked
                .iter()
                .find(|candidate| file_name(&candidate.path) == name && !is_ignored(&candidate.path))
            else {
                continue;
            };
            if self.contains(&file.path) {
                continue;
            }

            let tokens = file.tokens();
            if tokens <= self.remaining(max_tokens) {
                self.push(file.clone(), tokens);
                added += 1;
            }
        }
        added
    }

    /// Whether `path` is already selected
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|file| file.path == path)
    }

    /// Tokens used so far
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Tokens left under `max_tokens`
    pub fn remaining(&self, max_tokens: usize) -> usize {
        max_tokens.saturating_sub(self.token_count)
    }

    /// Number of selected files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume and return the files in selection order
    pub fn into_files(self) -> Vec<ScoredFile> {
        self.files
    }

    fn push(&mut self, file: ScoredFile, tokens: usize) {
        self.token_count += tokens;
        self.files.push(file);
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}
