//! Hashed term-frequency vectors used when no provider answers.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash as _, Hasher as _};

use super::Embedding;

/// Lowercase, replace punctuation with spaces and keep tokens longer than two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|character| {
            if character.is_alphanumeric() || character == '_' {
                character
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .map(str::to_owned)
        .collect()
}

fn bucket(token: &str, dimensions: usize) -> usize {
    // Zero-keyed SipHash: stable within one build
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() % dimensions as u64) as usize
}

/// Deterministic fixed-dimension embedding of `text`.
///
/// Each distinct token adds its normalized term frequency to one hashed
/// bucket; the result is L2-normalized unless it is all zeros.
pub fn local_embedding(text: &str, dimensions: usize) -> Embedding {
    let dimensions = dimensions.max(1);
    let mut vector = vec![0.0_f32; dimensions];
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return vector;
    }

    let mut frequencies = BTreeMap::<&str, usize>::new();
    for token in &tokens {
        *frequencies.entry(token.as_str()).or_default() += 1;
    }

    let total = tokens.len() as f32;
    for (token, count) in frequencies {
        vector[bucket(token, dimensions)] += count as f32 / total;
    }

    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}
