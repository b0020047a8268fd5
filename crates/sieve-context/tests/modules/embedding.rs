//! Embedding provider behavior against fake and unreachable backends.

#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sieve_context::embedding::{
    Embedding, EmbeddingBackend, EmbeddingProvider, HttpEmbeddingBackend, OfflineBackend,
    cosine_similarity, local_embedding,
};
use sieve_core::{CacheConfig, Error, Result};

/// Answers with a short vector but drops the last item of every batch.
struct TruncatingBackend;

impl EmbeddingBackend for TruncatingBackend {
    fn name(&self) -> &'static str {
        "truncating"
    }

    async fn embed_batch(&self, mut texts: Vec<String>) -> Result<Vec<Embedding>> {
        texts.pop();
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

/// Returns an empty vector for texts containing "blank".
#[derive(Default)]
struct PartialBackend {
    calls: AtomicUsize,
}

impl EmbeddingBackend for PartialBackend {
    fn name(&self) -> &'static str {
        "partial"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                if text.contains("blank") {
                    Vec::default()
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }
}

#[test]
fn test_cosine_similarity_properties() {
    let vector = [0.5, -2.0, 3.0];
    assert!((cosine_similarity(&vector, &vector) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).abs() < f32::EPSILON);
    assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).abs() < f32::EPSILON);

    let other = [-3.0, 0.25, 7.5];
    let similarity = cosine_similarity(&vector, &other);
    assert!((-1.0..=1.0).contains(&similarity));
}

#[test]
fn test_local_embedding_is_deterministic_and_normalized() {
    let first = local_embedding("Render the navigation header component", 128);
    let second = local_embedding("Render the navigation header component", 128);
    assert_eq!(first, second);
    assert_eq!(first.len(), 128);
    let norm: f32 = first.iter().map(|value| value * value).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);

    let empty = local_embedding("a b ?!", 128);
    assert!(empty.iter().all(|value| *value == 0.0));
}

#[tokio::test]
async fn test_mis_sized_batch_falls_back_for_every_miss() {
    let provider = EmbeddingProvider::new(TruncatingBackend, &CacheConfig::default(), 64);
    let texts = vec!["alpha beta".to_owned(), "gamma delta".to_owned()];
    let embeddings = provider.embed_many(&texts).await;

    assert_eq!(embeddings[0], local_embedding("alpha beta", 64));
    assert_eq!(embeddings[1], local_embedding("gamma delta", 64));
    assert_eq!(provider.cache_len(), 0);
}

#[tokio::test]
async fn test_empty_vectors_are_replaced_individually() {
    let provider = EmbeddingProvider::new(PartialBackend::default(), &CacheConfig::default(), 64);
    let texts = vec!["first".to_owned(), "blank entry".to_owned(), "third".to_owned()];
    let embeddings = provider.embed_many(&texts).await;

    assert_eq!(embeddings[0], vec![0.0, 1.0]);
    assert_eq!(embeddings[1], local_embedding("blank entry", 64));
    assert_eq!(embeddings[2], vec![0.0, 1.0]);
    assert_eq!(provider.cache_len(), 2);

    provider.embed_many(&texts).await;
    assert_eq!(provider.backend().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_http_backend_degrades() {
    let backend = HttpEmbeddingBackend::new("http://127.0.0.1:9/embed", Duration::from_secs(2))
        .expect("client should build");
    let provider = EmbeddingProvider::new(backend, &CacheConfig::default(), 128);

    let embedding = provider.embed("checkout form validation").await;
    assert_eq!(embedding, local_embedding("checkout form validation", 128));
}

#[tokio::test]
async fn test_find_similar_bounds() {
    let provider = EmbeddingProvider::<OfflineBackend>::default();
    let candidates: Vec<String> = [
        "pricing table cards",
        "contact form email",
        "hero banner headline",
        "pricing plans monthly",
    ]
    .iter()
    .map(|text| (*text).to_owned())
    .collect();

    for top_k in [0, 1, 3, 10] {
        let matches = provider.find_similar("pricing plans", &candidates, top_k).await;
        assert_eq!(matches.len(), top_k.min(candidates.len()));
        for (current, next) in matches.iter().zip(matches.iter().skip(1)) {
            assert!(current.score >= next.score);
        }
        for found in &matches {
            assert_eq!(found.text, candidates[found.index]);
        }
    }
}

#[tokio::test]
async fn test_cache_is_bounded_and_shared() {
    let cache = CacheConfig {
        capacity: 2,
        ..CacheConfig::default()
    };
    let provider = Arc::new(EmbeddingProvider::new(PartialBackend::default(), &cache, 16));

    let mut handles = Vec::default();
    for index in 0..4 {
        let shared = Arc::clone(&provider);
        handles.push(tokio::spawn(async move {
            shared.embed(&format!("text number {index}")).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), vec![0.0, 1.0]);
    }
    assert_eq!(provider.cache_len(), 2);

    provider.clear_cache();
    assert_eq!(provider.cache_len(), 0);
}

#[test]
fn test_offline_backend_reports_unavailable() {
    assert!(!OfflineBackend.is_enabled());
}

#[tokio::test]
async fn test_offline_backend_batch_is_a_provider_error() {
    let result = OfflineBackend.embed_batch(vec!["text".to_owned()]).await;
    assert!(matches!(result, Err(Error::Provider(_))));
}
