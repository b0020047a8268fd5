//! Ollama embedding backend.

use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use reqwest::Url;
use sieve_core::{Error, Result};
use tracing::debug;

use super::Embedding;
use super::backend::{EmbeddingBackend, check_arity};

/// Default Ollama port when the URL does not name one.
const DEFAULT_PORT: u16 = 11_434;

/// Embeddings served by a local or remote Ollama instance.
pub struct OllamaEmbeddingBackend {
    ollama: Ollama,
    model: String,
}

impl OllamaEmbeddingBackend {
    /// Create a backend for the Ollama server at `url` using `model`
    ///
    /// # Errors
    /// Returns a `Config` error if `url` is not a valid URL with a host
    pub fn new(url: &str, model: String) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|error| Error::Config(format!("invalid Ollama URL {url:?}: {error}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Config(format!("Ollama URL {url:?} has no host")))?;
        let port = parsed.port().unwrap_or(DEFAULT_PORT);
        debug!("Using Ollama embeddings at {host}:{port} with model {model}");

        Ok(Self {
            ollama: Ollama::new(format!("{}://{host}", parsed.scheme()), port),
            model,
        })
    }

    /// Model used for embeddings
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingBackend for OllamaEmbeddingBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::default());
        }

        let expected = texts.len();
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), texts.into());
        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                let error_str = format!("{error:?}");
                if error_str.contains("model") && error_str.contains("not found") {
                    Error::Provider(format!(
                        "Embedding model '{}' not found. Run: ollama pull {}",
                        self.model, self.model
                    ))
                } else {
                    Error::Provider(format!("Batch embedding generation failed: {error}"))
                }
            })?;

        check_arity(expected, response.embeddings)
    }
}
