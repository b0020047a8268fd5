//! Remote embedding services.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use sieve_core::{EmbeddingBackendKind, EmbeddingConfig, Error, Result};

use super::{Embedding, OllamaEmbeddingBackend};

/// A service that turns a batch of texts into vectors, in input order.
pub trait EmbeddingBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether the backend should be called at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Embed every text of the batch in one round trip
    ///
    /// # Errors
    /// Returns an error if the service is unreachable or answers with a
    /// malformed or mis-sized payload
    fn embed_batch(&self, texts: Vec<String>)
    -> impl Future<Output = Result<Vec<Embedding>>> + Send;
}

/// Reject responses that do not carry exactly one vector per input.
pub(crate) fn check_arity(expected: usize, embeddings: Vec<Embedding>) -> Result<Vec<Embedding>> {
    if embeddings.len() == expected {
        Ok(embeddings)
    } else {
        Err(Error::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            embeddings.len()
        )))
    }
}

/// Backend that is never available; every vector comes from the local fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl EmbeddingBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn embed_batch(&self, _texts: Vec<String>) -> Result<Vec<Embedding>> {
        Err(Error::Provider("offline backend has no remote service".to_owned()))
    }
}

#[derive(Serialize)]
struct EmbedRequest<'req> {
    texts: &'req [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'req str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

/// JSON endpoint accepting `{"texts": [...]}` and answering `{"embeddings": [[...]]}`.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingBackend {
    client: Client,
    url: String,
    model: Option<String>,
}

impl HttpEmbeddingBackend {
    /// Create a backend posting to `url`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            model: None,
        })
    }

    /// Send a model name with every request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl EmbeddingBackend for HttpEmbeddingBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::default());
        }

        let request = EmbedRequest {
            texts: &texts,
            model: self.model.as_deref(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: EmbedResponse = response.json().await?;

        check_arity(texts.len(), body.embeddings)
    }
}

/// Backend chosen from configuration.
pub enum ConfiguredBackend {
    /// No remote service
    Offline(OfflineBackend),
    /// Generic JSON endpoint
    Http(HttpEmbeddingBackend),
    /// Ollama embeddings API
    Ollama(OllamaEmbeddingBackend),
}

impl ConfiguredBackend {
    /// Build the backend described by `config`
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        match config.backend {
            EmbeddingBackendKind::Offline => Ok(Self::Offline(OfflineBackend)),
            EmbeddingBackendKind::Http => Ok(Self::Http(
                HttpEmbeddingBackend::new(config.url.clone(), timeout)?
                    .with_model(config.model.clone()),
            )),
            EmbeddingBackendKind::Ollama => Ok(Self::Ollama(OllamaEmbeddingBackend::new(
                &config.url,
                config.model.clone(),
            )?)),
        }
    }
}

impl Default for ConfiguredBackend {
    fn default() -> Self {
        Self::Offline(OfflineBackend)
    }
}

impl EmbeddingBackend for ConfiguredBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::Offline(backend) => backend.name(),
            Self::Http(backend) => backend.name(),
            Self::Ollama(backend) => backend.name(),
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Self::Offline(backend) => backend.is_enabled(),
            Self::Http(backend) => backend.is_enabled(),
            Self::Ollama(backend) => backend.is_enabled(),
        }
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        match self {
            Self::Offline(backend) => backend.embed_batch(texts).await,
            Self::Http(backend) => backend.embed_batch(texts).await,
            Self::Ollama(backend) => backend.embed_batch(texts).await,
        }
    }
}
