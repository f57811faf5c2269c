//! Thin HTTP collaborator implementations wiring the pipeline's trait seams
//! to whatever converter/LLM/embedding/vector-store services are configured
//! via environment variables. Each implementation is a single pooled
//! [`reqwest::Client`] shared across every worker, per the pipeline's
//! concurrency model.

use std::future::Future;
use std::path::Path;

use docingest_core::{EmbeddingModel, LlmClient, Tokenizer};
use docingest_ingest::{CombinedDocument, VectorStore};
use docingest_pdf::{Converter, DocumentTree};
use serde::{Deserialize, Serialize};

/// Converts a PDF by POSTing its raw bytes to a layout-aware conversion
/// service and parsing the JSON response as a [`DocumentTree`].
#[derive(Debug, Clone)]
pub struct HttpConverter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpConverter {
    /// Builds a converter client pointed at `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Converter for HttpConverter {
    async fn convert(&self, pdf_path: &Path) -> docingest_pdf::Result<DocumentTree> {
        let bytes = tokio::fs::read(pdf_path).await?;

        let response = self
            .client
            .post(&self.endpoint)
            .body(bytes)
            .send()
            .await
            .map_err(|err| docingest_pdf::PdfError::Collaborator(err.into()))?;

        response
            .error_for_status()
            .map_err(|err| docingest_pdf::PdfError::Collaborator(err.into()))?
            .json::<DocumentTree>()
            .await
            .map_err(|err| docingest_pdf::PdfError::Collaborator(err.into()))
    }
}

/// Summarizes and classifies tables via a pooled LLM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLlmClient {
    /// Builds an LLM client pointed at `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.endpoint.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    html: &'a [String],
    model: &'a str,
    tag: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summaries: Vec<String>,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    summaries: &'a [String],
    model: &'a str,
    tag: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    keep: Vec<bool>,
}

impl LlmClient for HttpLlmClient {
    async fn summarize(&self, html: &[String], model: &str, tag: &str) -> docingest_core::Result<Vec<String>> {
        let response = self
            .client
            .post(self.url("summarize"))
            .json(&SummarizeRequest { html, model, tag })
            .send()
            .await?
            .error_for_status()?
            .json::<SummarizeResponse>()
            .await?;
        Ok(response.summaries)
    }

    async fn classify(&self, summaries: &[String], model: &str, tag: &str) -> docingest_core::Result<Vec<bool>> {
        let response = self
            .client
            .post(self.url("classify"))
            .json(&ClassifyRequest { summaries, model, tag })
            .send()
            .await?
            .error_for_status()?
            .json::<ClassifyResponse>()
            .await?;
        Ok(response.keep)
    }
}

/// Counts tokens via a pooled tokenizer HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenizer {
    /// Builds a tokenizer client pointed at `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Serialize)]
struct CountRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CountResponse {
    count: usize,
}

impl Tokenizer for HttpTokenizer {
    async fn count(&self, text: &str) -> docingest_core::Result<usize> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CountRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json::<CountResponse>()
            .await?;
        Ok(response.count)
    }
}

/// Embeds text via a pooled embedding-model HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingModel {
    client: reqwest::Client,
    endpoint: String,
    dim: usize,
}

impl HttpEmbeddingModel {
    /// Builds an embedding client pointed at `endpoint`, reporting `dim` as
    /// its vector dimension.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, dim: usize) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            dim,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl EmbeddingModel for HttpEmbeddingModel {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> docingest_core::Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json::<EmbedResponse>()
            .await?;
        Ok(response.embedding)
    }
}

/// Inserts and resets a vector-store collection via a pooled HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpVectorStore {
    client: reqwest::Client,
    endpoint: String,
    index_name: String,
}

impl HttpVectorStore {
    /// Builds a vector-store client pointed at `endpoint`, managing the
    /// collection named `index_name`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            index_name: index_name.into(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}/{suffix}", self.endpoint.trim_end_matches('/'), self.index_name)
    }
}

#[derive(Serialize)]
struct EmbeddedDocument<'a> {
    #[serde(flatten)]
    document: &'a CombinedDocument,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct InsertRequest<'a> {
    documents: Vec<EmbeddedDocument<'a>>,
    max_tokens: usize,
}

impl VectorStore for HttpVectorStore {
    fn insert(
        &self,
        documents: Vec<CombinedDocument>,
        embedder: &dyn EmbeddingModel,
        max_tokens: usize,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        async move {
            let mut embedded = Vec::with_capacity(documents.len());
            for document in &documents {
                let embedding = embedder.embed(&document.page_content).await?;
                embedded.push(EmbeddedDocument { document, embedding });
            }
            self.client
                .post(self.url("insert"))
                .json(&InsertRequest {
                    documents: embedded,
                    max_tokens,
                })
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        }
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.client.post(self.url("reset")).send().await?.error_for_status()?;
        Ok(())
    }
}
