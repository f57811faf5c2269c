//! # docingest-core
//!
//! Trait abstractions shared by the ingestion pipeline crates.
//!
//! These traits describe the external services the pipeline talks to —
//! an embedding model, a summarizing/classifying LLM, and a tokenizer — so
//! that `docingest-ingest` can be built and tested against mocks rather than
//! against any one provider.
//!
//! ## Modules
//!
//! - [`embedding`] — turn text into dense vectors.
//! - [`llm`] — table summarization and retention classification.
//! - [`tokenizer`] — count tokens in a string against an embedding endpoint.

#![doc(html_logo_url = "https://raw.githubusercontent.com/lexoliu/docingest/main/logo.svg")]

pub mod embedding;
pub mod llm;
pub mod tokenizer;

#[doc(inline)]
pub use embedding::EmbeddingModel;
#[doc(inline)]
pub use llm::LlmClient;
#[doc(inline)]
pub use tokenizer::Tokenizer;

/// Result type used throughout the crate.
pub type Result<T = ()> = anyhow::Result<T>;

pub use anyhow::Error;
