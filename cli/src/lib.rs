//! Command-line entry point and HTTP façade for the document ingestion
//! pipeline.
//!
//! The binary target (`src/main.rs`) wires [`providers`]'s HTTP-backed
//! collaborators into a `docingest_ingest::Pipeline` for the `ingest` and
//! `clean-db` subcommands, and [`http`] for the `serve` subcommand.

pub mod http;
pub mod providers;
