//! Command-line entry point for the document ingestion pipeline.
//!
//! ```bash
//! docingest ingest --path ./docs
//! docingest clean-db
//! docingest serve
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docingest_cli::http;
use docingest_cli::providers::{HttpConverter, HttpEmbeddingModel, HttpLlmClient, HttpTokenizer, HttpVectorStore};
use docingest_ingest::{Pipeline, PipelineConfig, VectorStore};
use tracing_subscriber::EnvFilter;

/// Document ingestion pipeline CLI.
#[derive(Parser, Debug)]
#[command(name = "docingest", version, about)]
struct Cli {
    /// Enable debug logging. Takes priority over `LOG_LEVEL` when both are set.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest every PDF under a directory into the vector store.
    Ingest {
        /// Directory to scan for PDFs.
        #[arg(long, default_value = "/var/docs")]
        path: PathBuf,
    },
    /// Drop and recreate the vector store's collection.
    CleanDb,
    /// Run the trivial HTTP façade (`PORT`, default 4000).
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Ingest { path } => run_ingest(&path).await,
        Command::CleanDb => run_clean_db().await,
        Command::Serve => http::serve().await,
    }
}

/// `RUST_LOG` > `--debug` > `LOG_LEVEL`, matching the original's own
/// documented priority (CLI flag over environment) except that `RUST_LOG`,
/// being `tracing_subscriber`'s own convention, wins outright when set.
fn init_tracing(debug: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug || env_log_level_is_debug() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn env_log_level_is_debug() -> bool {
    std::env::var("LOG_LEVEL")
        .map(|level| level.to_lowercase().contains("debug"))
        .unwrap_or(false)
}

/// Recursively collects every `.pdf`-extension file under `dir` whose first
/// four bytes are the PDF magic number; anything else with a `.pdf`
/// extension is skipped with a warning rather than handed to the pipeline.
fn collect_pdfs(dir: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    collect_pdfs_into(dir, &mut paths)?;
    Ok(paths)
}

fn collect_pdfs_into(dir: &std::path::Path, paths: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_pdfs_into(&path, paths)?;
            continue;
        }
        if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) {
            continue;
        }
        if has_pdf_magic(&path)? {
            paths.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping file with .pdf extension but no PDF header");
        }
    }
    Ok(())
}

fn has_pdf_magic(path: &std::path::Path) -> anyhow::Result<bool> {
    use std::io::Read;
    let mut header = [0u8; 4];
    let mut file = std::fs::File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == b"%PDF"),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().pool_max_idle_per_host(32).build()?)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn run_ingest(path: &std::path::Path) -> anyhow::Result<()> {
    let paths = collect_pdfs(path)?;
    tracing::info!(count = paths.len(), dir = %path.display(), "discovered input PDFs");

    let client = http_client()?;
    let config = PipelineConfig::default();
    let pipeline = Pipeline::new(
        config,
        std::sync::Arc::new(HttpConverter::new(client.clone(), env_or("CONVERTER_URL", "http://localhost:8001/convert"))),
        std::sync::Arc::new(HttpLlmClient::new(client.clone(), env_or("LLM_URL", "http://localhost:8002"))),
        std::sync::Arc::new(HttpTokenizer::new(client.clone(), env_or("TOKENIZER_URL", "http://localhost:8003/count"))),
        std::sync::Arc::new(HttpVectorStore::new(
            client.clone(),
            env_or("VECTOR_STORE_URL", "http://localhost:8004"),
            env_or("VECTOR_STORE_INDEX", "documents"),
        )),
        std::sync::Arc::new(HttpEmbeddingModel::new(
            client,
            env_or("EMBEDDING_URL", "http://localhost:8005/embed"),
            env_or("EMBEDDING_DIM", "1536").parse().unwrap_or(1536),
        )),
        env_or("LLM_MODEL", "gpt-4o-mini"),
        "tables",
    );

    let report = pipeline.run(paths).await?;
    print!("{}", report.render(tracing::enabled!(tracing::Level::DEBUG)));

    if report.documents.is_empty() && !report.skipped.is_empty() {
        anyhow::bail!("every input document was rejected");
    }
    Ok(())
}

async fn run_clean_db() -> anyhow::Result<()> {
    let client = http_client()?;
    let store = HttpVectorStore::new(
        client,
        env_or("VECTOR_STORE_URL", "http://localhost:8004"),
        env_or("VECTOR_STORE_INDEX", "documents"),
    );
    store.reset().await?;
    tracing::info!(index = store.index_name(), "vector store collection reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pdfs_finds_only_pdf_extensions_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.7\n...").unwrap();
        std::fs::write(dir.path().join("scan.PDF"), b"%PDF-1.4\n...").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"%PDF-1.4\n...").unwrap();

        let mut found = collect_pdfs(dir.path()).unwrap();
        found.sort();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))));
    }

    #[test]
    fn collect_pdfs_rejects_pdf_extension_without_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fake.pdf"), b"not a pdf").unwrap();

        let found = collect_pdfs(dir.path()).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn collect_pdfs_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("inner.pdf"), b"%PDF-1.7\n...").unwrap();

        let found = collect_pdfs(dir.path()).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0], nested.join("inner.pdf"));
    }

    #[test]
    fn env_or_falls_back_to_default_when_unset() {
        assert_eq!(env_or("DOCINGEST_CLI_TEST_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn env_or_prefers_the_environment_value() {
        // SAFETY: single-threaded test, no concurrent readers of this key.
        unsafe {
            std::env::set_var("DOCINGEST_CLI_TEST_SET_VAR", "from-env");
        }
        assert_eq!(env_or("DOCINGEST_CLI_TEST_SET_VAR", "fallback"), "from-env");
        unsafe {
            std::env::remove_var("DOCINGEST_CLI_TEST_SET_VAR");
        }
    }

    #[test]
    fn env_log_level_is_debug_matches_case_insensitively() {
        // SAFETY: single-threaded test, no concurrent readers of this key.
        unsafe {
            std::env::set_var("LOG_LEVEL", "DEBUG");
        }
        assert!(env_log_level_is_debug());
        unsafe {
            std::env::remove_var("LOG_LEVEL");
        }
        assert!(!env_log_level_is_debug());
    }
}
