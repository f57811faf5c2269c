//! The trivial HTTP façade mirroring the original service's endpoint shape.
//!
//! This surface performs no real ingestion work; it exists so the crate's
//! external shape matches the original's `/v1/digitize` job API.

use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct DigitizeRequest {
    ingest: bool,
    #[serde(default)]
    #[allow(dead_code)]
    output_format: Option<String>,
}

#[derive(Debug, Serialize)]
struct DigitizeResponse {
    job_id: String,
}

#[derive(Debug, Serialize)]
struct JobStatus {
    job_id: String,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn digitize(Json(request): Json<DigitizeRequest>) -> Json<DigitizeResponse> {
    let job_id = if request.ingest {
        Uuid::new_v4().to_string()
    } else {
        String::new()
    };
    Json(DigitizeResponse { job_id })
}

async fn digitize_status(Path(job_id): Path<String>) -> Json<JobStatus> {
    Json(JobStatus {
        job_id,
        status: "In Progress",
    })
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Builds the façade's router.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/v1/digitize", post(digitize))
        .route("/v1/digitize/:job_id", get(digitize_status))
        .route("/v1/health", get(health))
}

/// Binds to `PORT` (default `4000`) and serves the façade until the process
/// is interrupted.
pub async fn serve() -> anyhow::Result<()> {
    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(4000);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "digitize HTTP façade listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn digitize_assigns_a_job_id_when_requested() {
        let response = digitize(Json(DigitizeRequest {
            ingest: true,
            output_format: None,
        }))
        .await;
        assert!(Uuid::parse_str(&response.0.job_id).is_ok());
    }

    #[tokio::test]
    async fn digitize_returns_empty_id_when_not_ingesting() {
        let response = digitize(Json(DigitizeRequest {
            ingest: false,
            output_format: None,
        }))
        .await;
        assert!(response.0.job_id.is_empty());
    }

    #[tokio::test]
    async fn digitize_status_echoes_the_requested_job_id() {
        let response = digitize_status(Path("abc-123".to_string())).await;
        assert_eq!(response.0.job_id, "abc-123");
        assert_eq!(response.0.status, "In Progress");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health().await;
        assert_eq!(response.0.status, "ok");
    }

    #[test]
    fn router_builds_without_panicking() {
        let _ = router();
    }
}
