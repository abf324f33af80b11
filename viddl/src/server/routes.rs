use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::download::DownloadOutcome;

use super::{AppState, HttpError};

pub const SERVICE_NAME: &str = "youtube-downloader";

#[derive(Debug, Default, Deserialize)]
struct DownloadRequest {
    #[serde(default)]
    url: Option<String>,
}

impl DownloadRequest {
    /// Lenient parse: a body that isn't a JSON object with a string `url` has no URL.
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

/// Root endpoint, describes the API.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "YouTube Downloader API",
        "endpoints": {
            "GET /health": "Health check",
            "POST /download": "Download YouTube video",
        },
    }))
}

pub async fn download(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DownloadOutcome>, HttpError> {
    let request = DownloadRequest::from_body(&body);
    let outcome = state.service.download(request.url.as_deref()).await?;
    Ok(Json(outcome))
}
