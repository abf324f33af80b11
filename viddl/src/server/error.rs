use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::download::DownloadError;

/// Message returned for any download failure that is not the client's fault.
pub const DOWNLOAD_FAILED: &str = "Failed to download video";

/**
    HTTP-facing error, rendered as `{"error": ..., "details": ...}`.
*/
#[derive(Debug, Error)]
pub enum HttpError {
    /// Invalid request, the message is shown to the client as-is.
    #[error("{0}")]
    BadRequest(String),

    /// Download failed; the underlying cause goes into `details`.
    #[error("Failed to download video: {0}")]
    DownloadFailed(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    details: None,
                },
            ),
            HttpError::DownloadFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: DOWNLOAD_FAILED.to_string(),
                    details: Some(details),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DownloadError> for HttpError {
    fn from(err: DownloadError) -> Self {
        if err.is_client_error() {
            HttpError::BadRequest(err.to_string())
        } else {
            HttpError::DownloadFailed(err.to_string())
        }
    }
}
