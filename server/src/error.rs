use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::{DetailReply, SUPPORTED_EXTENSIONS};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    NotFoundDetail(String),
    #[error("Bad Request: Expected multipart/form-data.")]
    NotMultipart,
    #[error("{0}")]
    BadRequest(String),
    #[error("Unsupported file format. Supported formats: {}.", supported_formats())]
    NotSupportedFormat,
    #[error("File size exceeds the maximum allowed size of {:.2} MB.", mebibytes(.0))]
    MaxSizeExceeded(u64),
    #[error("Only one file can be uploaded per request.")]
    MultipleFiles,
    #[error("No file in the request.")]
    NoFile,
    #[error("{0}")]
    Internal(String),
    #[error("Database operation failed: {0}")]
    Repository(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::NotFoundDetail(_) => StatusCode::NOT_FOUND,
            ApiError::NotMultipart
            | ApiError::BadRequest(_)
            | ApiError::NotSupportedFormat
            | ApiError::MaxSizeExceeded(_)
            | ApiError::MultipleFiles
            | ApiError::NoFile => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Repository(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::warn!("{self}");
        }
        (status, Json(DetailReply::new(self.to_string()))).into_response()
    }
}

fn supported_formats() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[allow(clippy::cast_precision_loss)]
fn mebibytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}
