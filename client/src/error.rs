use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid service URI '{0}'")]
    InvalidUri(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server replied {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no record at position {0}")]
    NotFound(usize),
    #[error("record key does not belong to this store")]
    ForeignKey,
}
