use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// A file picked for upload, described the way a file input reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub path: PathBuf,
}

impl Candidate {
    /// Describes a file on disk; the MIME type is guessed from its extension.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            mime,
            size: meta.len(),
            path: path.to_path_buf(),
        })
    }
}
