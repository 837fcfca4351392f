#![allow(clippy::unused_async)]
use crate::domain::{media_url, NewImage, Repository};
use crate::error::ApiError;
use crate::file_reply::FileReply;
use crate::naming;
use crate::sqlite::{Mode, Sqlite};
use crate::{ApiDoc, AppState};
use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use futures::{Stream, TryStreamExt};
use kernel::{DetailReply, FilesPage, UploadReply, SUPPORTED_EXTENSIONS};
use serde::Deserialize;
use std::io;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use utoipa::{IntoParams, OpenApi, ToSchema};

use axum::extract::{Multipart, Path};

const DEFAULT_LIMIT: usize = 10;
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of records to return, 10 when omitted
    pub limit: Option<usize>,
    /// Number of records to skip, 0 when omitted
    pub offset: Option<usize>,
}

/// Multipart body of an upload.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Image to store
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Lists stored images in upload order.
#[utoipa::path(
    get,
    path = "/api/files",
    params(ListParams),
    responses(
        (status = 200, description = "Window of stored images", body = FilesPage),
        (status = 400, description = "Malformed query", body = DetailReply),
        (status = 500, description = "Server error", body = DetailReply)
    ),
    tag = "images",
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<FilesPage>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = params.offset.unwrap_or_default();

    let result = execute(&state.db, Mode::ReadOnly, move |repository| {
        let items = repository.list(limit, offset)?;
        let total_count = repository.count()?;
        Ok(FilesPage {
            items: items.into_iter().map(|image| image.into_record()).collect(),
            total_count,
        })
    });

    match result {
        Ok(page) => {
            tracing::info!(
                "served files list (limit={limit}, offset={offset}, total={})",
                page.total_count
            );
            Ok(Json(page))
        }
        Err(e) => {
            tracing::error!("failed to get files: {e}");
            Err(ApiError::Internal("Failed to get files".to_owned()))
        }
    }
}

/// Stores a single image sent as the `file` field of a multipart form.
#[utoipa::path(
    post,
    path = "/upload/",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadReply),
        (status = 400, description = "Invalid request, unsupported format or file too large", body = DetailReply),
        (status = 500, description = "Server error", body = DetailReply)
    ),
    tag = "images",
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReply>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("invalid upload request: {e}");
        ApiError::NotMultipart
    })?;

    let mut saved: Option<UploadReply> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if let Some(previous) = saved.take() {
                    remove_quietly(&state.config.image_dir.join(&previous.filename)).await;
                }
                return Err(ApiError::BadRequest(e.body_text()));
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if let Some(previous) = saved.take() {
            remove_quietly(&state.config.image_dir.join(&previous.filename)).await;
            return Err(ApiError::MultipleFiles);
        }
        saved = Some(save_field(&state, field).await?);
    }

    let reply = saved.ok_or(ApiError::NoFile)?;
    let image = NewImage {
        filename: reply.filename.clone(),
        original_name: reply.original_name.clone(),
        size: reply.size,
        file_type: reply.file_type.clone(),
    };

    let created = execute(&state.db, Mode::ReadWrite, move |mut repository| {
        Ok(repository.create(&image)?)
    });
    if let Err(e) = created {
        tracing::error!("failed to save image metadata: {e}");
        remove_quietly(&state.config.image_dir.join(&reply.filename)).await;
        return Err(e);
    }

    tracing::info!("upload completed: {}", reply.filename);
    Ok(Json(reply))
}

/// Deletes an image file and its metadata record.
#[utoipa::path(
    delete,
    path = "/api/delete/{filename}",
    responses(
        (status = 200, description = "Image deleted", body = DetailReply),
        (status = 404, description = "No record for the file", body = DetailReply),
        (status = 500, description = "Server error", body = DetailReply)
    ),
    tag = "images",
    params(
        ("filename" = String, Path, description = "Server assigned file name")
    ),
)]
pub async fn delete_file(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DetailReply>, ApiError> {
    let record_missing = || ApiError::NotFoundDetail("File record not found in DB".to_owned());
    if !naming::is_safe_filename(&filename) {
        return Err(record_missing());
    }

    let lookup = filename.clone();
    let found = execute(&state.db, Mode::ReadOnly, move |repository| {
        Ok(repository.get_by_filename(&lookup)?)
    })?;
    if found.is_none() {
        tracing::warn!("no DB record found for: {filename}");
        return Err(record_missing());
    }

    let path = state.config.image_dir.join(&filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::info!("deleted file from disk: {filename}"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("file not found on disk: {filename}");
        }
        Err(e) => {
            tracing::error!("failed to delete file {filename}: {e}");
            return Err(ApiError::Internal(
                "Failed to delete file from disk".to_owned(),
            ));
        }
    }

    let key = filename.clone();
    execute(&state.db, Mode::ReadWrite, move |mut repository| {
        Ok(repository.delete_by_filename(&key)?)
    })?;
    tracing::info!("deleted DB record for: {filename}");

    Ok(Json(DetailReply::new("File and DB record deleted")))
}

/// Gets stored image content
#[utoipa::path(
    get,
    path = "/media/{filename}",
    responses(
        (status = 200, description = "Image content"),
        (status = 404, description = "Image not found", body = DetailReply)
    ),
    tag = "images",
    params(
        ("filename" = String, Path, description = "Server assigned file name")
    ),
)]
pub async fn get_media(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<FileReply, ApiError> {
    let not_found = || ApiError::NotFoundDetail("Image not found.".to_owned());
    if !naming::is_safe_filename(&filename) {
        return Err(not_found());
    }
    match tokio::fs::read(state.config.image_dir.join(&filename)).await {
        Ok(data) => {
            tracing::info!("served image: {filename} ({} bytes)", data.len());
            Ok(FileReply::new(data, filename))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => {
            tracing::error!("failed to serve image {filename}: {e}");
            Err(ApiError::Internal("Failed to serve image.".to_owned()))
        }
    }
}

pub async fn index_page(State(state): State<Arc<AppState>>) -> Result<FileReply, ApiError> {
    page(&state, "index.html").await
}

pub async fn upload_page(State(state): State<Arc<AppState>>) -> Result<FileReply, ApiError> {
    page(&state, "upload.html").await
}

pub async fn images_page(State(state): State<Arc<AppState>>) -> Result<FileReply, ApiError> {
    page(&state, "images.html").await
}

pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn page(state: &AppState, name: &str) -> Result<FileReply, ApiError> {
    match tokio::fs::read(state.config.frontend_dir.join(name)).await {
        Ok(data) => {
            tracing::info!("served {name}");
            Ok(FileReply::new(data, name))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ApiError::NotFoundDetail(format!("{name} not found")))
        }
        Err(e) => {
            tracing::error!("failed to serve {name}: {e}");
            Err(ApiError::Internal(format!("Failed to serve {name}")))
        }
    }
}

async fn save_field(state: &AppState, field: Field<'_>) -> Result<UploadReply, ApiError> {
    let original_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or("uploaded_file")
        .to_owned();
    tracing::info!("receiving file: {original_name}");

    let (_, file_type) = naming::split_name(&original_name);
    let supported = file_type
        .strip_prefix('.')
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
    if !supported {
        return Err(ApiError::NotSupportedFormat);
    }

    let limit = state.config.max_file_size;
    let data = read_from_stream(field, limit)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let size = data.len() as u64;
    if size > limit {
        return Err(ApiError::MaxSizeExceeded(limit));
    }

    let filename = naming::unique_name(&original_name);
    tokio::fs::create_dir_all(&state.config.image_dir).await?;
    let path = state.config.image_dir.join(&filename);
    tracing::info!("saving {size} bytes to: {}", path.display());
    tokio::fs::write(&path, &data).await?;

    Ok(UploadReply {
        url: media_url(&filename),
        filename,
        size,
        original_name,
        file_type,
    })
}

async fn remove_quietly(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("cannot remove {}: {e}", path.display());
    }
}

fn execute<F, R>(db: &FsPath, mode: Mode, action: F) -> Result<R, ApiError>
where
    F: FnOnce(Sqlite) -> Result<R, ApiError>,
{
    let start = Instant::now();
    let repository = Sqlite::open(db, mode)?;
    let res = action(repository);
    tracing::debug!("DB query time: {:?}", start.elapsed());
    res
}

/// Buffers at most `limit + 1` bytes so that oversized bodies are detected
/// without holding them whole. The rest of an oversized body is drained.
async fn read_from_stream<S, E>(stream: S, limit: u64) -> io::Result<Vec<u8>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Sync + std::error::Error + Send + 'static,
{
    let body_with_io_error = stream.map_err(io::Error::other);
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);
    let mut buffer = Vec::new();

    body_reader
        .as_mut()
        .take(limit.saturating_add(1))
        .read_to_end(&mut buffer)
        .await?;
    if buffer.len() as u64 > limit {
        tokio::io::copy(&mut body_reader, &mut tokio::io::sink()).await?;
    }
    Ok(buffer)
}
