use std::{io, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use kernel::{DetailReply, FileRecord, FilesPage, UploadReply};
use std::time::Duration;
use tokio::{net::TcpListener, signal, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass, limit::RequestBodyLimitLayer, services::ServeDir,
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;

pub mod config;
pub mod domain;
pub mod error;
pub mod file_reply;
mod handlers;
pub mod naming;
pub mod sqlite;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

use crate::config::Config;
use crate::domain::Repository;
use crate::sqlite::{Mode, Sqlite};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Room for multipart framing on top of twice the largest accepted file,
/// so oversized files still reach the handler and get a JSON reply.
const BODY_OVERHEAD: usize = 1024 * 1024;

pub struct AppState {
    pub db: PathBuf,
    pub config: Config,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_files,
        handlers::upload,
        handlers::delete_file,
        handlers::get_media
    ),
    components(schemas(FileRecord, FilesPage, UploadReply, DetailReply, handlers::UploadForm)),
    tags((name = "images", description = "Image upload API"))
)]
pub struct ApiDoc;

pub fn init_tracing(default_filter: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());
    // a subscriber may already be installed by the host binary
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Serves the API on `config.workers` consecutive ports until a shutdown
/// signal arrives.
pub async fn run(config: Config) -> io::Result<()> {
    let state = prepare(config)?;

    let token = CancellationToken::new();
    let mut workers = JoinSet::new();
    for i in 0..state.config.workers {
        let port = state.config.port.saturating_add(i);
        let socket = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(socket).await?;
        tracing::info!("worker {} listening on {socket}", i + 1);

        let app = create_routes(state.clone());
        let token = token.clone();
        workers.spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
        });
    }

    shutdown_signal().await;
    token.cancel();

    while let Some(finished) = workers.join_next().await {
        match finished {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("worker stopped with error: {e}"),
            Err(e) => tracing::error!("worker task failed: {e}"),
        }
    }
    Ok(())
}

/// Creates the database schema and the image directory when missing.
pub fn prepare(config: Config) -> io::Result<Arc<AppState>> {
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(&config.image_dir)?;

    let db = config.db_path();
    Sqlite::open(&db, Mode::ReadWrite)
        .and_then(|s| s.new_database())
        .map_err(io::Error::other)?;

    tracing::info!("database: {}", db.display());
    tracing::info!("image directory: {}", config.image_dir.display());
    Ok(Arc::new(AppState { db, config }))
}

pub fn create_routes(state: Arc<AppState>) -> Router {
    let max_file_size = usize::try_from(state.config.max_file_size).unwrap_or(usize::MAX);
    let body_limit = max_file_size
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD);
    let frontend = ServeDir::new(&state.config.frontend_dir);

    Router::new()
        .route("/", get(handlers::index_page))
        .route("/upload/", get(handlers::upload_page).post(handlers::upload))
        .route("/images/", get(handlers::images_page))
        .route("/api/files", get(handlers::list_files))
        .route("/api/delete/:filename", delete(handlers::delete_file))
        .route("/media/:filename", get(handlers::get_media))
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .nest_service("/frontend", frontend)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Server error: {error}");
                    },
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .into_inner(),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
