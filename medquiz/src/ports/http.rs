// src/ports/http.rs
//
// JSON API over the content tree plus static serving of the public directory.
// Filesystem work runs on the blocking pool.
use anyhow::{Context, Result};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::application::{
    CatalogBuilder, ContentRepository, DirectoryScanner, GenerationReport, StructureGenerator,
    TopicFilter, TopicLoader, TopicLocator,
};
use crate::domain::{CatalogEntry, Difficulty, DomainError, TopicData};

pub type SharedRepository = Arc<dyn ContentRepository + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    repository: SharedRepository,
    generator: Arc<StructureGenerator<SharedRepository>>,
    public_dir: PathBuf,
}

impl AppState {
    pub fn new(
        repository: SharedRepository,
        generator: Arc<StructureGenerator<SharedRepository>>,
        public_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            generator,
            public_dir: public_dir.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Request problems surface their own message; anything else is reported
    /// under `context` with the cause in `details`.
    fn from_domain(context: &str, err: DomainError) -> Self {
        let status = status_of(&err);
        if status == StatusCode::BAD_REQUEST {
            warn!(error = %err, "Rejected request");
            return Self {
                status,
                error: err.to_string(),
                details: None,
            };
        }
        if status.is_server_error() {
            error!(error = %err, "{context}");
        } else {
            warn!(error = %err, "{context}");
        }
        Self {
            status,
            error: context.to_string(),
            details: Some(cause_of(&err)),
        }
    }

    /// Bad slugs, missing files and empty question sets keep their own message.
    /// Anything else is reported as "Failed to load topic".
    fn topic(err: DomainError) -> Self {
        let status = status_of(&err);
        if status.is_server_error() && !matches!(err, DomainError::InvalidTopic(_)) {
            return Self::from_domain("Failed to load topic", err);
        }
        warn!(error = %err, "Failed to load topic");
        Self {
            status,
            error: err.to_string(),
            details: None,
        }
    }

    fn generation(err: DomainError) -> Self {
        match err {
            DomainError::PathNotFound(path) => {
                warn!(path = %path.display(), "Modules directory not found");
                Self {
                    status: StatusCode::NOT_FOUND,
                    error: "Modules directory not found".to_string(),
                    details: None,
                }
            }
            other => {
                error!(error = %other, "Failed to generate structure index");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Failed to generate mst.json".to_string(),
                    details: Some(cause_of(&other)),
                }
            }
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    fn internal(context: &str, details: impl Into<String>) -> Self {
        let details = details.into();
        error!(%details, "{context}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: context.to_string(),
            details: Some(details),
        }
    }
}

/// Error text for response bodies, without the filesystem path.
fn cause_of(err: &DomainError) -> String {
    match err {
        DomainError::Io { source, .. } => source.to_string(),
        DomainError::Parse { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::MissingParameter(_)
        | DomainError::InvalidSegment(_)
        | DomainError::InvalidSlug => StatusCode::BAD_REQUEST,
        DomainError::PathNotFound(_) | DomainError::TopicNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Run `work` on the blocking pool and map its domain error with `on_error`.
async fn blocking<T, F>(
    context: &'static str,
    work: F,
    on_error: impl FnOnce(DomainError) -> ApiError,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(on_error(e)),
        Err(e) => Err(ApiError::internal(context, e.to_string())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanParams {
    pub module: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub search: Option<String>,
    pub difficulty: Option<String>,
    pub exam_type: Option<String>,
    pub subject: Option<String>,
    pub year: Option<String>,
}

impl CatalogParams {
    /// Empty values and `all` mean no filter, as in the practice page selects.
    fn into_filter(self) -> Result<TopicFilter, ApiError> {
        let set = |v: Option<String>| v.filter(|s| !s.is_empty() && s != "all");
        let difficulty = match set(self.difficulty) {
            Some(d) => Some(d.parse::<Difficulty>().map_err(ApiError::bad_request)?),
            None => None,
        };
        let year = match set(self.year) {
            Some(y) => Some(
                y.parse::<u32>()
                    .map_err(|_| ApiError::bad_request(format!("Invalid year '{y}'")))?,
            ),
            None => None,
        };
        Ok(TopicFilter {
            search: set(self.search),
            difficulty,
            exam_type: set(self.exam_type),
            subject: set(self.subject),
            year,
        })
    }
}

async fn scan_modules(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let context = "Failed to scan modules";
    let names = blocking(
        context,
        move || DirectoryScanner::new(state.repository).modules(),
        |e| ApiError::from_domain(context, e),
    )
    .await?;
    Ok(Json(names))
}

async fn scan_subjects(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let context = "Failed to scan subjects";
    let names = blocking(
        context,
        move || DirectoryScanner::new(state.repository).subjects(params.module.as_deref()),
        |e| ApiError::from_domain(context, e),
    )
    .await?;
    Ok(Json(names))
}

async fn scan_topics(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let context = "Failed to scan topics";
    let names = blocking(
        context,
        move || {
            DirectoryScanner::new(state.repository)
                .topics(params.module.as_deref(), params.subject.as_deref())
        },
        |e| ApiError::from_domain(context, e),
    )
    .await?;
    Ok(Json(names))
}

async fn generate_mst(State(state): State<AppState>) -> Result<Json<GenerationReport>, ApiError> {
    let report = blocking(
        "Failed to generate mst.json",
        move || state.generator.generate(),
        ApiError::generation,
    )
    .await?;
    Ok(Json(report))
}

async fn catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let filter = params.into_filter()?;
    let entries = blocking(
        "Failed to build catalog",
        move || Ok(CatalogBuilder::new(state.repository).build()),
        |e| ApiError::from_domain("Failed to build catalog", e),
    )
    .await?;
    let filtered = filter.apply(&entries).into_iter().cloned().collect();
    Ok(Json(filtered))
}

async fn topic(
    State(state): State<AppState>,
    UrlPath(locator): UrlPath<TopicLocator>,
) -> Result<Json<TopicData>, ApiError> {
    let locator = locator.validated().map_err(ApiError::topic)?;
    let data = blocking(
        "Failed to load topic",
        move || TopicLoader::new(state.repository).load(&locator),
        ApiError::topic,
    )
    .await?;
    Ok(Json(data))
}

/// All API routes plus the public directory (`/Modules/...`, `/mst.json`)
/// as the fallback.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.public_dir);

    Router::new()
        .route("/api/scan-modules", get(scan_modules))
        .route("/api/scan-subjects", get(scan_subjects))
        .route("/api/scan-topics", get(scan_topics))
        .route("/api/generate-mst", get(generate_mst).post(generate_mst))
        .route("/api/catalog", get(catalog))
        .route(
            "/api/topics/:module/:subject/:topicFolder/:topicFile",
            get(topic),
        )
        .fallback_service(static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "medquiz listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}
