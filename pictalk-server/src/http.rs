//! Pictalk HTTP API
//!
//! Axum-based HTTP server for the image chatbot prototype.
//!
//! Architecture: each endpoint has a thin axum handler that extracts the request
//! and delegates to a pure inner function returning `(StatusCode, json)`. The
//! inner functions are directly testable without axum dispatch machinery.
//!
//! Endpoints (API prefix configurable, `/api` by default):
//! - GET  /             chat page
//! - GET  /health       database status and statistics
//! - POST /api/upload   multipart image + query, mock analysis
//! - POST /api/chat     JSON text message, canned reply
//! - GET  /api/history  always empty

use std::sync::Arc;

use anyhow::Result;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use pictalk_core::responder::{generate_mock_response, generate_text_response};
use pictalk_core::utils::{allowed_file, log_error, secure_filename};
use pictalk_core::{Database, PictalkConfig};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub db: Database,
    pub config: PictalkConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let prefix = state.config.http.api_prefix.trim_end_matches('/').to_string();
    let body_limit = state.config.upload.max_content_length;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(&format!("{}/upload", prefix), post(upload_handler))
        .route(&format!("{}/chat", prefix), post(chat_handler))
        .route(&format!("{}/history", prefix), get(history_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    db: Database,
    config: PictalkConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { db, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Pictalk HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub query: String,
    pub response: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<serde_json::Value>,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// A file part from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// As sent by the client; may be empty.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// The fields of `POST /api/upload` the handler cares about.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub image: Option<UploadedFile>,
    pub query: String,
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| serde_json::json!({}))
}

fn error_body(msg: impl Into<String>) -> serde_json::Value {
    to_json(&ErrorResponse::new(msg))
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner upload: validates the form, stores the file and builds the mock reply.
pub async fn upload_inner(
    config: &PictalkConfig,
    form: UploadForm,
) -> (StatusCode, serde_json::Value) {
    let file = match form.image {
        Some(f) => f,
        None => return (StatusCode::BAD_REQUEST, error_body("No image provided")),
    };

    if file.file_name.is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("No selected file"));
    }

    if !allowed_file(&file.file_name, &config.upload.allowed_extensions) {
        return (StatusCode::BAD_REQUEST, error_body("Invalid file type"));
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let filename = format!("{}_{}", timestamp, secure_filename(&file.file_name));
    let filepath = config.upload.folder.join(&filename);

    let saved = async {
        tokio::fs::create_dir_all(&config.upload.folder).await?;
        tokio::fs::write(&filepath, &file.data).await
    }
    .await;

    if let Err(e) = saved {
        log_error(&config.service.error_log, &e, "upload");
        return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()));
    }

    tracing::info!(
        "Saved upload {} ({} bytes) as {}",
        file.file_name,
        file.data.len(),
        filepath.display()
    );

    let response = generate_mock_response(&filename, &form.query);

    (
        StatusCode::OK,
        to_json(&UploadResponse {
            success: true,
            filename,
            query: form.query,
            response,
            timestamp,
        }),
    )
}

/// Inner chat: requires a non-empty message.
pub fn chat_inner(req: ChatRequest) -> (StatusCode, serde_json::Value) {
    let message = match req.message {
        Some(m) if !m.is_empty() => m,
        _ => return (StatusCode::BAD_REQUEST, error_body("No message provided")),
    };

    let response = generate_text_response(&message);

    (
        StatusCode::OK,
        to_json(&ChatResponse {
            success: true,
            message,
            response,
        }),
    )
}

/// Inner history: persistence is not wired to the chat flow, so this is always empty.
pub fn history_inner() -> serde_json::Value {
    to_json(&HistoryResponse {
        success: true,
        history: Vec::new(),
    })
}

/// Inner health check: queries the database and returns (status_code, json_body).
pub async fn health_inner(db: &Database) -> (StatusCode, serde_json::Value) {
    let checked = async {
        let version = db.health_check().await?;
        let stats = db.get_statistics().await?;
        Ok::<_, pictalk_core::PictalkError>((version, stats))
    }
    .await;

    match checked {
        Ok((version, stats)) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "sqlite": version,
                "database": db.path().display().to_string(),
                "statistics": stats,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Chat page with the JSON routes pointed at the configured prefix.
pub fn render_index(api_prefix: &str) -> String {
    INDEX_HTML.replace("{{API_PREFIX}}", api_prefix.trim_end_matches('/'))
}

/// Inner form error: an oversized body keeps the reader's 413, anything else
/// is a server error and goes to the error log.
pub fn form_error_inner(
    config: &PictalkConfig,
    err: &MultipartError,
) -> (StatusCode, serde_json::Value) {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload body over limit: {}", err);
        return (status, error_body(err.body_text()));
    }

    log_error(&config.service.error_log, err, "upload");
    (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.body_text()))
}

/// Collect the `image` file part and the `query` text part.
///
/// A part named `image` without a filename is a plain form value, not a file,
/// and is ignored. Only the first occurrence of each field counts.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, MultipartError> {
    let mut image = None;
    let mut query = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" if image.is_none() => {
                let file_name = match field.file_name() {
                    Some(f) => f.to_string(),
                    None => continue,
                };
                let data = field.bytes().await?.to_vec();
                image = Some(UploadedFile { file_name, data });
            }
            "query" if query.is_none() => {
                query = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(UploadForm {
        image,
        query: query.unwrap_or_default(),
    })
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn index_handler(State(state): State<Arc<HttpState>>) -> Html<String> {
    Html(render_index(&state.config.http.api_prefix))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.db).await;
    (status, Json(body))
}

pub async fn upload_handler(
    State(state): State<Arc<HttpState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let form = match multipart {
        Ok(multipart) => match read_upload_form(multipart).await {
            Ok(form) => form,
            Err(e) => {
                let (status, body) = form_error_inner(&state.config, &e);
                return (status, Json(body));
            }
        },
        Err(rejection) => {
            tracing::debug!("Upload without multipart body: {}", rejection);
            UploadForm::default()
        }
    };

    let (status, body) = upload_inner(&state.config, form).await;
    (status, Json(body))
}

pub async fn chat_handler(
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!("Rejected chat body: {}", rejection);
            ChatRequest::default()
        }
    };

    let (status, body) = chat_inner(req);
    (status, Json(body))
}

pub async fn history_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(history_inner()))
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================
