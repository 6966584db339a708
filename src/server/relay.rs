//! # Relay Route
//!
//! `POST /api/upload` receives the two images from the client tier and
//! forwards them to the OCR backend. Per request:
//!
//! ```text
//! RECEIVED ──(front/back missing)──────────────▶ 400
//!    │
//! HEALTH_CHECK ──(check fails)──────────────────▶ 503
//!    │
//! FORWARDING ──▶ 200 backend body
//!            ├─▶ backend status + backend message
//!            ├─▶ 503 on refused / unreachable / timeout / network
//!            └─▶ 500 otherwise
//! ```
//!
//! The two outbound calls are sequential and bounded separately. Nothing is
//! retried and nothing is kept between requests.

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::config::{BackendConfig, RelayInfo};
use crate::client::transport::TransportClient;
use crate::client::upload::UploadService;
use crate::common::error::{ErrorKind, NormalizedError, MSG_BOTH_REQUIRED, MSG_TOO_LARGE};
use crate::common::messages::{ImageFile, UploadRequest};

pub struct AppState {
    pub service: UploadService,
}

impl AppState {
    pub fn new(service: UploadService) -> Self {
        Self { service }
    }

    pub fn from_config(backend: &BackendConfig) -> anyhow::Result<Self> {
        let transport = TransportClient::new(&backend.url, backend.forward_timeout())?;
        let service = UploadService::new(transport)
            .with_timeouts(backend.health_timeout(), backend.forward_timeout());
        Ok(Self::new(service))
    }
}

/// Build the relay router.
pub fn build_router(state: Arc<AppState>, settings: &RelayInfo) -> Router {
    let mut app = Router::new()
        .route("/api/upload", post(upload_handler))
        .route("/api/health", get(health_check));

    if let Some(dir) = &settings.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A normalized error on its way out as `{ "error", "details" }`.
#[derive(Debug)]
pub struct RelayError(pub NormalizedError);

impl From<NormalizedError> for RelayError {
    fn from(err: NormalizedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_body())).into_response()
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "aadhaar-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.service.transport().base_url(),
    }))
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, RelayError> {
    let request_id = rand::random::<u64>();
    info!("📥 Upload #{} received", request_id);

    match relay_upload(&state.service, request_id, multipart).await {
        Ok(body) => {
            info!("✅ Upload #{} relayed", request_id);
            Ok(Json(body))
        }
        Err(err) => {
            match err.kind {
                ErrorKind::Validation => warn!(
                    "⚠️ Upload #{} rejected ({}): {}",
                    request_id,
                    err.http_status(),
                    err.message
                ),
                _ => error!(
                    "❌ Upload #{} failed [{}] ({}): {}",
                    request_id,
                    err.kind,
                    err.http_status(),
                    err.message
                ),
            }
            Err(RelayError(err))
        }
    }
}

async fn relay_upload(
    service: &UploadService,
    request_id: u64,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Value, NormalizedError> {
    let multipart = multipart.map_err(|e| {
        NormalizedError::validation(format!("Failed to read multipart data: {}", e.body_text()))
    })?;

    // Both parts are checked before spending a round trip on the health check.
    let request = read_upload(multipart).await?;
    info!(
        "📤 Upload #{}: front {} ({} bytes), back {} ({} bytes)",
        request_id,
        request.front.name,
        request.front.size(),
        request.back.name,
        request.back.size()
    );

    let health = service.ensure_healthy().await?;
    info!("💓 Backend healthy for upload #{} (HTTP {})", request_id, health.status);

    service.upload_raw(request).await
}

/// Collect the `front` and `back` parts. Other parts are ignored; an empty
/// part counts as missing.
async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, NormalizedError> {
    let mut front = None;
    let mut back = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let slot = match field.name() {
            Some("front") => &mut front,
            Some("back") => &mut back,
            _ => continue,
        };
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if !bytes.is_empty() {
            *slot = Some(ImageFile::new(name, content_type, bytes.to_vec()));
        }
    }

    match (front, back) {
        (Some(front), Some(back)) => Ok(UploadRequest { front, back }),
        _ => Err(NormalizedError::validation(MSG_BOTH_REQUIRED)),
    }
}

fn multipart_error(err: MultipartError) -> NormalizedError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let mut normalized = NormalizedError::validation(MSG_TOO_LARGE);
        normalized.status = Some(StatusCode::PAYLOAD_TOO_LARGE.as_u16());
        return normalized;
    }
    NormalizedError::validation(format!("Failed to read multipart data: {}", err.body_text()))
}
