//! # Upload Service
//!
//! Builds the two-part multipart body and posts it through a
//! [`TransportClient`]. Also exposes the liveness check used as a pre-flight
//! check before an upload is forwarded.
//!
//! The same service talks to the OCR backend (from the relay) and to the relay
//! (from the client binary); only the upload path differs.
//!
//! ```rust,ignore
//! let transport = TransportClient::new("http://localhost:5000", Duration::from_secs(30))?;
//! let service = UploadService::new(transport);
//! service.check_health().await?;
//! let result = service.upload_images(request).await?;
//! ```

use log::{info, warn};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;

use super::transport::TransportClient;
use crate::common::error::NormalizedError;
use crate::common::messages::{ExtractionResult, HealthStatus, ImageFile, UploadRequest};

/// Backend endpoint that runs OCR on the two images.
pub const OCR_PROCESS_PATH: &str = "/api/ocr/process";

/// Backend liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Relay endpoint the client tier uploads to.
pub const RELAY_UPLOAD_PATH: &str = "/api/upload";

#[derive(Debug, Clone)]
pub struct UploadService {
    transport: TransportClient,
    upload_path: String,
    health_timeout: Option<Duration>,
    upload_timeout: Option<Duration>,
}

impl UploadService {
    /// Service posting to the backend's OCR endpoint with the transport's own timeout.
    pub fn new(transport: TransportClient) -> Self {
        Self {
            transport,
            upload_path: OCR_PROCESS_PATH.to_string(),
            health_timeout: None,
            upload_timeout: None,
        }
    }

    pub fn with_upload_path(mut self, path: impl Into<String>) -> Self {
        self.upload_path = path.into();
        self
    }

    /// Bound the health check and the upload independently.
    pub fn with_timeouts(mut self, health: Duration, upload: Duration) -> Self {
        self.health_timeout = Some(health);
        self.upload_timeout = Some(upload);
        self
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    pub fn upload_path(&self) -> &str {
        &self.upload_path
    }

    /// Upload both images and return the peer's JSON body untouched.
    pub async fn upload_raw(&self, request: UploadRequest) -> Result<Value, NormalizedError> {
        let form = build_form(request)?;
        let response = self
            .transport
            .post_multipart(&self.upload_path, form, self.upload_timeout)
            .await?;
        TransportClient::read_json(response).await
    }

    /// Upload both images and decode the extracted fields.
    pub async fn upload_images(&self, request: UploadRequest) -> Result<ExtractionResult, NormalizedError> {
        let body = self.upload_raw(request).await?;
        let result: ExtractionResult = serde_json::from_value(body)
            .map_err(|e| NormalizedError::unknown(format!("unexpected response shape: {}", e)))?;
        info!("✅ Extraction result received from {}", self.transport.base_url());
        Ok(result)
    }

    /// Call the liveness endpoint.
    ///
    /// Any failure is a pre-flight failure: no user data has been sent yet, so
    /// it is always reported as 503. A non-2xx answer is returned as an
    /// unhealthy [`HealthStatus`], not as an error.
    pub async fn check_health(&self) -> Result<HealthStatus, NormalizedError> {
        let response = self
            .transport
            .get(HEALTH_PATH, self.health_timeout)
            .await
            .map_err(NormalizedError::into_preflight)?;

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok();
        let health = HealthStatus { status, body };
        if !health.is_healthy() {
            warn!("⚠️ Backend health check answered {}", status);
        }
        Ok(health)
    }

    /// Check the backend and turn an unhealthy answer into a pre-flight error.
    pub async fn ensure_healthy(&self) -> Result<HealthStatus, NormalizedError> {
        let health = self.check_health().await?;
        if health.is_healthy() {
            Ok(health)
        } else {
            Err(NormalizedError::unhealthy(health.status, health.body))
        }
    }
}

/// Multipart body with parts `front` and `back`.
pub fn build_form(request: UploadRequest) -> Result<Form, NormalizedError> {
    Ok(Form::new()
        .part("front", image_part(request.front)?)
        .part("back", image_part(request.back)?))
}

fn image_part(file: ImageFile) -> Result<Part, NormalizedError> {
    Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(&file.content_type)
        .map_err(|e| NormalizedError::unknown(format!("invalid content type {:?}: {}", file.content_type, e)))
}
