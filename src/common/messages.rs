//! # Wire Types
//!
//! Request-scoped data exchanged between the client tier, the relay and the
//! OCR backend. Nothing here outlives a single request.
//!
//! JSON shapes:
//! - success: an [`ExtractionResult`] object (`name`, `gender`, `dob`,
//!   `aadhaarNumber`, `pincode`, `address`, plus anything else the backend sends)
//! - failure: an [`ErrorBody`] object `{ "error": "...", "details": ... }`

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// UPLOAD PAYLOAD
// ============================================================================

/// A single selected image: its original file name, declared MIME type and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    ///
    /// The declared type is what the validation gate inspects; the content
    /// itself is never sniffed.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(name, mime_from_extension(path), bytes))
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Map a path's extension to the MIME type a browser would declare for it.
pub fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Both sides of the identity card, ready to be sent as multipart parts `front` and `back`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub front: ImageFile,
    pub back: ImageFile,
}

// ============================================================================
// EXTRACTION RESULT
// ============================================================================

/// Structured fields the OCR backend extracted from the card.
///
/// Every field is optional. Values the backend sends as numbers are kept as
/// their string form, and keys this struct does not know about are preserved
/// in `extra` so a round trip through the client tier loses nothing.
///
/// Backends spell the birth date either `dob` or `dateOfBirth`; each key is
/// kept under its own name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Accept strings, numbers and booleans; anything else (null, objects) becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl ExtractionResult {
    /// Birth date under either key, `dob` first.
    pub fn birth_date(&self) -> Option<&str> {
        [&self.dob, &self.date_of_birth]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
    }
}

// ============================================================================
// ERROR AND HEALTH BODIES
// ============================================================================

/// JSON error body returned by the relay (and, by convention, by the backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Outcome of the backend liveness check.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    /// HTTP status the health check answered with
    pub status: u16,
    /// Parsed JSON body, if the health check returned one
    pub body: Option<Value>,
}

impl HealthStatus {
    /// The backend is considered alive only on a 2xx answer.
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
