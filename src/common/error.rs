//! # Error Normalization
//!
//! Every failure in the pipeline ends up as a [`NormalizedError`]: one
//! user-facing message, an optional HTTP status and an optional diagnostic
//! payload. The relay and the client tier both build their errors through
//! this module, so the same cause always produces the same text.
//!
//! | Cause                        | Message                         | Status          |
//! |------------------------------|---------------------------------|-----------------|
//! | connection refused           | [`MSG_BACKEND_NOT_RUNNING`]     | 503             |
//! | host unreachable             | [`MSG_BACKEND_UNREACHABLE`]     | 503             |
//! | timeout                      | [`MSG_TIMEOUT`]                 | local           |
//! | no connectivity              | [`MSG_NETWORK`]                 | local           |
//! | backend error body           | backend's `error`, else [`MSG_BACKEND_FAILED`] | backend's |
//! | anything else                | [`MSG_UNKNOWN`]                 | 500             |
//!
//! Once an error is normalized it is propagated unchanged; nothing above the
//! tier that created it rewrites the message.

use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

use super::messages::ErrorBody;

pub const MSG_BOTH_REQUIRED: &str = "Please upload both front and back images.";
pub const MSG_INVALID_TYPE: &str = "Only JPEG or PNG images are allowed.";
pub const MSG_TOO_LARGE: &str = "File size must be less than 5MB.";

pub const MSG_BACKEND_NOT_RUNNING: &str =
    "Backend server is not running. Please start the backend server.";
pub const MSG_BACKEND_UNREACHABLE: &str =
    "Cannot connect to backend server. Check BACKEND_URL configuration.";
pub const MSG_TIMEOUT: &str = "Request timed out. Please try again.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection.";
pub const MSG_BACKEND_FAILED: &str = "Backend processing failed";
pub const MSG_UNKNOWN: &str = "Failed to process images. Please try again.";

/// Status used when a status-less failure has to become an HTTP response.
pub const FALLBACK_STATUS: u16 = 503;

// ============================================================================
// TRANSPORT FAILURE CLASSIFICATION
// ============================================================================

/// Raw cause of an outbound call that never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    ConnectionRefused,
    Unreachable,
    Timeout,
    NetworkDown,
    Other,
}

impl TransportFailure {
    /// Classify a `reqwest` error by walking its source chain.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        match io_error_kind(err) {
            Some(io::ErrorKind::ConnectionRefused) => Self::ConnectionRefused,
            Some(io::ErrorKind::TimedOut) => Self::Timeout,
            Some(
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::NotConnected
                | io::ErrorKind::UnexpectedEof,
            ) => Self::NetworkDown,
            _ if err.is_connect() => Self::Unreachable,
            _ => Self::Other,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ConnectionRefused => MSG_BACKEND_NOT_RUNNING,
            Self::Unreachable => MSG_BACKEND_UNREACHABLE,
            Self::Timeout => MSG_TIMEOUT,
            Self::NetworkDown => MSG_NETWORK,
            Self::Other => MSG_UNKNOWN,
        }
    }

    /// `None` means the failure is local to the caller and has no HTTP status of its own.
    pub fn status(self) -> Option<u16> {
        match self {
            Self::ConnectionRefused | Self::Unreachable => Some(503),
            Self::Timeout | Self::NetworkDown => None,
            Self::Other => Some(500),
        }
    }
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = e.source();
    }
    None
}

fn cause_chain(err: &(dyn StdError + 'static)) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(e) = source {
        causes.push(e.to_string());
        source = e.source();
    }
    if causes.is_empty() {
        "request failed".to_string()
    } else {
        causes.join(": ")
    }
}

// ============================================================================
// NORMALIZED ERROR
// ============================================================================

/// Which tier detected the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected by the validation gate before any network call
    Validation,
    /// The health check failed; no user data was sent
    Preflight,
    /// The call never got an HTTP response
    Transport(TransportFailure),
    /// The peer answered with a non-2xx status
    Backend,
    /// Catch-all
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Preflight => write!(f, "preflight"),
            Self::Transport(failure) => write!(f, "transport ({:?})", failure),
            Self::Backend => write!(f, "backend"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub details: Option<Value>,
}

impl NormalizedError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status: Some(400),
            details: None,
        }
    }

    pub fn transport(failure: TransportFailure) -> Self {
        Self {
            kind: ErrorKind::Transport(failure),
            message: failure.message().to_string(),
            status: failure.status(),
            details: None,
        }
    }

    /// Normalize a failed outbound call.
    ///
    /// `details` carries the underlying causes only; the top-level `reqwest`
    /// message names the peer URL and stays in the logs.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let failure = TransportFailure::classify(err);
        let mut normalized = Self::transport(failure);
        if failure == TransportFailure::Other {
            normalized.details = Some(Value::String(cause_chain(err)));
        }
        normalized
    }

    /// The peer answered with a non-2xx status.
    ///
    /// Its own `error` field wins; the raw body is kept as `details`.
    pub fn backend(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(MSG_BACKEND_FAILED)
            .to_string();
        Self {
            kind: ErrorKind::Backend,
            message,
            status: Some(status),
            details: body,
        }
    }

    pub fn unknown(details: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: MSG_UNKNOWN.to_string(),
            status: Some(500),
            details: Some(Value::String(details.to_string())),
        }
    }

    /// The health check answered, but not with a 2xx.
    pub fn unhealthy(status: u16, body: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Preflight,
            message: format!(
                "Cannot connect to backend server. Error: health check returned HTTP {}",
                status
            ),
            status: Some(503),
            details: body,
        }
    }

    /// Re-label a failure of the health check.
    ///
    /// Pre-flight failures are always 503. A refused or unreachable backend
    /// keeps the table text; any other cause is reported with the underlying
    /// cause from `details`, or the message when there is none.
    pub fn into_preflight(self) -> Self {
        if self.kind == ErrorKind::Preflight {
            return self;
        }
        let message = match self.kind {
            ErrorKind::Transport(TransportFailure::ConnectionRefused)
            | ErrorKind::Transport(TransportFailure::Unreachable) => self.message,
            _ => {
                let cause = match &self.details {
                    Some(Value::String(cause)) if !cause.trim().is_empty() => cause.as_str(),
                    _ => self.message.as_str(),
                };
                format!("Cannot connect to backend server. Error: {}", cause)
            }
        };
        Self {
            kind: ErrorKind::Preflight,
            message,
            status: Some(503),
            details: self.details,
        }
    }

    /// Status to answer with when this error crosses an HTTP boundary.
    pub fn http_status(&self) -> u16 {
        self.status.unwrap_or(FALLBACK_STATUS)
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            details: self.details.clone(),
        }
    }
}
