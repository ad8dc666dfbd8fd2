//! Conversion of non-2xx backend responses into [`HelpdeskError`].
//!
//! The backend reports failures as `{ "message": "..." }`, sometimes with an
//! `error` field next to it. `message` wins; `error` is used only on its own.
//! The text is kept verbatim; when both are missing or the body is not JSON a
//! generic text is used.

use std::fmt;

use serde::Deserialize;

use crate::error::{GENERIC_FAILURE_MESSAGE, HelpdeskError};

/// Fields are loose JSON values so a structured `error` detail does not make
/// the whole body unreadable.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let text = |v: Option<serde_json::Value>| match v {
            Some(serde_json::Value::String(m)) if !m.trim().is_empty() => Some(m),
            _ => None,
        };
        text(self.message).or_else(|| text(self.error))
    }
}

/// A failed response from the helpdesk API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: reqwest::StatusCode,
    /// Server-provided message, if any
    pub message: Option<String>,
}

impl ApiError {
    /// Build from the raw response body.
    pub fn from_body(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message);
        Self { status, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE)
        )
    }
}

impl From<ApiError> for HelpdeskError {
    fn from(error: ApiError) -> Self {
        HelpdeskError::Request {
            status: error.status.as_u16(),
            message: error.to_string(),
        }
    }
}
