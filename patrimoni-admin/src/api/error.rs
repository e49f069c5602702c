//! API error types
//!
//! Every failure of the client surfaces as an [`ApiError`]. The type is
//! `Clone` so a single "who am I" result can be handed to every caller
//! sharing the same in-flight request.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use patrimoni_common::validation::ValidationError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

const GENERIC_MESSAGE: &str = "Une erreur est survenue.";
const NETWORK_MESSAGE: &str = "Une erreur inattendue est survenue.";

/// Server-side `detail` of an error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// `{"detail": "..."}`
    Message(String),
    /// `{"detail": {"code": ..., "message": ..., "field": ...}}`
    Structured {
        code: Option<String>,
        message: Option<String>,
        field: Option<String>,
    },
}

impl ErrorDetail {
    /// Extract the detail from a decoded error body
    ///
    /// A list of validation entries (`[{loc, msg}]`) is reduced to its first
    /// entry, with the last `loc` segment taken as the field.
    pub fn from_body(body: &Value) -> Option<Self> {
        match body.get("detail")? {
            Value::String(s) => Some(ErrorDetail::Message(s.clone())),
            Value::Object(map) => Some(ErrorDetail::Structured {
                code: map.get("code").and_then(text_of),
                message: map.get("message").and_then(text_of),
                field: map.get("field").and_then(text_of),
            }),
            Value::Array(entries) => {
                let first = entries.first()?;
                let field = first
                    .get("loc")
                    .and_then(Value::as_array)
                    .and_then(|loc| loc.last())
                    .and_then(text_of);
                Some(ErrorDetail::Structured {
                    code: first.get("type").and_then(text_of),
                    message: first.get("msg").and_then(text_of),
                    field,
                })
            }
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        let message = match self {
            ErrorDetail::Message(m) => Some(m.as_str()),
            ErrorDetail::Structured { message, .. } => message.as_deref(),
        };
        message.filter(|m| !m.trim().is_empty())
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorDetail::Message(_) => None,
            ErrorDetail::Structured { code, .. } => code.as_deref(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ErrorDetail::Message(_) => None,
            ErrorDetail::Structured { field, .. } => field.as_deref(),
        }
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Client API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {}", .detail.as_ref().and_then(ErrorDetail::message).unwrap_or("no detail"))]
    Status {
        status: u16,
        detail: Option<ErrorDetail>,
        /// Seconds from a `Retry-After` header, if usable
        retry_after: Option<u64>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Normalization error: {0}")]
    Normalize(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Login locked for {remaining_secs} more seconds")]
    LockedOut { remaining_secs: u64 },
}

impl From<patrimoni_common::Error> for ApiError {
    fn from(err: patrimoni_common::Error) -> Self {
        ApiError::Normalize(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Build an error from a non-success response's parts
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| ErrorDetail::from_body(&v));
        ApiError::Status {
            status: status.as_u16(),
            detail,
            retry_after: retry_after_from_headers(headers),
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn is_throttled(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
    }

    /// Rate-limit hint in seconds
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            ApiError::Status { retry_after, .. } => *retry_after,
            ApiError::LockedOut { remaining_secs } => Some(*remaining_secs),
            _ => None,
        }
    }

    /// Input field the failure pertains to, when one was identified
    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_ref().and_then(ErrorDetail::field),
            ApiError::Validation(v) => v.field.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for display to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::Normalize(_) => {
                NETWORK_MESSAGE.to_string()
            }
            ApiError::Validation(v) => v.message.clone(),
            ApiError::LockedOut { remaining_secs } => {
                format!("Trop de tentatives. Réessayez dans {remaining_secs} s.")
            }
            ApiError::Status {
                status,
                detail,
                retry_after,
            } => {
                let mut message = detail
                    .as_ref()
                    .and_then(ErrorDetail::message)
                    .map(str::to_string)
                    .unwrap_or_else(|| status_message(*status).to_string());
                if *status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
                    if let Some(secs) = retry_after {
                        message.push_str(&format!(" Réessayez dans {secs} s."));
                    }
                }
                message
            }
        }
    }
}

fn status_message(status: u16) -> &'static str {
    match status {
        401 => "Non autorisé. Veuillez vous connecter.",
        403 => "Accès refusé.",
        404 => "Ressource non trouvée.",
        429 => "Trop de tentatives.",
        500 => "Erreur serveur.",
        _ => GENERIC_MESSAGE,
    }
}

/// Parse a `Retry-After` value as a positive number of seconds
///
/// Fractional values round up. HTTP-date values are not supported.
pub fn parse_retry_after(raw: &str) -> Option<u64> {
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Some(secs.ceil() as u64)
}

/// Read the rate-limit hint from response headers
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}
