//! Error types for the `looker-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, LookerError>`.
//!
//! [`LookerError`] covers:
//! - **Encoding errors**: Parameter values that cannot be put on the wire
//! - **Authentication errors**: Login failed, or a request was still rejected after one token refresh
//! - **Transport errors**: Network, TLS, timeout failures from `reqwest`
//! - **Server errors**: Non-2xx responses, with status and raw body preserved
//! - **Consumer errors**: The response consumer failed while reading the body
//! - **Cancellation**: The call's cancellation token fired
//! - **URL / configuration errors**

use std::fmt;

/// Boxed error produced by a caller-supplied response consumer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error document returned by the Looker API on failed requests.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable description of the error.
    #[serde(default)]
    pub message: Option<String>,
    /// Link to the relevant API documentation.
    #[serde(default)]
    pub documentation_url: Option<String>,
    /// Field-level validation errors (422 responses).
    #[serde(default)]
    pub errors: Vec<ValidationErrorDetail>,
}

/// A single field-level validation failure inside an [`ApiErrorBody`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ValidationErrorDetail {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// The most useful message in a raw error body: the Looker error document
    /// rendered when the body is one, the body itself otherwise.
    pub(crate) fn message_from(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(api) if api.message.is_some() || !api.errors.is_empty() => api.to_string(),
            _ => body.to_owned(),
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message.as_deref().unwrap_or("No message"))?;
        for e in &self.errors {
            write!(
                f,
                "; {}: {}",
                e.field.as_deref().unwrap_or("?"),
                e.message.as_deref().or(e.code.as_deref()).unwrap_or("invalid"),
            )?;
        }
        Ok(())
    }
}

/// All possible errors produced by the `looker-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum LookerError {
    /// A parameter or body could not be encoded. Never retried.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Token acquisition failed, or the server rejected the request again
    /// after the single permitted refresh.
    #[error("Authentication failed{}: {message}", status_suffix(.status))]
    Authentication {
        /// HTTP status of the rejecting response, when there was one.
        status: Option<reqwest::StatusCode>,
        /// Server message or raw body.
        message: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a non-success HTTP status code.
    #[error("HTTP {status}: {}", server_detail(.body, .api))]
    Server {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The raw response body text.
        body: String,
        /// The parsed Looker error document, when the body was one.
        api: Option<ApiErrorBody>,
    },

    /// A caller-supplied consumer failed while processing the response body.
    #[error("Response consumer failed: {0}")]
    Consumer(BoxError),

    /// Failed to deserialize a JSON response body.
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The call was cancelled through its cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or malformed client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LookerError {
    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Authentication { status, .. } => *status,
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Whether the failure happened while consuming a successful response.
    pub fn is_consumer(&self) -> bool {
        matches!(self, Self::Consumer(_) | Self::Json(_))
    }

    /// Build a [`LookerError::Server`] from a status and raw body, parsing the
    /// Looker error document when the body contains one.
    pub(crate) fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        let api = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .filter(|a| a.message.is_some() || !a.errors.is_empty());
        Self::Server { status, body, api }
    }
}

fn status_suffix(status: &Option<reqwest::StatusCode>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn server_detail(body: &str, api: &Option<ApiErrorBody>) -> String {
    match api {
        Some(api) => api.to_string(),
        None => body.to_owned(),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LookerError>;
