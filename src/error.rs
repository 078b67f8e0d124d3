use serde_json::Value;
use thiserror::Error;

/// The primary error type for the client.
///
/// Every failure of an API call, a push stream or local persistence ends up
/// here and is eventually turned into a user-visible [`crate::notify::Notification`].
/// Nothing is fatal to the session.
#[derive(Debug, Error)]
pub enum UiError {
    /// The request never produced a response (DNS, refused, timeout, aborted).
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response; `message` is the server's error text, verbatim when available.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },
    /// A response or push message could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Local validation failed before anything was sent.
    #[error("{message}")]
    Validation { field: String, message: String },
    /// The push stream failed or was closed by the server.
    #[error("Stream error: {0}")]
    Stream(String),
    /// Reading or writing persisted client state failed.
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl UiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        UiError::Validation { field: field.to_string(), message: message.into() }
    }

    /// Build an error from a non-2xx response, pulling the server message out of
    /// the known body shapes: `{"error": "..."}`, `{"error": {"message": "..."}}`,
    /// `{"detail": "..."}` or `{"message": "..."}`. Falls back to the raw text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_error_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP error {}", status)
            } else {
                trimmed.to_string()
            }
        });
        UiError::Http { status, message }
    }

    /// True when retrying against another resource (e.g. the root folder) makes sense.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UiError::NotFound(_) | UiError::Http { status: 404, .. })
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    error_message_from_value(&v)
}

pub(crate) fn error_message_from_value(v: &Value) -> Option<String> {
    match v.get("error") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(obj)) => {
            if let Some(msg) = obj.get("message").and_then(|m| m.as_str()) {
                return Some(msg.to_string());
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => return Some(other.to_string()),
    }
    for key in ["detail", "message"] {
        if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
            return Some(s.to_string());
        }
    }
    None
}

impl From<serde_json::Error> for UiError {
    fn from(err: serde_json::Error) -> Self {
        UiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError::Storage(format!("{}: {}", err.kind(), err))
    }
}

/// A type alias for `Result<T, UiError>`, used throughout the client.
pub type UiResult<T> = Result<T, UiError>;

/// Converts an `Option` into a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> UiResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> UiResult<T> {
        self.ok_or_else(|| UiError::NotFound(format!("{} not found", entity)))
    }
}
