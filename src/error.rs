//! Unified error types for the console API layer.

use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors surfaced by the request dispatcher.
#[derive(Debug)]
pub enum ApiError {
    /// No usable response arrived (connect, DNS, TLS, timeout, reset).
    Http(reqwest::Error),
    /// Non-2xx status from the backend.
    Status {
        code: u16,
        body: String,
        content_type: Option<String>,
    },
    /// 401 handled by redirecting to the configured login flow.
    SessionExpired { redirect_to: String },
    /// The request could not be built (bad URL, unencodable params).
    InvalidRequest(String),
    /// A 2xx response whose body could not be read.
    InvalidResponse(String),
}

impl ApiError {
    /// Construct a status error from response parts.
    pub fn status(code: u16, body: String, content_type: Option<String>) -> Self {
        Self::Status {
            code,
            body,
            content_type,
        }
    }

    /// HTTP status carried by this error, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(inner) => inner.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Structured application error code from a JSON error body.
    ///
    /// The backend's gateway encodes deliberate rejections as
    /// `{"code": <n>, "message": "..."}`; a bare 5xx from a proxy carries none.
    pub fn application_code(&self) -> Option<Value> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let parsed: Value = serde_json::from_str(body).ok()?;
        parsed
            .get("code")
            .filter(|code| !code.is_null())
            .cloned()
    }

    /// Best-effort human-readable message for notification hooks.
    ///
    /// Prefers a JSON `message` field, then the raw body, and finally the
    /// error's own description. HTML bodies (proxy error pages) collapse to
    /// an empty string.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                body, content_type, ..
            } if !body.is_empty() => {
                if let Ok(parsed) = serde_json::from_str::<Value>(body) {
                    match parsed.get("message") {
                        Some(Value::String(message)) if !message.is_empty() => {
                            return message.clone()
                        }
                        Some(other) if !other.is_null() && !other.is_string() => {
                            return other.to_string()
                        }
                        _ => {}
                    }
                }
                if content_type
                    .as_deref()
                    .is_some_and(|ct| ct.trim().starts_with("text/html"))
                {
                    return String::new();
                }
                body.clone()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } if body.is_empty() => {
                write!(f, "request failed with status code {code}")
            }
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::SessionExpired { redirect_to } => {
                write!(f, "session expired; redirecting to {redirect_to}")
            }
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}
