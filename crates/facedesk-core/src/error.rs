use thiserror::Error;

/// Generic message shown when a request fails without a backend-provided reason.
pub const CONNECT_FAILED: &str = "Failed to connect to recognition service";

/// Failure of a single backend request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network unreachable, connection reset, or the request could not be built.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx response. `message` is the body's `error` field when it had one.
    #[error("backend returned HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },
    /// 2xx response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The error text the backend supplied, if any. An empty string counts as none.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Message to show a user: the backend's own error verbatim, otherwise `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.backend_message().unwrap_or(fallback)
    }
}

/// Failure to select a local file for upload.
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not an image file: {0} (supports JPG, PNG, WebP and other common formats)")]
    NotAnImage(String),
}
