use std::fmt;

use copilot_protocol::sse::SseLineTooLong;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A non-200 backend response, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status_code: u16,
    /// Status line, e.g. `"429 Too Many Requests"`.
    pub status: String,
    /// Raw response body.
    pub message: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for StatusError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ReadTimeout,
    Connect,
    Dns,
    Tls,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum CopilotError {
    /// No HTTP response was obtained, or the body could not be read.
    #[error(transparent)]
    Transport(#[from] wreq::Error),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("decode backend response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("chat response handler failed: {0}")]
    Callback(#[source] BoxError),
    #[error(transparent)]
    LineTooLong(#[from] SseLineTooLong),
    #[error("access token is not a valid header value")]
    InvalidToken,
    #[error("request cancelled")]
    Cancelled,
}

impl CopilotError {
    pub fn status(&self) -> Option<&StatusError> {
        match self {
            CopilotError::Status(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CopilotError::Cancelled)
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            CopilotError::Transport(err) => Some(classify_wreq_error(err)),
            _ => None,
        }
    }
}

fn classify_wreq_error(err: &wreq::Error) -> TransportErrorKind {
    let message = err.to_string().to_ascii_lowercase();
    if err.is_timeout() {
        if message.contains("read") || message.contains("idle") {
            return TransportErrorKind::ReadTimeout;
        }
        return TransportErrorKind::Timeout;
    }
    if err.is_connect() {
        if message.contains("dns") || message.contains("resolve") {
            return TransportErrorKind::Dns;
        }
        if message.contains("tls") || message.contains("ssl") {
            return TransportErrorKind::Tls;
        }
        return TransportErrorKind::Connect;
    }
    if err.is_connection_reset() {
        return TransportErrorKind::Connect;
    }
    if message.contains("tls") || message.contains("ssl") {
        return TransportErrorKind::Tls;
    }
    TransportErrorKind::Other
}
