use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Payload for the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub session_id: String,
    pub filename: String,
    pub chunks_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Source {
    pub text: String,
    pub page: u32,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatAnswer {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClearRequest<'a> {
    pub session_id: &'a str,
}

/// Upload body as the backend sends it; failures come back in the same shape.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadBody {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub chunks_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// A failed exchange. `message` is what the user gets to see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExchangeError {
    pub kind: FailureKind,
    pub message: String,
}

impl ExchangeError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, reset, DNS and similar.
    Transport,
    Timeout,
    /// Non-success status; the message comes from the body when it has one.
    HttpStatus(u16),
    /// Success status but a body we could not use.
    InvalidResponse,
    /// The request could not be built (bad URL, bad content type).
    InvalidRequest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
        }
    }
}
