use std::time::Duration;

use docchat_logging::{chat_debug, chat_info, chat_warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{ChatRequest, ClearRequest, ErrorBody, UploadBody};
use crate::{ChatAnswer, DocumentUpload, ExchangeError, FailureKind, UploadReceipt};

const UPLOAD_PATH: &str = "upload";
const CHAT_PATH: &str = "chat";
const CLEAR_PATH: &str = "clear_session";

const UPLOAD_FALLBACK: &str = "Upload failed";
const CHAT_FALLBACK: &str = "Chat request failed";
const CLEAR_FALLBACK: &str = "Failed to clear session";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Always ends with `/` so endpoint paths join beneath it.
    base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExchangeError> {
        self.base_url
            .join(path)
            .map_err(|err| ExchangeError::new(FailureKind::InvalidRequest, err.to_string()))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The three backend operations the controller relies on.
///
/// Implementations never retry; a timeout, if any, is the transport's business.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn upload(&self, document: DocumentUpload) -> Result<UploadReceipt, ExchangeError>;

    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatAnswer, ExchangeError>;

    async fn clear_session(&self, session_id: &str) -> Result<(), ExchangeError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ExchangeError::new(FailureKind::Transport, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn upload(&self, document: DocumentUpload) -> Result<UploadReceipt, ExchangeError> {
        let url = self.settings.endpoint(UPLOAD_PATH)?;
        chat_debug!(
            "Uploading {} ({} bytes) to {}",
            document.filename,
            document.bytes.len(),
            url
        );

        let part = Part::bytes(document.bytes.to_vec())
            .file_name(document.filename.clone())
            .mime_str(&document.content_type)
            .map_err(|err| ExchangeError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body: UploadBody = read_json(response, UPLOAD_FALLBACK).await?;
        let receipt = match body.session_id.filter(|id| !id.is_empty()) {
            Some(session_id) => UploadReceipt {
                session_id,
                filename: body.filename.unwrap_or(document.filename),
                chunks_count: body.chunks_count.unwrap_or(0),
            },
            None => {
                let message = body.error.unwrap_or_else(|| UPLOAD_FALLBACK.to_string());
                return Err(ExchangeError::new(FailureKind::InvalidResponse, message));
            }
        };
        chat_info!(
            "Upload accepted: session={} chunks={}",
            receipt.session_id,
            receipt.chunks_count
        );
        Ok(receipt)
    }

    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatAnswer, ExchangeError> {
        let url = self.settings.endpoint(CHAT_PATH)?;
        chat_debug!("Posting message ({} chars) for session {}", message.len(), session_id);

        let response = self
            .client
            .post(url)
            .json(&ChatRequest {
                message,
                session_id,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let answer: ChatAnswer = read_json(response, CHAT_FALLBACK).await?;
        chat_info!(
            "Answer received for session {}: {} sources",
            session_id,
            answer.sources.len()
        );
        Ok(answer)
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), ExchangeError> {
        let url = self.settings.endpoint(CLEAR_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&ClearRequest { session_id })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            chat_warn!("Clear for session {} answered {}", session_id, status);
            return Err(ExchangeError::new(
                FailureKind::HttpStatus(status.as_u16()),
                CLEAR_FALLBACK,
            ));
        }
        Ok(())
    }
}

/// Reads the whole body; non-success statuses become errors carrying the
/// body's `error` field, or `fallback` when there is none.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ExchangeError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        chat_warn!("Backend answered {}: {}", status, message);
        return Err(ExchangeError::new(
            FailureKind::HttpStatus(status.as_u16()),
            message,
        ));
    }

    serde_json::from_slice(&body).map_err(|err| {
        ExchangeError::new(
            FailureKind::InvalidResponse,
            format!("Invalid response from server: {err}"),
        )
    })
}

fn map_reqwest_error(err: reqwest::Error) -> ExchangeError {
    if err.is_timeout() {
        return ExchangeError::new(FailureKind::Timeout, "Request timed out");
    }
    ExchangeError::new(FailureKind::Transport, format!("Network error: {err}"))
}
