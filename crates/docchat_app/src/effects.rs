use std::sync::Arc;
use std::time::Duration;

use docchat_core::{ChatReply, DocumentFile, Effect, Msg, SourceSnippet, UploadedDocument};
use docchat_engine::{Backend, ChatAnswer, DocumentUpload, ProgressTicker, Source, UploadReceipt};
use docchat_logging::{chat_debug, chat_info, chat_warn};
use tokio::sync::mpsc::UnboundedSender;

const UPLOAD_ABANDONED: &str = "Upload failed";
const CHAT_ABANDONED: &str = "Chat request failed";

/// Executes IO effects and reports their outcome back as messages.
pub(crate) struct EffectRunner {
    backend: Arc<dyn Backend>,
    msg_tx: UnboundedSender<Msg>,
    progress_interval: Duration,
    progress: Option<ProgressTicker>,
}

impl EffectRunner {
    pub(crate) fn new(
        backend: Arc<dyn Backend>,
        msg_tx: UnboundedSender<Msg>,
        progress_interval: Duration,
    ) -> Self {
        Self {
            backend,
            msg_tx,
            progress_interval,
            progress: None,
        }
    }

    /// Must run inside a tokio runtime: exchanges are spawned as tasks.
    pub(crate) fn run(&mut self, effect: Effect) {
        match effect {
            Effect::UploadDocument(file) => {
                chat_info!("Upload started: {} ({} bytes)", file.filename, file.size());
                let backend = self.backend.clone();
                let guard = ExchangeGuard::new(
                    self.msg_tx.clone(),
                    Msg::UploadFinished(Err(UPLOAD_ABANDONED.to_string())),
                );
                tokio::spawn(async move {
                    let result = backend
                        .upload(to_upload(file))
                        .await
                        .map(map_receipt)
                        .map_err(|err| {
                            chat_warn!("Upload failed ({}): {}", err.kind, err);
                            err.message
                        });
                    guard.complete(Msg::UploadFinished(result));
                });
            }
            Effect::PostMessage {
                session_id,
                message,
            } => {
                chat_debug!("Chat exchange started for session {}", session_id);
                let backend = self.backend.clone();
                let guard = ExchangeGuard::new(
                    self.msg_tx.clone(),
                    Msg::ChatFinished(Err(CHAT_ABANDONED.to_string())),
                );
                tokio::spawn(async move {
                    let result = backend
                        .chat(&session_id, &message)
                        .await
                        .map(map_answer)
                        .map_err(|err| {
                            chat_warn!("Chat failed ({}): {}", err.kind, err);
                            err.message
                        });
                    guard.complete(Msg::ChatFinished(result));
                });
            }
            Effect::ClearSession { session_id } => {
                let backend = self.backend.clone();
                let guard = ExchangeGuard::new(self.msg_tx.clone(), Msg::ClearFinished);
                tokio::spawn(async move {
                    // Best effort: the local reset happens regardless.
                    if let Err(err) = backend.clear_session(&session_id).await {
                        chat_warn!("Failed to clear session {}: {}", session_id, err);
                    }
                    guard.complete(Msg::ClearFinished);
                });
            }
            Effect::StartProgress => {
                self.stop_progress();
                let msg_tx = self.msg_tx.clone();
                self.progress = Some(ProgressTicker::spawn(
                    self.progress_interval,
                    move |increment| msg_tx.send(Msg::ProgressTick { increment }).is_ok(),
                ));
            }
            Effect::StopProgress => self.stop_progress(),
            Effect::FocusInput => {
                // Needs the view; handled by the controller.
            }
        }
    }

    pub(crate) fn progress_running(&self) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|ticker| !ticker.is_cancelled())
    }

    fn stop_progress(&mut self) {
        if let Some(ticker) = self.progress.take() {
            ticker.cancel();
        }
    }
}

/// Guarantees that a spawned exchange reports exactly one completion.
///
/// If the task ends without calling [`ExchangeGuard::complete`] (a panic in
/// the backend, or the task being dropped by a shutting-down runtime), the
/// fallback message is sent from `Drop` so the processing guard is released.
struct ExchangeGuard {
    msg_tx: UnboundedSender<Msg>,
    fallback: Option<Msg>,
}

impl ExchangeGuard {
    fn new(msg_tx: UnboundedSender<Msg>, fallback: Msg) -> Self {
        Self {
            msg_tx,
            fallback: Some(fallback),
        }
    }

    fn complete(mut self, msg: Msg) {
        self.fallback = None;
        let _ = self.msg_tx.send(msg);
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        if let Some(msg) = self.fallback.take() {
            chat_warn!("Exchange ended without reporting; releasing guard");
            let _ = self.msg_tx.send(msg);
        }
    }
}

fn to_upload(file: DocumentFile) -> DocumentUpload {
    DocumentUpload {
        filename: file.filename,
        content_type: file.content_type,
        bytes: file.bytes,
    }
}

fn map_receipt(receipt: UploadReceipt) -> UploadedDocument {
    UploadedDocument {
        session_id: receipt.session_id,
        filename: receipt.filename,
        chunks_count: receipt.chunks_count,
    }
}

fn map_answer(answer: ChatAnswer) -> ChatReply {
    ChatReply {
        response: answer.response,
        sources: answer.sources.into_iter().map(map_source).collect(),
    }
}

fn map_source(source: Source) -> SourceSnippet {
    SourceSnippet {
        text: source.text,
        page: source.page,
        score: source.score,
    }
}
