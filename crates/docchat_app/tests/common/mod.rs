#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use docchat_app::{ControllerSettings, InteractionController, ViewPort};
use docchat_core::{Role, SourceView, StatusTier};
use docchat_engine::{
    Backend, ChatAnswer, DocumentUpload, ExchangeError, FailureKind, UploadReceipt,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docchat_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    ShowUpload,
    ShowChat,
    SessionInfo(String, String),
    ClearMessages,
    Greeting(String),
    Append(Role, String),
    Loading(bool),
    Sources(Vec<SourceView>),
    SourcesPlaceholder(String),
    Status(String, StatusTier),
    Progress(Option<u8>),
    ControlsEnabled(bool),
    InputText(String),
    FocusInput,
    ShowError(String),
    HideError,
}

/// Records every call and keeps a model of what a real view would show.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
    pub chat_visible: bool,
    pub session_info: Option<(String, String)>,
    pub greeting: Option<String>,
    pub log: Vec<(Role, String)>,
    pub loading: bool,
    pub sources: Vec<SourceView>,
    pub sources_placeholder: Option<String>,
    pub status: Option<(String, StatusTier)>,
    pub progress: Option<u8>,
    pub controls_enabled: bool,
    pub error: Option<String>,
}

impl RecordingView {
    pub fn take_calls(&mut self) -> Vec<ViewCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn status_label(&self) -> &str {
        self.status.as_ref().map(|(label, _)| label.as_str()).unwrap_or("")
    }

    pub fn status_tier(&self) -> Option<StatusTier> {
        self.status.as_ref().map(|(_, tier)| *tier)
    }
}

impl ViewPort for RecordingView {
    fn show_upload_view(&mut self) {
        self.chat_visible = false;
        self.calls.push(ViewCall::ShowUpload);
    }

    fn show_chat_view(&mut self) {
        self.chat_visible = true;
        self.calls.push(ViewCall::ShowChat);
    }

    fn set_session_info(&mut self, title: &str, info: &str) {
        self.session_info = Some((title.to_string(), info.to_string()));
        self.calls
            .push(ViewCall::SessionInfo(title.to_string(), info.to_string()));
    }

    fn clear_messages(&mut self) {
        self.log.clear();
        self.greeting = None;
        self.calls.push(ViewCall::ClearMessages);
    }

    fn show_greeting(&mut self, html: &str) {
        assert!(self.log.is_empty(), "greeting shown below existing messages");
        self.greeting = Some(html.to_string());
        self.calls.push(ViewCall::Greeting(html.to_string()));
    }

    fn append_message(&mut self, role: Role, html: &str) {
        assert!(!self.loading, "message appended behind the loading placeholder");
        self.log.push((role, html.to_string()));
        self.calls.push(ViewCall::Append(role, html.to_string()));
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.calls.push(ViewCall::Loading(loading));
    }

    fn set_sources(&mut self, sources: &[SourceView]) {
        self.sources = sources.to_vec();
        self.sources_placeholder = None;
        self.calls.push(ViewCall::Sources(sources.to_vec()));
    }

    fn set_sources_placeholder(&mut self, text: &str) {
        self.sources.clear();
        self.sources_placeholder = Some(text.to_string());
        self.calls.push(ViewCall::SourcesPlaceholder(text.to_string()));
    }

    fn set_status(&mut self, label: &str, tier: StatusTier) {
        self.status = Some((label.to_string(), tier));
        self.calls.push(ViewCall::Status(label.to_string(), tier));
    }

    fn set_progress(&mut self, percent: Option<u8>) {
        self.progress = percent;
        self.calls.push(ViewCall::Progress(percent));
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        self.calls.push(ViewCall::ControlsEnabled(enabled));
    }

    fn set_input_text(&mut self, text: &str) {
        self.calls.push(ViewCall::InputText(text.to_string()));
    }

    fn focus_input(&mut self) {
        self.calls.push(ViewCall::FocusInput);
    }

    fn show_error_notice(&mut self, text: &str) {
        self.error = Some(text.to_string());
        self.calls.push(ViewCall::ShowError(text.to_string()));
    }

    fn hide_error_notice(&mut self) {
        self.error = None;
        self.calls.push(ViewCall::HideError);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Upload { filename: String, size: usize },
    Chat { session_id: String, message: String },
    Clear { session_id: String },
}

/// Backend fake answering from queued responses.
#[derive(Default)]
pub struct ScriptedBackend {
    uploads: Mutex<VecDeque<Result<UploadReceipt, ExchangeError>>>,
    chats: Mutex<VecDeque<Result<ChatAnswer, ExchangeError>>>,
    clear_failure: Mutex<Option<ExchangeError>>,
    panic_on_chat: Mutex<bool>,
    calls: Mutex<Vec<BackendCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_upload(&self, result: Result<UploadReceipt, ExchangeError>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_chat(&self, result: Result<ChatAnswer, ExchangeError>) {
        self.chats.lock().unwrap().push_back(result);
    }

    pub fn fail_clear(&self, error: ExchangeError) {
        *self.clear_failure.lock().unwrap() = Some(error);
    }

    pub fn panic_on_chat(&self) {
        *self.panic_on_chat.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn unscripted() -> ExchangeError {
        ExchangeError::new(FailureKind::Transport, "Network error: no scripted response")
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn upload(&self, document: DocumentUpload) -> Result<UploadReceipt, ExchangeError> {
        self.calls.lock().unwrap().push(BackendCall::Upload {
            filename: document.filename,
            size: document.bytes.len(),
        });
        let next = self.uploads.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatAnswer, ExchangeError> {
        self.calls.lock().unwrap().push(BackendCall::Chat {
            session_id: session_id.to_string(),
            message: message.to_string(),
        });
        if *self.panic_on_chat.lock().unwrap() {
            panic!("scripted backend panic");
        }
        let next = self.chats.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), ExchangeError> {
        self.calls.lock().unwrap().push(BackendCall::Clear {
            session_id: session_id.to_string(),
        });
        match self.clear_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn controller(backend: &Arc<ScriptedBackend>) -> InteractionController<RecordingView> {
    init_logging();
    let settings = ControllerSettings {
        progress_interval: Duration::from_millis(5),
    };
    InteractionController::new(RecordingView::default(), backend.clone(), settings)
}

pub fn receipt() -> UploadReceipt {
    UploadReceipt {
        session_id: "abc123".to_string(),
        filename: "report.pdf".to_string(),
        chunks_count: 42,
    }
}
