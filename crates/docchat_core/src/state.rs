use crate::view_model::{self, AppViewModel};

/// Simulated progress never reaches completion on its own.
pub const PROGRESS_CEILING: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NoSession,
    Uploading,
    HasSession,
    Clearing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Upload,
    Chat,
}

/// The processing guard: at most one upload or chat exchange in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Busy(ExchangeKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub filename: String,
    pub chunks_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSnippet {
    pub text: String,
    pub page: u32,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub session_id: String,
    pub filename: String,
    pub chunks_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<SourceSnippet>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Sources {
    /// Nothing asked yet for this document.
    #[default]
    NotAsked,
    /// The last answer cited nothing.
    NoneFound,
    Found(Vec<SourceSnippet>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Outcome {
    #[default]
    None,
    Succeeded,
    Failed,
}

/// Single-slot error notice. `seq` changes on every error so that a repeated
/// identical message is still shown again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    activity: Activity,
    session: Option<Session>,
    messages: Vec<Message>,
    loading: bool,
    sources: Sources,
    input: String,
    progress: Option<f32>,
    error: Option<ErrorNotice>,
    error_seq: u64,
    outcome: Outcome,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.activity, Activity::Busy(_))
    }

    /// True while any exchange (including a clear notification) is outstanding.
    pub fn has_pending_exchange(&self) -> bool {
        self.is_processing() || self.phase == Phase::Clearing
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_exchange(&mut self, kind: ExchangeKind) {
        self.activity = Activity::Busy(kind);
        self.mark_dirty();
    }

    /// Leaves `Busy` and drops everything that only exists while an exchange
    /// is pending.
    pub(crate) fn release_exchange(&mut self) {
        self.activity = Activity::Idle;
        self.loading = false;
        self.progress = None;
        self.mark_dirty();
    }

    pub(crate) fn begin_upload(&mut self) {
        self.phase = Phase::Uploading;
        self.progress = Some(0.0);
        self.begin_exchange(ExchangeKind::Upload);
    }

    pub(crate) fn advance_progress(&mut self, increment: f32) {
        if let Some(progress) = self.progress.as_mut() {
            *progress = (*progress + increment.max(0.0)).min(PROGRESS_CEILING);
            self.mark_dirty();
        }
    }

    pub(crate) fn open_session(&mut self, uploaded: UploadedDocument) {
        self.session = Some(Session {
            id: uploaded.session_id,
            filename: uploaded.filename,
            chunks_count: uploaded.chunks_count,
        });
        self.phase = Phase::HasSession;
        self.messages.clear();
        self.sources = Sources::NotAsked;
        self.outcome = Outcome::Succeeded;
        self.mark_dirty();
    }

    pub(crate) fn push_message(&mut self, role: Role, content: String) {
        self.messages.push(Message { role, content });
        self.mark_dirty();
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.mark_dirty();
    }

    pub(crate) fn replace_sources(&mut self, sources: Vec<SourceSnippet>) {
        self.sources = if sources.is_empty() {
            Sources::NoneFound
        } else {
            Sources::Found(sources)
        };
        self.mark_dirty();
    }

    pub(crate) fn succeed(&mut self) {
        self.outcome = Outcome::Succeeded;
        self.mark_dirty();
    }

    /// Records an error in the single notice slot. Session state is untouched.
    pub(crate) fn fail(&mut self, message: String) {
        self.error_seq += 1;
        self.error = Some(ErrorNotice {
            seq: self.error_seq,
            text: message,
        });
        self.outcome = Outcome::Failed;
        self.mark_dirty();
    }

    pub(crate) fn dismiss_error(&mut self) {
        if self.error.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_clear(&mut self) {
        self.phase = Phase::Clearing;
        self.mark_dirty();
    }

    pub(crate) fn return_to_no_session(&mut self) {
        self.phase = Phase::NoSession;
        self.mark_dirty();
    }

    /// Local reset after a clear; runs whatever the backend said.
    pub(crate) fn reset_session(&mut self) {
        self.session = None;
        self.phase = Phase::NoSession;
        self.messages.clear();
        self.loading = false;
        self.sources = Sources::NotAsked;
        self.input.clear();
        self.outcome = Outcome::None;
        self.mark_dirty();
    }
}
