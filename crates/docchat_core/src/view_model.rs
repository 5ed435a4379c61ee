//! Derivation of everything the view shows from the current state.
//!
//! All text in an [`AppViewModel`] is already HTML-escaped, whether it came
//! from the user or the backend. Renderers may insert it as markup.
use std::borrow::Cow;

use crate::state::Outcome;
use crate::{Activity, AppState, ExchangeKind, Phase, Role, SourceSnippet, Sources};

/// Display length of a source excerpt before it is cut.
pub const SOURCE_PREVIEW_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

pub const SOURCES_PLACEHOLDER: &str = "Sources will appear here when you ask questions";
pub const NO_SOURCES_FOUND: &str = "No specific sources found for this query";
/// Heads the chat log for as long as a document is loaded. Free of markup
/// characters, so it needs no escaping.
pub const CHAT_GREETING: &str =
    "Your document is ready. Ask anything about it and the passages behind each answer will be listed alongside.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTier {
    Ready,
    Warning,
    Info,
    Danger,
    Neutral,
}

impl StatusTier {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTier::Ready => "ready",
            StatusTier::Warning => "warning",
            StatusTier::Info => "info",
            StatusTier::Danger => "danger",
            StatusTier::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub label: &'static str,
    pub tier: StatusTier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    pub title: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub role: Role,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceView {
    pub excerpt: String,
    pub page_label: String,
    pub relevance_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcesPanel {
    Placeholder(&'static str),
    Entries(Vec<SourceView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub upload_visible: bool,
    /// Chat log, sources panel and the clear button share this flag.
    pub chat_visible: bool,
    pub session_header: Option<SessionHeader>,
    /// Survives every reset of the message log while a session exists.
    pub greeting: Option<&'static str>,
    pub messages: Vec<MessageView>,
    pub loading: bool,
    pub sources: SourcesPanel,
    pub status: StatusView,
    /// Whole percent, present exactly while an upload is pending.
    pub progress: Option<u8>,
    pub controls_enabled: bool,
    /// Raw input buffer; an input value is never interpreted as markup.
    pub input: String,
    pub error: Option<ErrorView>,
}

impl Default for AppViewModel {
    fn default() -> Self {
        AppState::new().view()
    }
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let session = state.session();
    AppViewModel {
        upload_visible: session.is_none(),
        chat_visible: session.is_some(),
        session_header: session.map(|session| SessionHeader {
            title: format!("Chat with: {}", escape_html(&session.filename)),
            info: format!("{} content chunks processed", session.chunks_count),
        }),
        greeting: session.map(|_| CHAT_GREETING),
        messages: state
            .messages()
            .iter()
            .map(|message| MessageView {
                role: message.role,
                html: escape_html(&message.content),
            })
            .collect(),
        loading: state.is_loading(),
        sources: sources_panel(state.sources()),
        status: status_for(state),
        progress: state.progress().map(|value| value.clamp(0.0, 100.0) as u8),
        controls_enabled: !state.has_pending_exchange(),
        input: state.input().to_string(),
        error: state.error().map(|notice| ErrorView {
            seq: notice.seq,
            text: escape_html(&notice.text),
        }),
    }
}

fn status_for(state: &AppState) -> StatusView {
    let (label, tier) = match (state.phase(), state.activity()) {
        (_, Activity::Busy(ExchangeKind::Upload)) => ("Uploading...", StatusTier::Warning),
        (_, Activity::Busy(ExchangeKind::Chat)) => ("Thinking...", StatusTier::Info),
        (Phase::Clearing, Activity::Idle) => ("Clearing...", StatusTier::Neutral),
        _ => match state.outcome() {
            Outcome::Failed => ("Error", StatusTier::Danger),
            Outcome::Succeeded => ("Ready", StatusTier::Ready),
            Outcome::None => ("Ready", StatusTier::Neutral),
        },
    };
    StatusView { label, tier }
}

fn sources_panel(sources: &Sources) -> SourcesPanel {
    match sources {
        Sources::NotAsked => SourcesPanel::Placeholder(SOURCES_PLACEHOLDER),
        Sources::NoneFound => SourcesPanel::Placeholder(NO_SOURCES_FOUND),
        Sources::Found(snippets) => {
            SourcesPanel::Entries(snippets.iter().map(source_view).collect())
        }
    }
}

fn source_view(snippet: &SourceSnippet) -> SourceView {
    let relevance = match snippet.score {
        Some(score) if score.fract() == 0.0 => format!("{score:.0}"),
        Some(score) => format!("{score:.2}"),
        None => "High".to_string(),
    };
    SourceView {
        excerpt: escape_html(&truncate_for_display(&snippet.text, SOURCE_PREVIEW_CHARS)),
        page_label: format!("Page {}", snippet.page),
        relevance_label: format!("Relevance: {relevance}"),
    }
}

/// Escapes text so it can be inserted into markup without being interpreted.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cuts `text` to `max_chars` characters and appends `...` when it was longer.
pub fn truncate_for_display(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((end, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &text[..end])),
    }
}
