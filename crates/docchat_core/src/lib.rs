//! Docchat core: pure interaction state machine and view-model helpers.
mod document;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use document::{DocumentFile, ValidationError, ACCEPTED_CONTENT_TYPE, MAX_DOCUMENT_BYTES};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    Activity, AppState, ChatReply, ErrorNotice, ExchangeKind, Message, Phase, Role, Session,
    SourceSnippet, Sources, UploadedDocument, PROGRESS_CEILING,
};
pub use update::update;
pub use view_model::{
    escape_html, truncate_for_display, AppViewModel, ErrorView, MessageView, SessionHeader,
    SourceView, SourcesPanel, StatusTier, StatusView, CHAT_GREETING, NO_SOURCES_FOUND,
    SOURCES_PLACEHOLDER, SOURCE_PREVIEW_CHARS,
};
