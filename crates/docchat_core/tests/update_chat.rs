use std::sync::Once;

use docchat_core::{
    update, AppState, ChatReply, DocumentFile, Effect, Msg, Phase, Role, SourceSnippet,
    SourcesPanel, StatusTier, UploadedDocument, ACCEPTED_CONTENT_TYPE, NO_SOURCES_FOUND,
    SOURCES_PLACEHOLDER,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docchat_logging::initialize_for_tests);
}

fn with_session() -> AppState {
    let file = DocumentFile::new("report.pdf", ACCEPTED_CONTENT_TYPE, vec![1u8; 16]);
    let (state, _) = update(AppState::new(), Msg::FileSelected(file));
    let (state, _) = update(
        state,
        Msg::UploadFinished(Ok(UploadedDocument {
            session_id: "abc123".to_string(),
            filename: "report.pdf".to_string(),
            chunks_count: 42,
        })),
    );
    state
}

fn type_and_send(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(text.to_string()));
    update(state, Msg::SendClicked)
}

#[test]
fn send_echoes_user_message_and_posts() {
    init_logging();
    let (state, effects) = type_and_send(with_session(), "  What is the summary?  ");

    assert_eq!(
        effects,
        vec![Effect::PostMessage {
            session_id: "abc123".to_string(),
            message: "What is the summary?".to_string(),
        }]
    );
    assert!(state.is_processing());
    assert!(state.is_loading());
    assert_eq!(state.input(), "");
    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.messages()[0].role, Role::User);

    let view = state.view();
    assert_eq!(view.status.label, "Thinking...");
    assert_eq!(view.status.tier, StatusTier::Info);
    assert!(view.loading);
    assert!(!view.controls_enabled);
}

#[test]
fn reply_appends_assistant_and_replaces_sources() {
    init_logging();
    let (state, _) = type_and_send(with_session(), "What is the summary?");
    let (state, effects) = update(
        state,
        Msg::ChatFinished(Ok(ChatReply {
            response: "It covers...".to_string(),
            sources: vec![SourceSnippet {
                text: "Quarterly results".to_string(),
                page: 3,
                score: None,
            }],
        })),
    );

    assert_eq!(effects, vec![Effect::FocusInput]);
    assert!(!state.is_processing());
    let view = state.view();
    let roles: Vec<_> = view.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(view.messages[1].html, "It covers...");
    assert!(!view.loading);
    assert_eq!(view.status.tier, StatusTier::Ready);
    match view.sources {
        SourcesPanel::Entries(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].page_label, "Page 3");
        }
        other => panic!("expected entries, got {other:?}"),
    }

    // The next answer replaces, not merges.
    let (state, _) = type_and_send(state, "And page 4?");
    let (state, _) = update(
        state,
        Msg::ChatFinished(Ok(ChatReply {
            response: "Nothing there.".to_string(),
            sources: Vec::new(),
        })),
    );
    assert_eq!(
        state.view().sources,
        SourcesPanel::Placeholder(NO_SOURCES_FOUND)
    );
}

#[test]
fn failure_keeps_user_message_and_releases_guard() {
    init_logging();
    let (state, _) = type_and_send(with_session(), "What is the summary?");
    let (state, effects) = update(
        state,
        Msg::ChatFinished(Err("session expired".to_string())),
    );

    assert_eq!(effects, vec![Effect::FocusInput]);
    assert!(!state.is_processing());
    assert_eq!(state.phase(), Phase::HasSession);
    let view = state.view();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].role, Role::User);
    assert!(!view.loading);
    assert_eq!(view.error.unwrap().text, "session expired");
    assert_eq!(view.status.label, "Error");
    assert_eq!(view.status.tier, StatusTier::Danger);
    assert!(view.controls_enabled);
}

#[test]
fn blank_input_never_sends() {
    init_logging();
    for text in ["", "   ", "\n\t "] {
        let (state, effects) = type_and_send(with_session(), text);
        assert!(effects.is_empty());
        assert!(state.messages().is_empty());
        assert!(!state.is_processing());
    }
}

#[test]
fn send_while_busy_is_dropped() {
    init_logging();
    let (state, _) = type_and_send(with_session(), "first");
    let before = state.clone();

    let (state, effects) = type_and_send(state, "second");
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn send_without_session_is_refused() {
    init_logging();
    let (state, effects) = type_and_send(AppState::new(), "hello");
    assert!(effects.is_empty());
    assert!(state.messages().is_empty());
}

#[test]
fn markup_in_messages_is_inert() {
    init_logging();
    let (state, _) = type_and_send(with_session(), "<script>alert(1)</script>");
    let view = state.view();

    assert_eq!(state.messages()[0].content, "<script>alert(1)</script>");
    assert_eq!(view.messages[0].html, "&lt;script&gt;alert(1)&lt;/script&gt;");
}

#[test]
fn long_sources_are_truncated_for_display_only() {
    init_logging();
    let long_text = format!("<b>{}</b>", "x".repeat(400));
    let (state, _) = type_and_send(with_session(), "q");
    let (state, _) = update(
        state,
        Msg::ChatFinished(Ok(ChatReply {
            response: "a".to_string(),
            sources: vec![SourceSnippet {
                text: long_text.clone(),
                page: 1,
                score: Some(2.0),
            }],
        })),
    );

    let SourcesPanel::Entries(entries) = state.view().sources else {
        panic!("expected entries");
    };
    assert!(entries[0].excerpt.starts_with("&lt;b&gt;"));
    assert!(entries[0].excerpt.ends_with("..."));
    assert_eq!(entries[0].relevance_label, "Relevance: 2");

    match state.sources() {
        docchat_core::Sources::Found(snippets) => assert_eq!(snippets[0].text, long_text),
        other => panic!("unexpected sources {other:?}"),
    }
}

#[test]
fn clear_resets_to_upload_view() {
    init_logging();
    let (state, _) = type_and_send(with_session(), "q");
    let (state, _) = update(
        state,
        Msg::ChatFinished(Ok(ChatReply {
            response: "a".to_string(),
            sources: Vec::new(),
        })),
    );

    let (state, effects) = update(state, Msg::ClearClicked);
    assert_eq!(
        effects,
        vec![Effect::ClearSession {
            session_id: "abc123".to_string()
        }]
    );
    assert_eq!(state.phase(), Phase::Clearing);
    assert!(!state.view().controls_enabled);

    let (state, effects) = update(state, Msg::ClearFinished);
    assert!(effects.is_empty());
    assert_eq!(state.session_id(), None);
    let view = state.view();
    assert!(view.upload_visible);
    assert!(!view.chat_visible);
    assert!(view.messages.is_empty());
    assert_eq!(view.sources, SourcesPanel::Placeholder(SOURCES_PLACEHOLDER));
    assert_eq!(view.status.label, "Ready");
    assert_eq!(view.status.tier, StatusTier::Neutral);
}

#[test]
fn clear_is_noop_without_session_or_while_busy() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ClearClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::NoSession);

    let (state, _) = type_and_send(with_session(), "q");
    let (state, effects) = update(state, Msg::ClearClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::HasSession);
}
