use crate::{Activity, AppState, Effect, ExchangeKind, Msg, Phase, Role};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every arm that leaves `Activity::Busy` does so for both the success and the
/// failure branch, so the processing guard can never stay set after a
/// completion message.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            // Upload view is only reachable with no session and nothing in flight.
            if state.is_processing() || state.phase() != Phase::NoSession {
                return (state, Vec::new());
            }
            if let Err(err) = file.validate() {
                state.fail(err.to_string());
                return (state, Vec::new());
            }
            state.begin_upload();
            vec![Effect::StartProgress, Effect::UploadDocument(file)]
        }
        Msg::UploadFinished(result) => {
            if state.activity() != Activity::Busy(ExchangeKind::Upload) {
                return (state, Vec::new());
            }
            state.release_exchange();
            match result {
                Ok(uploaded) => {
                    state.open_session(uploaded);
                    vec![Effect::StopProgress, Effect::FocusInput]
                }
                Err(message) => {
                    state.return_to_no_session();
                    state.fail(message);
                    vec![Effect::StopProgress]
                }
            }
        }
        Msg::InputChanged(text) => {
            // Input is disabled while an exchange is pending.
            if !state.is_processing() {
                state.set_input(text);
            }
            Vec::new()
        }
        Msg::SendClicked => {
            let message = state.input().trim().to_string();
            if message.is_empty() || state.is_processing() || state.phase() != Phase::HasSession {
                return (state, Vec::new());
            }
            let Some(session_id) = state.session_id().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            state.begin_exchange(ExchangeKind::Chat);
            state.push_message(Role::User, message.clone());
            state.set_input(String::new());
            state.set_loading(true);
            vec![Effect::PostMessage {
                session_id,
                message,
            }]
        }
        Msg::ChatFinished(result) => {
            if state.activity() != Activity::Busy(ExchangeKind::Chat) {
                return (state, Vec::new());
            }
            state.release_exchange();
            match result {
                Ok(reply) => {
                    state.push_message(Role::Assistant, reply.response);
                    state.replace_sources(reply.sources);
                    state.succeed();
                }
                // The optimistic user message stays in the log.
                Err(message) => state.fail(message),
            }
            vec![Effect::FocusInput]
        }
        Msg::ClearClicked => {
            if state.is_processing() || state.phase() != Phase::HasSession {
                return (state, Vec::new());
            }
            let Some(session_id) = state.session_id().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            state.begin_clear();
            vec![Effect::ClearSession { session_id }]
        }
        Msg::ClearFinished => {
            if state.phase() == Phase::Clearing {
                state.reset_session();
            }
            Vec::new()
        }
        Msg::ProgressTick { increment } => {
            // Late ticks after the upload settled must not resurrect the bar.
            if state.activity() == Activity::Busy(ExchangeKind::Upload) {
                state.advance_progress(increment);
            }
            Vec::new()
        }
        Msg::DismissError => {
            state.dismiss_error();
            Vec::new()
        }
    };

    (state, effects)
}
