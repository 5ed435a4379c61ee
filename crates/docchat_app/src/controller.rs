use std::sync::Arc;
use std::time::Duration;

use docchat_core::{update, AppState, AppViewModel, DocumentFile, Effect, Msg};
use docchat_engine::{Backend, DEFAULT_TICK_INTERVAL};
use docchat_logging::chat_debug;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::effects::EffectRunner;
use crate::{render, ViewPort};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub progress_interval: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Owns the client state, runs exchanges against the backend and keeps the
/// view in sync.
///
/// All methods that can start an exchange must be called from within a tokio
/// runtime. Completions are delivered through [`process_next`] or [`settle`],
/// so control always returns to the caller between input events.
///
/// [`process_next`]: InteractionController::process_next
/// [`settle`]: InteractionController::settle
pub struct InteractionController<V: ViewPort> {
    state: AppState,
    rendered: AppViewModel,
    view: V,
    effects: EffectRunner,
    msg_rx: UnboundedReceiver<Msg>,
}

impl<V: ViewPort> InteractionController<V> {
    pub fn new(mut view: V, backend: Arc<dyn Backend>, settings: ControllerSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let state = AppState::new();
        let rendered = state.view();
        render::apply(&mut view, None, &rendered);

        Self {
            state,
            rendered,
            view,
            effects: EffectRunner::new(backend, msg_tx, settings.progress_interval),
            msg_rx,
        }
    }

    pub fn start_upload(&mut self, file: DocumentFile) {
        if self.state.has_pending_exchange() {
            chat_debug!("Ignoring upload of {} while an exchange is pending", file.filename);
            return;
        }
        if let Some(session) = self.state.session() {
            chat_debug!(
                "Ignoring upload of {}: {} is still loaded",
                file.filename,
                session.filename
            );
            return;
        }
        self.dispatch(Msg::FileSelected(file));
    }

    /// Puts `text` in the input box and presses Send.
    pub fn send_message(&mut self, text: &str) {
        if self.state.has_pending_exchange() {
            chat_debug!("Dropping message typed while an exchange is pending");
            return;
        }
        self.dispatch(Msg::InputChanged(text.to_string()));
        self.dispatch(Msg::SendClicked);
    }

    pub fn clear_session(&mut self) {
        if self.state.session().is_none() {
            chat_debug!("Clear requested without a session");
        }
        self.dispatch(Msg::ClearClicked);
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Msg::DismissError);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let next = state.view();
            render::apply(&mut self.view, Some(&self.rendered), &next);
            self.rendered = next;
        }
        self.state = state;

        for effect in effects {
            match effect {
                Effect::FocusInput => self.view.focus_input(),
                other => self.effects.run(other),
            }
        }
    }

    /// Waits for the next completion or progress tick and applies it.
    /// Returns `false` once no more messages can arrive.
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Processes messages until no exchange is outstanding.
    pub async fn settle(&mut self) {
        while self.state.has_pending_exchange() {
            if !self.process_next().await {
                break;
            }
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    pub fn progress_running(&self) -> bool {
        self.effects.progress_running()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
