use docchat_core::{AppViewModel, SourcesPanel};

use crate::ViewPort;

/// Pushes `next` to the view, touching only what differs from `previous`.
/// With no previous view model everything is rendered.
pub fn apply(view: &mut dyn ViewPort, previous: Option<&AppViewModel>, next: &AppViewModel) {
    let changed = |field: fn(&AppViewModel) -> bool| -> bool {
        previous.map_or(true, |prev| field(prev) != field(next))
    };

    if changed(|vm| vm.chat_visible) {
        if next.chat_visible {
            view.show_chat_view();
        } else {
            view.show_upload_view();
        }
    }

    if previous.map_or(true, |prev| prev.session_header != next.session_header) {
        if let Some(header) = &next.session_header {
            view.set_session_info(&header.title, &header.info);
        }
    }

    // The placeholder sits at the tail: remove it before appending the reply,
    // add it after appending the user's message.
    if !next.loading && previous.is_some_and(|prev| prev.loading) {
        view.set_loading(false);
    }
    render_messages(view, previous, next);
    if next.loading && changed(|vm| vm.loading) {
        view.set_loading(true);
    }

    if previous.map_or(true, |prev| prev.sources != next.sources) {
        match &next.sources {
            SourcesPanel::Placeholder(text) => view.set_sources_placeholder(text),
            SourcesPanel::Entries(entries) => view.set_sources(entries),
        }
    }

    if previous.map_or(true, |prev| prev.status != next.status) {
        view.set_status(next.status.label, next.status.tier);
    }

    if previous.map_or(true, |prev| prev.progress != next.progress) {
        view.set_progress(next.progress);
    }

    if changed(|vm| vm.controls_enabled) {
        view.set_controls_enabled(next.controls_enabled);
    }

    if previous.map_or(true, |prev| prev.input != next.input) {
        view.set_input_text(&next.input);
    }

    if previous.map_or(true, |prev| prev.error != next.error) {
        match &next.error {
            Some(error) => view.show_error_notice(&error.text),
            None if previous.is_some() => view.hide_error_notice(),
            None => {}
        }
    }
}

fn render_messages(view: &mut dyn ViewPort, previous: Option<&AppViewModel>, next: &AppViewModel) {
    let already_shown = match previous {
        Some(prev)
            if prev.greeting == next.greeting && next.messages.starts_with(&prev.messages) =>
        {
            prev.messages.len()
        }
        _ => {
            view.clear_messages();
            if let Some(greeting) = next.greeting {
                view.show_greeting(greeting);
            }
            0
        }
    };
    for message in &next.messages[already_shown..] {
        view.append_message(message.role, &message.html);
    }
}
