use docchat_core::{Role, SourceView, StatusTier};

/// Rendering capability the controller drives.
///
/// Every string handed over is already HTML-escaped (except `set_input_text`,
/// which carries the raw value of the input box), so markup sinks can insert
/// it directly. Plain-text sinks decode the entities and must neutralise their
/// own control sequences before printing.
pub trait ViewPort {
    fn show_upload_view(&mut self);
    fn show_chat_view(&mut self);
    fn set_session_info(&mut self, title: &str, info: &str);
    /// Empties the whole message log, greeting included.
    fn clear_messages(&mut self);
    /// Puts the greeting at the head of an empty log.
    fn show_greeting(&mut self, html: &str);
    fn append_message(&mut self, role: Role, html: &str);
    /// Shows or removes the pending-reply placeholder at the tail of the log.
    fn set_loading(&mut self, loading: bool);
    fn set_sources(&mut self, sources: &[SourceView]);
    fn set_sources_placeholder(&mut self, text: &str);
    fn set_status(&mut self, label: &str, tier: StatusTier);
    /// `None` hides and resets the progress indicator.
    fn set_progress(&mut self, percent: Option<u8>);
    fn set_controls_enabled(&mut self, enabled: bool);
    fn set_input_text(&mut self, text: &str);
    fn focus_input(&mut self);
    fn show_error_notice(&mut self, text: &str);
    fn hide_error_notice(&mut self);
}
