//! Line-oriented terminal front end.
//!
//! Input lines and exchange completions are multiplexed on one task, so a
//! line typed while an answer is pending reaches the controller (and is
//! dropped there) instead of queuing.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use docchat_core::{DocumentFile, Role, SourceView, StatusTier};
use docchat_engine::ReqwestBackend;
use docchat_logging::{chat_info, chat_warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{ClientConfig, InteractionController, ViewPort};

const HELP: &str = "Commands: /upload <path.pdf>, /clear, /dismiss, /help, /quit. Anything else is sent as a question.";

/// Entities produced by `escape_html`, in no particular order.
const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Turns view-model text into something safe to print: entities are decoded
/// and control characters other than newline and tab are dropped.
fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(ch) = rest.chars().next() {
        if ch == '&' {
            if let Some((entity, decoded)) = ENTITIES.iter().find(|(e, _)| rest.starts_with(e)) {
                out.push(*decoded);
                rest = &rest[entity.len()..];
                continue;
            }
        }
        if !ch.is_control() || ch == '\n' || ch == '\t' {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Prints view updates to stdout.
#[derive(Debug, Default)]
pub struct TerminalView {
    controls_enabled: bool,
    last_status: Option<String>,
    progress_bucket: Option<u8>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }

    /// Returns the line to print for `percent`, if it entered a new 10% bucket.
    fn progress_line(&mut self, percent: Option<u8>) -> Option<String> {
        let bucket = percent.map(|percent| percent / 10);
        if bucket == self.progress_bucket {
            return None;
        }
        self.progress_bucket = bucket;
        percent.map(|percent| format!("uploading {percent:>3}%"))
    }
}

impl ViewPort for TerminalView {
    fn show_upload_view(&mut self) {
        self.line("No document loaded. Use /upload <path.pdf> to start.");
    }

    fn show_chat_view(&mut self) {
        self.line("Document ready. Ask a question, or /clear to start over.");
    }

    fn set_session_info(&mut self, title: &str, info: &str) {
        self.line(&format!("== {} ({}) ==", plain_text(title), plain_text(info)));
    }

    fn clear_messages(&mut self) {
        self.line("----");
    }

    fn show_greeting(&mut self, html: &str) {
        self.line(&format!("system> {}", plain_text(html)));
    }

    fn append_message(&mut self, role: Role, html: &str) {
        let prefix = match role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        self.line(&format!("{prefix}> {}", plain_text(html)));
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.line("assistant> ...");
        }
    }

    fn set_sources(&mut self, sources: &[SourceView]) {
        self.line("Sources:");
        for source in sources {
            self.line(&format!(
                "  [{}] {} ({})",
                source.page_label,
                plain_text(&source.excerpt),
                source.relevance_label
            ));
        }
    }

    fn set_sources_placeholder(&mut self, text: &str) {
        self.line(&format!("Sources: {text}"));
    }

    fn set_status(&mut self, label: &str, tier: StatusTier) {
        let status = format!("[{}] {label}", tier.as_str());
        if self.last_status.as_deref() != Some(status.as_str()) {
            self.line(&status);
            self.last_status = Some(status);
        }
    }

    fn set_progress(&mut self, percent: Option<u8>) {
        if let Some(line) = self.progress_line(percent) {
            self.line(&line);
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn set_input_text(&mut self, _text: &str) {
        // The terminal owns its own input line.
    }

    fn focus_input(&mut self) {
        if self.controls_enabled {
            self.line("(ready for your question)");
        }
    }

    fn show_error_notice(&mut self, text: &str) {
        self.line(&format!("error: {}", plain_text(text)));
    }

    fn hide_error_notice(&mut self) {}
}

/// Runs the interactive loop until stdin closes or `/quit` is entered.
pub async fn run(config: &ClientConfig) -> anyhow::Result<()> {
    let backend = ReqwestBackend::new(config.backend_settings()?)?;
    chat_info!("Using backend at {}", backend.settings().base_url());
    let mut controller = InteractionController::new(
        TerminalView::new(),
        Arc::new(backend),
        config.controller_settings(),
    );
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_line(&mut controller, &line).await == Flow::Quit {
                    break;
                }
            }
            _ = controller.process_next() => {}
        }
    }

    // An exchange still in flight is awaited, never abandoned.
    controller.settle().await;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Clear,
    Dismiss,
    Upload(&'a Path),
    UploadUsage,
    Ask(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed.split_once(' ').unwrap_or((trimmed, "")) {
        ("/quit", _) => Command::Quit,
        ("/help", _) => Command::Help,
        ("/clear", _) => Command::Clear,
        ("/dismiss", _) => Command::Dismiss,
        ("/upload", path) if !path.trim().is_empty() => Command::Upload(Path::new(path.trim())),
        ("/upload", _) => Command::UploadUsage,
        _ => Command::Ask(line),
    }
}

async fn handle_line(controller: &mut InteractionController<TerminalView>, line: &str) -> Flow {
    match parse_command(line) {
        Command::Quit => return Flow::Quit,
        Command::Help => println!("{HELP}"),
        Command::Clear => controller.clear_session(),
        Command::Dismiss => controller.dismiss_error(),
        Command::Upload(path) => upload_from_path(controller, path).await,
        Command::UploadUsage => println!("usage: /upload <path.pdf>"),
        Command::Ask(text) => controller.send_message(text),
    }
    Flow::Continue
}

async fn upload_from_path(controller: &mut InteractionController<TerminalView>, path: &Path) {
    match tokio::fs::read(path).await {
        Ok(bytes) => controller.start_upload(DocumentFile::from_path(path, bytes)),
        Err(err) => {
            chat_warn!("Could not read {:?}: {}", path, err);
            println!("error: could not read {}: {err}", plain_text(&path.display().to_string()));
        }
    }
}
