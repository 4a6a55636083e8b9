//! Chat session state machine
//!
//! [`ChatSession`] owns everything the chat window displays: the input mode,
//! which pane has focus, the transcript and the scroll position. Key presses
//! and completion results arrive as [`ChatAction`]s; [`ChatSession::apply`]
//! updates the state and hands back a [`ChatCommand`] whenever something has
//! to happen outside the session (a network request, a file write, exiting).
//! Nothing here touches the terminal, so every transition is testable.

use std::sync::Arc;

use tracing::debug;

use crate::core::constants::INPUT_PLACEHOLDER;
use crate::core::message::{Message, Speaker};
use crate::ui::markdown::{MarkdownRenderer, RenderOptions};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Normal,
    Command,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Insert => "INSERT",
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    Up(u16),
    Down(u16),
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    Escape,
    ToggleFocus,
    EnterCommandMode,
    CommandChar(char),
    CommandBackspace,
    ExecuteCommand,
    Submit { input: String },
    /// The in-flight completion settled; errors carry their display text.
    CompletionSettled(Result<String, String>),
    Scroll(ScrollRequest),
    /// `q` or Ctrl-C: leave immediately without saving.
    Quit,
}

/// Effects the owner of the session must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Empty the input box without sending anything.
    ClearInput,
    /// Empty the input box and ask the Completion Service for `prompt`.
    RequestCompletion { prompt: String },
    PersistAndExit,
    DiscardAndExit,
}

/// Offset of the first visible transcript line. While `follow` is set the
/// view sticks to the newest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub offset: u16,
    pub follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl ScrollState {
    /// Clamp to the scrollable range and return the offset to draw with.
    pub fn resolve(&mut self, content_height: u16, viewport_height: u16) -> u16 {
        let max = content_height.saturating_sub(viewport_height);
        if self.follow || self.offset >= max {
            self.offset = max;
            self.follow = true;
        }
        self.offset
    }
}

pub struct ChatSession {
    model: String,
    provider: String,
    mode: Mode,
    previous_mode: Mode,
    focus: Focus,
    transcript: Vec<Message>,
    is_first_exchange: bool,
    pending: bool,
    command_buffer: String,
    status: Option<String>,
    pub scroll: ScrollState,
    renderer: Arc<dyn MarkdownRenderer>,
    render_options: RenderOptions,
}

impl ChatSession {
    pub fn new(
        model: impl Into<String>,
        provider: impl Into<String>,
        renderer: Arc<dyn MarkdownRenderer>,
    ) -> Self {
        Self {
            model: model.into(),
            provider: provider.into(),
            mode: Mode::Insert,
            previous_mode: Mode::Insert,
            focus: Focus::Input,
            transcript: Vec::new(),
            is_first_exchange: true,
            pending: false,
            command_buffer: String::new(),
            status: None,
            scroll: ScrollState::default(),
            renderer,
            render_options: RenderOptions {
                code: true,
                show_links: true,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_first_exchange(&self) -> bool {
        self.is_first_exchange
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn apply(&mut self, action: ChatAction) -> Option<ChatCommand> {
        if !matches!(action, ChatAction::CompletionSettled(_)) {
            self.status = None;
        }

        match action {
            ChatAction::Escape => {
                match self.mode {
                    Mode::Command => self.leave_command_mode(),
                    Mode::Insert => {
                        self.mode = Mode::Normal;
                        self.focus = Focus::History;
                    }
                    Mode::Normal => {}
                }
                None
            }
            ChatAction::ToggleFocus => {
                self.toggle_focus();
                None
            }
            ChatAction::EnterCommandMode => {
                if self.mode != Mode::Command {
                    self.previous_mode = self.mode;
                    self.mode = Mode::Command;
                    self.command_buffer.clear();
                }
                None
            }
            ChatAction::CommandChar(ch) => {
                if self.mode == Mode::Command {
                    self.command_buffer.push(ch);
                }
                None
            }
            ChatAction::CommandBackspace => {
                if self.mode == Mode::Command && self.command_buffer.pop().is_none() {
                    self.leave_command_mode();
                }
                None
            }
            ChatAction::ExecuteCommand => {
                if self.mode == Mode::Command {
                    self.execute_command()
                } else {
                    None
                }
            }
            ChatAction::Submit { input } => {
                if self.mode == Mode::Insert {
                    self.submit(&input)
                } else {
                    None
                }
            }
            ChatAction::CompletionSettled(result) => {
                self.settle(result);
                None
            }
            ChatAction::Scroll(request) => {
                self.scroll_by(request);
                None
            }
            ChatAction::Quit => Some(ChatCommand::DiscardAndExit),
        }
    }

    fn toggle_focus(&mut self) {
        if self.mode == Mode::Command {
            return;
        }
        match self.focus {
            Focus::Input => {
                self.focus = Focus::History;
                self.mode = Mode::Normal;
            }
            Focus::History => {
                self.focus = Focus::Input;
                self.mode = Mode::Insert;
            }
        }
    }

    fn leave_command_mode(&mut self) {
        self.mode = self.previous_mode;
        self.command_buffer.clear();
    }

    fn execute_command(&mut self) -> Option<ChatCommand> {
        let command = self.command_buffer.trim().trim_start_matches(':').to_string();
        self.leave_command_mode();

        match command.as_str() {
            "i" => {
                self.mode = Mode::Insert;
                self.focus = Focus::Input;
                None
            }
            "q" => Some(ChatCommand::DiscardAndExit),
            "wq" => {
                if self.transcript.is_empty() {
                    self.status = Some("Nothing to save yet".to_string());
                    None
                } else {
                    Some(ChatCommand::PersistAndExit)
                }
            }
            "" => None,
            other => {
                debug!(command = other, "Ignoring unknown chat command");
                self.status = Some(format!("Unknown command: :{other}"));
                None
            }
        }
    }

    fn submit(&mut self, raw: &str) -> Option<ChatCommand> {
        let text = raw.trim();
        if text.is_empty() || text == INPUT_PLACEHOLDER {
            return Some(ChatCommand::ClearInput);
        }
        if self.pending {
            self.status = Some(format!("Waiting for {} to respond", self.provider));
            return None;
        }

        self.is_first_exchange = false;
        self.transcript.push(Message::plain(Speaker::User, text));
        self.pending = true;
        self.scroll.follow = true;
        Some(ChatCommand::RequestCompletion {
            prompt: text.to_string(),
        })
    }

    fn settle(&mut self, result: Result<String, String>) {
        if !self.pending {
            return;
        }
        self.pending = false;

        let message = match result {
            Ok(text) => {
                let rendered = self.renderer.render(&text, self.render_options);
                Message::new(Speaker::Assistant, text, rendered)
            }
            Err(error) => Message::plain(
                Speaker::SystemError,
                format!("Error getting response from {}: {}", self.provider, error),
            ),
        };
        self.transcript.push(message);
        self.scroll.follow = true;
    }

    fn scroll_by(&mut self, request: ScrollRequest) {
        match request {
            ScrollRequest::Up(lines) => {
                self.scroll.follow = false;
                self.scroll.offset = self.scroll.offset.saturating_sub(lines);
            }
            ScrollRequest::Down(lines) => {
                self.scroll.offset = self.scroll.offset.saturating_add(lines);
            }
            ScrollRequest::Top => {
                self.scroll.follow = false;
                self.scroll.offset = 0;
            }
            ScrollRequest::Bottom => self.scroll.follow = true,
        }
    }
}
