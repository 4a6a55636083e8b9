//! Chat window event loop
//!
//! Terminal events and completion results are funnelled through one channel
//! into a [`ChatController`], which feeds them to the [`ChatSession`] and
//! carries out whatever [`ChatCommand`] comes back. The loop redraws after
//! every event and at least once a second to keep the clock current.

mod keybindings;
mod lifecycle;

use std::{error::Error, path::PathBuf, sync::Arc, time::Duration};

use chrono::Local;
use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tui_textarea::TextArea;

use self::keybindings::{route_key, KeyRoute};
use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::completion::CompletionService;
use crate::core::constants::{CHAT_SYSTEM_PROMPT, INPUT_PLACEHOLDER};
use crate::core::session::{ChatAction, ChatCommand, ChatSession, Mode};
use crate::core::transcript::{self, TranscriptError};
use crate::ui::markdown::TerminalMarkdown;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;

const CLOCK_TICK: Duration = Duration::from_secs(1);
const CLOCK_FORMAT: &str = "%H:%M %d-%b-%y";

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    /// A completion request settled; errors carry their display text.
    Completion(Result<String, String>),
}

/// How the chat window was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatExit {
    Saved(PathBuf),
    Discarded,
}

pub struct ChatController {
    session: ChatSession,
    textarea: TextArea<'static>,
    theme: Theme,
    service: Arc<dyn CompletionService>,
    event_tx: mpsc::UnboundedSender<UiEvent>,
    chats_dir: PathBuf,
}

fn new_input(theme: &Theme) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(INPUT_PLACEHOLDER);
    textarea.set_placeholder_style(theme.placeholder_style);
    textarea.set_style(theme.input_text_style);
    textarea
}

impl ChatController {
    pub fn new(
        session: ChatSession,
        theme: Theme,
        service: Arc<dyn CompletionService>,
        event_tx: mpsc::UnboundedSender<UiEvent>,
        chats_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            textarea: new_input(&theme),
            theme,
            service,
            event_tx,
            chats_dir,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn draw(&mut self, f: &mut Frame, clock: &str) {
        ui(f, &mut self.session, &mut self.textarea, &self.theme, clock);
    }

    /// Apply one event. Returns the exit once the window should close.
    pub fn handle_event(&mut self, event: UiEvent) -> Result<Option<ChatExit>, TranscriptError> {
        match event {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key)
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                if self.session.mode() == Mode::Insert {
                    self.textarea.insert_str(text);
                }
                Ok(None)
            }
            UiEvent::Crossterm(_) => Ok(None),
            UiEvent::Completion(result) => {
                self.session.apply(ChatAction::CompletionSettled(result));
                Ok(None)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<ChatExit>, TranscriptError> {
        let input_is_empty = self.textarea.lines().iter().all(|line| line.is_empty());
        match route_key(&self.session, &key, input_is_empty) {
            KeyRoute::Session(ChatAction::Submit { .. }) => {
                let input = self.input_text();
                self.dispatch(ChatAction::Submit { input })
            }
            KeyRoute::Session(action) => self.dispatch(action),
            KeyRoute::Input => {
                self.textarea.input(tui_textarea::Input::from(key));
                Ok(None)
            }
            KeyRoute::Ignore => Ok(None),
        }
    }

    fn dispatch(&mut self, action: ChatAction) -> Result<Option<ChatExit>, TranscriptError> {
        let Some(command) = self.session.apply(action) else {
            return Ok(None);
        };

        match command {
            ChatCommand::ClearInput => {
                self.textarea = new_input(&self.theme);
                Ok(None)
            }
            ChatCommand::RequestCompletion { prompt } => {
                self.textarea = new_input(&self.theme);
                self.spawn_completion(prompt);
                Ok(None)
            }
            ChatCommand::PersistAndExit => {
                let saved = transcript::persist(
                    self.session.transcript(),
                    self.session.provider(),
                    &self.chats_dir,
                    &Local::now(),
                )?;
                Ok(Some(match saved {
                    Some(path) => {
                        info!(path = %path.display(), "Saved chat transcript");
                        ChatExit::Saved(path)
                    }
                    None => ChatExit::Discarded,
                }))
            }
            ChatCommand::DiscardAndExit => Ok(Some(ChatExit::Discarded)),
        }
    }

    fn spawn_completion(&self, prompt: String) {
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        let model = self.session.model().to_string();
        let provider = self.session.provider().to_string();

        tokio::spawn(async move {
            debug!(%provider, %model, "Requesting completion");
            let result = service
                .complete(&model, &provider, &prompt, Some(CHAT_SYSTEM_PROMPT))
                .await
                .map_err(|err| {
                    warn!(%provider, error = %err, "Completion failed");
                    err.to_string()
                });
            let _ = event_tx.send(UiEvent::Completion(result));
        });
    }
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    controller: &mut ChatController,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<ChatExit, Box<dyn Error>> {
    loop {
        let clock = Local::now().format(CLOCK_FORMAT).to_string();
        terminal.draw(|f| controller.draw(f, &clock))?;

        match tokio::time::timeout(CLOCK_TICK, event_rx.recv()).await {
            Ok(Some(event)) => {
                if let Some(exit) = controller.handle_event(event)? {
                    return Ok(exit);
                }
            }
            Ok(None) => return Ok(ChatExit::Discarded),
            Err(_) => {}
        }
    }
}

/// Run the chat window until the user leaves it. The terminal is restored
/// on every path, including errors.
pub async fn run_chat(
    model: String,
    provider: String,
    service: Arc<dyn CompletionService>,
    chats_dir: PathBuf,
) -> Result<ChatExit, Box<dyn Error>> {
    let theme = Theme::default();
    let renderer = Arc::new(TerminalMarkdown::new(theme.clone()));
    let session = ChatSession::new(model, provider, renderer);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let mut controller = ChatController::new(session, theme, service, event_tx.clone(), chats_dir);

    let mut terminal = setup_terminal()?;
    let reader = spawn_event_reader(event_tx);

    let result = event_loop(&mut terminal, &mut controller, &mut event_rx).await;

    reader.abort();
    restore_terminal(&mut terminal)?;
    result
}
