//! Key routing for the chat window
//!
//! Maps a key press to either a [`ChatAction`] for the session, a plain
//! edit for the input box, or nothing. Routing depends only on the current
//! mode and whether the input box is empty, so it stays a pure function.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::session::{ChatAction, ChatSession, Mode, ScrollRequest};

const PAGE: u16 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRoute {
    Session(ChatAction),
    /// Forward the key to the input box.
    Input,
    Ignore,
}

pub fn route_key(session: &ChatSession, key: &KeyEvent, input_is_empty: bool) -> KeyRoute {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyRoute::Session(ChatAction::Quit);
    }

    match session.mode() {
        Mode::Command => command_key(key),
        Mode::Insert => insert_key(key, input_is_empty),
        Mode::Normal => normal_key(key),
    }
}

fn command_key(key: &KeyEvent) -> KeyRoute {
    let action = match key.code {
        KeyCode::Esc => ChatAction::Escape,
        KeyCode::Enter => ChatAction::ExecuteCommand,
        KeyCode::Backspace => ChatAction::CommandBackspace,
        KeyCode::Char(ch) => ChatAction::CommandChar(ch),
        _ => return KeyRoute::Ignore,
    };
    KeyRoute::Session(action)
}

fn insert_key(key: &KeyEvent, input_is_empty: bool) -> KeyRoute {
    match key.code {
        KeyCode::Esc => KeyRoute::Session(ChatAction::Escape),
        KeyCode::Tab => KeyRoute::Session(ChatAction::ToggleFocus),
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            KeyRoute::Input
        }
        // The input text is attached by the caller.
        KeyCode::Enter => KeyRoute::Session(ChatAction::Submit {
            input: String::new(),
        }),
        KeyCode::Char(':') if input_is_empty => KeyRoute::Session(ChatAction::EnterCommandMode),
        KeyCode::PageUp => KeyRoute::Session(ChatAction::Scroll(ScrollRequest::Up(PAGE))),
        KeyCode::PageDown => KeyRoute::Session(ChatAction::Scroll(ScrollRequest::Down(PAGE))),
        _ => KeyRoute::Input,
    }
}

fn normal_key(key: &KeyEvent) -> KeyRoute {
    let action = match key.code {
        KeyCode::Tab => ChatAction::ToggleFocus,
        KeyCode::Esc => ChatAction::Escape,
        KeyCode::Char(':') => ChatAction::EnterCommandMode,
        KeyCode::Char('q') => ChatAction::Quit,
        KeyCode::Char('k') | KeyCode::Up => ChatAction::Scroll(ScrollRequest::Up(1)),
        KeyCode::Char('j') | KeyCode::Down => ChatAction::Scroll(ScrollRequest::Down(1)),
        KeyCode::PageUp => ChatAction::Scroll(ScrollRequest::Up(PAGE)),
        KeyCode::PageDown => ChatAction::Scroll(ScrollRequest::Down(PAGE)),
        KeyCode::Char('g') | KeyCode::Home => ChatAction::Scroll(ScrollRequest::Top),
        KeyCode::Char('G') | KeyCode::End => ChatAction::Scroll(ScrollRequest::Bottom),
        _ => return KeyRoute::Ignore,
    };
    KeyRoute::Session(action)
}
