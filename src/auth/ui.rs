//! Interactive prompts used by `voltx init`, `auth` and `deauth`.

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};

const INVALID_CHOICE_MSG: &str = "Invalid choice";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new("Cancelled")
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

impl From<io::Error> for UiError {
    fn from(err: io::Error) -> Self {
        UiError::new(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub detail: Option<String>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Print `label`, read one line from stdin and return it trimmed.
pub fn prompt_line(label: &str) -> Result<String, UiError> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(UiError::cancelled());
    }
    Ok(input.trim().to_string())
}

/// Like [`prompt_line`], but echoes `*` instead of the typed characters.
pub fn prompt_secret(label: &str) -> Result<String, UiError> {
    print!("{label}");
    io::stdout().flush()?;

    enable_raw_mode()?;
    let result = read_masked();
    disable_raw_mode()?;
    println!();
    result
}

fn read_masked() -> Result<String, UiError> {
    let mut secret = String::new();
    let mut stdout = io::stdout();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret.trim().to_string()),
            KeyCode::Esc => return Err(UiError::cancelled()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(UiError::cancelled())
            }
            KeyCode::Backspace => {
                if secret.pop().is_some() {
                    write!(stdout, "\u{8} \u{8}")?;
                }
            }
            KeyCode::Char(ch) => {
                secret.push(ch);
                write!(stdout, "*")?;
            }
            _ => {}
        }
        stdout.flush()?;
    }
}

/// Ask a yes/no question. An empty answer picks `default`.
pub fn prompt_confirm(label: &str, default: bool) -> Result<bool, UiError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let answer = prompt_line(&format!("{label} {hint} "))?;
    Ok(parse_confirmation(&answer).unwrap_or(default))
}

pub fn parse_confirmation(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Show a numbered menu and return the chosen index. `None` means the
/// trailing "Cancel" entry was picked.
pub fn prompt_menu(title: &str, items: &[MenuItem]) -> Result<Option<usize>, UiError> {
    println!("{title}");
    for (index, item) in items.iter().enumerate() {
        match &item.detail {
            Some(detail) => println!("  {}. {} - {}", index + 1, item.label, detail),
            None => println!("  {}. {}", index + 1, item.label),
        }
    }
    println!("  {}. Cancel", items.len() + 1);
    println!();

    loop {
        let input = prompt_line(&format!("Select an option (1-{}): ", items.len() + 1))?;
        match parse_menu_selection(&input, items.len()) {
            Ok(choice) => return Ok(choice),
            Err(err) => eprintln!("❌ {err}"),
        }
    }
}

/// Parse a 1-based menu choice over `count` items plus a final Cancel entry.
pub fn parse_menu_selection(input: &str, count: usize) -> Result<Option<usize>, UiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UiError::new("Selection cannot be empty"));
    }
    let choice: usize = trimmed
        .parse()
        .map_err(|_| UiError::new(INVALID_CHOICE_MSG))?;
    match choice {
        n if n >= 1 && n <= count => Ok(Some(n - 1)),
        n if n == count + 1 => Ok(None),
        _ => Err(UiError::new(INVALID_CHOICE_MSG)),
    }
}

/// Usernames are lowercase ASCII letters and digits.
pub fn validate_username(input: &str) -> Result<String, UiError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(UiError::new("Username cannot be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(UiError::new(
            "Username may only contain lowercase letters and digits",
        ));
    }
    Ok(name.to_string())
}
