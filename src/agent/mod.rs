//! Agent mode
//!
//! A line-oriented loop that turns natural-language requests into a single
//! shell command, asks for confirmation and runs it in the current
//! directory. The model sees the operating system, the working directory
//! and a shallow directory tree with every request.

pub mod exec;
pub mod history;
pub mod prompt;
pub mod tree;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use self::exec::{rewrite_npx, run_command};
use self::history::History;
use self::prompt::{clean_command, error_suggestion, system_prompt};
use crate::auth::ui::{prompt_confirm, prompt_line, prompt_menu, MenuItem};
use crate::core::completion::CompletionService;

const HISTORY_MENU_LIMIT: usize = 15;
const HISTORY_LABEL_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentInput {
    Empty,
    Exit,
    ShowHistory,
    Request(String),
}

pub fn parse_input(line: &str) -> AgentInput {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => AgentInput::Empty,
        "exit" | "quit" => AgentInput::Exit,
        "!h" => AgentInput::ShowHistory,
        _ => AgentInput::Request(trimmed.to_string()),
    }
}

/// Ask the model for a command. Failures come back as an `echo` command
/// describing the error so the loop keeps going.
pub async fn suggest_command(
    service: &dyn CompletionService,
    model: &str,
    provider: &str,
    request: &str,
    cwd: &Path,
) -> String {
    let tree = tree::generate_tree(cwd);
    let system = system_prompt(std::env::consts::OS, cwd, &tree);
    match service.complete(model, provider, request, Some(&system)).await {
        Ok(reply) => clean_command(&reply),
        Err(err) => {
            error!(provider, error = %err, "Agent request failed");
            error_suggestion(&err)
        }
    }
}

fn history_label(entry: &str) -> String {
    if entry.chars().count() > HISTORY_LABEL_WIDTH {
        let head: String = entry.chars().take(HISTORY_LABEL_WIDTH - 3).collect();
        format!("{head}...")
    } else {
        entry.to_string()
    }
}

fn pick_from_history(history: &History) -> Result<Option<String>, Box<dyn Error>> {
    if history.is_empty() {
        println!("ℹ️  No history available yet.");
        return Ok(None);
    }
    let recent = history.recent(HISTORY_MENU_LIMIT);
    let items: Vec<MenuItem> = recent.iter().map(|e| MenuItem::new(history_label(e))).collect();
    let choice = prompt_menu("Select a command from history to rerun:", &items)?;
    Ok(choice.map(|index| recent[index].to_string()))
}

pub struct AgentSession {
    model: String,
    provider: String,
    service: Arc<dyn CompletionService>,
    history: History,
    cwd: PathBuf,
}

impl AgentSession {
    pub fn new(
        model: String,
        provider: String,
        service: Arc<dyn CompletionService>,
        history_file: PathBuf,
        cwd: PathBuf,
    ) -> Self {
        Self {
            model,
            provider,
            service,
            history: History::load(history_file),
            cwd,
        }
    }

    fn prompt(&self) -> String {
        let dir = self
            .cwd
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.cwd.display().to_string());
        format!("~{dir} « agent ⌘ » ")
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        println!("🤖 Agent Mode");
        println!(
            "Agent activated in {} using {} from {}",
            self.cwd.display(),
            self.model,
            self.provider
        );
        println!("Type 'exit' to quit. Use '!h' to view and rerun history.");
        info!(provider = %self.provider, model = %self.model, "Starting agent session");

        loop {
            let Ok(line) = prompt_line(&self.prompt()) else {
                break;
            };
            let request = match parse_input(&line) {
                AgentInput::Empty => {
                    println!("Please enter a command.");
                    continue;
                }
                AgentInput::Exit => break,
                AgentInput::ShowHistory => match pick_from_history(&self.history)? {
                    Some(entry) => {
                        println!("Rerunning: {entry}");
                        entry
                    }
                    None => continue,
                },
                AgentInput::Request(text) => text,
            };
            self.history.push(&request);

            let suggestion = suggest_command(
                self.service.as_ref(),
                &self.model,
                &self.provider,
                &request,
                &self.cwd,
            )
            .await;

            if suggestion.eq_ignore_ascii_case("exit") {
                break;
            }
            if suggestion.is_empty() {
                println!("⚠️  Received empty command suggestion from the model.");
                continue;
            }

            println!("Suggested command: {suggestion}");
            if prompt_confirm("Do you want to run this command?", false)? {
                self.execute(&suggestion).await;
            } else {
                println!("Command skipped.");
                info!(command = %suggestion, "Agent skipped command");
            }
        }

        if let Err(err) = self.history.save() {
            warn!(path = %self.history.path().display(), error = %err, "Could not save agent history");
        }
        println!("Agent session ended.");
        Ok(())
    }

    async fn execute(&self, suggestion: &str) {
        let command = rewrite_npx(suggestion);
        if command != suggestion {
            println!("(Using 'npm exec --' instead of 'npx')");
        }
        println!("Running command: {command}");

        let mut stdout = tokio::io::stdout();
        let mut stderr = tokio::io::stderr();
        match run_command(&command, &mut stdout, &mut stderr).await {
            Ok(outcome) if outcome.success() => {
                println!("✅ Command finished successfully.");
                info!(command = %command, "Agent executed command");
            }
            Ok(outcome) => {
                let summary = outcome.failure_summary();
                eprintln!("❌ Command failed: {summary}");
                warn!(command = %command, code = ?outcome.code, "Agent command failed");
            }
            Err(err) => {
                eprintln!("❌ {err}");
                error!(command = %command, error = %err, "Agent command did not complete");
            }
        }
    }
}
