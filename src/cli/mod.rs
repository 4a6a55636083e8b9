//! Command-line interface parsing and handling
//!
//! Parses arguments with clap and dispatches to the chat window, agent mode
//! or one of the configuration commands.

pub mod account;
pub mod defaults;
pub mod model_list;
pub mod provider_list;
pub mod setup;


use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::agent::AgentSession;
use crate::auth::ui::UiError;
use crate::auth::AuthManager;
use crate::core::builtin_providers::{builtin_providers, BuiltinProvider};
use crate::core::completion::CompletionClients;
use crate::core::config::Config;
use crate::core::paths::VoltxPaths;
use crate::core::providers::{parse_provider, resolve_chat_target, ChatTarget, ProviderResolutionError};
use crate::ui::chat_loop::{run_chat, ChatExit};
use crate::utils::logging;

#[derive(Parser)]
#[command(name = "voltx", version)]
#[command(about = "Chat with LLM providers from the terminal")]
#[command(
    long_about = "voltx opens a full-screen chat window against OpenAI-compatible \
chat completion APIs, or turns natural-language requests into shell commands in agent mode.\n\n\
Get started:\n\
  voltx init        Create a profile and store API keys in the system keyring\n\
  voltx chat        Open the chat window with the default provider and model\n\
  voltx agent       Ask for shell commands in the current directory\n\n\
Environment Variables (used when no key is stored):\n\
  OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, DEEPSEEK_API_KEY, PERPLEXITY_API_KEY\n\
  VOLTX_HOME        Data directory (default ~/.voltx)\n\
  VOLTX_LOG         Log filter for the daily log file (default info)\n\n\
Chat window:\n\
  Esc               Normal mode (scroll with j/k, PageUp/PageDown, g/G)\n\
  Tab               Switch focus between input and chat\n\
  :wq / :q          Save and quit / quit without saving\n\
  Ctrl+C            Quit without saving"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the voltx profile and configure providers
    Init,
    /// Open the chat window (default)
    Chat {
        /// Provider to chat with (defaults to the configured provider)
        provider: Option<String>,
        /// Model to use instead of the configured default
        #[arg(short, long)]
        model: Option<String>,
        /// Pick a model for this session only
        #[arg(long)]
        temp: bool,
    },
    /// Turn natural-language requests into shell commands
    Agent {
        provider: Option<String>,
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Store an API key for a provider
    Auth { provider: Option<String> },
    /// Remove the stored API key for a provider
    Deauth { provider: String },
    /// List providers and whether a key is available
    Providers,
    /// List the built-in models for one or all providers
    Models { provider: Option<String> },
    /// Show the configured default models
    Defaults,
    /// Set configuration values
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },
    /// Clear every default model
    ResetDefaults {
        /// Required to actually clear the defaults
        #[arg(long)]
        hard: bool,
    },
    /// Show the configuration with masked API keys
    Config {
        #[arg(long)]
        unmasked: bool,
    },
    /// Show profile details and usage
    Whoami,
    /// Remove all voltx data
    Reset {
        /// Required to actually delete anything
        #[arg(long)]
        danger: bool,
    },
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Set the default model for a provider and make it the global default
    DefaultModel { provider: String, model: String },
    /// Set the provider `voltx chat` uses without arguments
    DefaultProvider { provider: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let paths = VoltxPaths::discover()?;
    match logging::init(&paths.logs_dir()) {
        Ok(path) => debug!(path = %path.display(), "Logging initialized"),
        Err(err) => eprintln!("⚠️  Logging disabled: {err}"),
    }
    let auth = AuthManager::new();

    match args.command.unwrap_or(Commands::Chat {
        provider: None,
        model: None,
        temp: false,
    }) {
        Commands::Init => setup::run_init(&paths, &auth),
        Commands::Chat {
            provider,
            model,
            temp,
        } => start_chat(&paths, &auth, provider.as_deref(), model.as_deref(), temp).await,
        Commands::Agent { provider, model } => {
            start_agent(&paths, &auth, provider.as_deref(), model.as_deref()).await
        }
        Commands::Auth { provider } => setup::run_auth(&paths, &auth, provider.as_deref()),
        Commands::Deauth { provider } => setup::run_deauth(&paths, &auth, &provider),
        Commands::Providers => {
            let config = Config::load_from_path(&paths.config_file())?;
            provider_list::list_providers(&config, &auth);
            Ok(())
        }
        Commands::Models { provider } => {
            let config = Config::load_from_path(&paths.config_file())?;
            model_list::list_models(&config, provider.as_deref())?;
            Ok(())
        }
        Commands::Defaults => {
            let config = Config::load_from_path(&paths.config_file())?;
            defaults::show_defaults(&config);
            Ok(())
        }
        Commands::Set { command } => match command {
            SetCommands::DefaultModel { provider, model } => {
                defaults::set_default_model(&paths, &provider, &model)
            }
            SetCommands::DefaultProvider { provider } => {
                defaults::set_default_provider(&paths, &provider)
            }
        },
        Commands::ResetDefaults { hard } => defaults::reset_defaults(&paths, hard),
        Commands::Config { unmasked } => account::show_config(&paths, &auth, unmasked),
        Commands::Whoami => account::whoami(&paths),
        Commands::Reset { danger } => account::reset(&paths, &auth, danger),
    }
}

/// `--temp`: choose provider and model interactively without saving either.
fn temporary_target(
    config: &Config,
    auth: &AuthManager,
    provider: Option<&str>,
) -> Result<ChatTarget, Box<dyn Error>> {
    let provider: &'static BuiltinProvider = match provider.or(config.default_provider.as_deref()) {
        Some(id) => parse_provider(id)?,
        None => {
            let all: Vec<&'static BuiltinProvider> = builtin_providers().iter().collect();
            setup::choose_provider("Select a provider for this session:", &all)?
                .ok_or_else(UiError::cancelled)?
        }
    };
    if !auth.has_api_key(&provider.id) {
        return Err(ProviderResolutionError::provider_not_configured(&provider.id).into());
    }
    let model = setup::choose_model(provider)?.ok_or_else(UiError::cancelled)?;
    Ok(ChatTarget { provider, model })
}

fn resolve_target(
    paths: &VoltxPaths,
    auth: &AuthManager,
    provider: Option<&str>,
    model: Option<&str>,
    temp: bool,
) -> Result<ChatTarget, Box<dyn Error>> {
    let config = Config::load_from_path(&paths.config_file())?;
    if temp {
        return temporary_target(&config, auth, provider);
    }
    Ok(resolve_chat_target(&config, provider, model, |p| {
        auth.has_api_key(p)
    })?)
}

/// Clients for every provider with a key; fails when the target's own key
/// could not be turned into a client.
fn connect(
    auth: &AuthManager,
    target: &ChatTarget,
) -> Result<CompletionClients, ProviderResolutionError> {
    let clients = auth.build_clients(&reqwest::Client::new());
    debug!(providers = ?clients.providers(), "Completion clients ready");
    if clients.get(target.provider_id()).is_none() {
        return Err(ProviderResolutionError::provider_not_configured(target.provider_id()));
    }
    Ok(clients)
}

async fn start_chat(
    paths: &VoltxPaths,
    auth: &AuthManager,
    provider: Option<&str>,
    model: Option<&str>,
    temp: bool,
) -> Result<(), Box<dyn Error>> {
    let target = resolve_target(paths, auth, provider, model, temp)?;
    let clients = connect(auth, &target)?;
    info!(provider = %target.provider_id(), model = %target.model, "Starting chat session");

    let exit = run_chat(
        target.model.clone(),
        target.provider_id().to_string(),
        Arc::new(clients),
        paths.chats_dir(),
    )
    .await?;

    if let ChatExit::Saved(path) = exit {
        println!("✅ Chat saved to {}", path.display());
    }
    Ok(())
}

async fn start_agent(
    paths: &VoltxPaths,
    auth: &AuthManager,
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let target = resolve_target(paths, auth, provider, model, false)?;
    let clients = connect(auth, &target)?;
    info!(provider = %target.provider_id(), model = %target.model, "Starting agent session");

    AgentSession::new(
        target.model.clone(),
        target.provider_id().to_string(),
        Arc::new(clients),
        paths.history_file(),
        std::env::current_dir()?,
    )
    .run()
    .await
}
