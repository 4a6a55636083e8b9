//! `voltx init`, `auth` and `deauth`.

use std::error::Error;

use chrono::Utc;
use tracing::info;

use crate::auth::ui::{
    prompt_confirm, prompt_line, prompt_menu, prompt_secret, validate_username, MenuItem, UiError,
};
use crate::auth::AuthManager;
use crate::core::builtin_providers::{builtin_providers, BuiltinProvider};
use crate::core::config::{Config, UserProfile};
use crate::core::constants::VERSION;
use crate::core::paths::VoltxPaths;
use crate::core::providers::parse_provider;

/// Catalog providers that have not been configured yet.
pub fn unconfigured_providers(config: &Config) -> Vec<&'static BuiltinProvider> {
    builtin_providers()
        .iter()
        .filter(|p| !config.is_provider_configured(&p.id))
        .collect()
}

pub fn choose_provider(
    title: &str,
    candidates: &[&'static BuiltinProvider],
) -> Result<Option<&'static BuiltinProvider>, UiError> {
    let items: Vec<MenuItem> = candidates
        .iter()
        .map(|p| MenuItem::new(&p.display_name).with_detail(&p.id))
        .collect();
    Ok(prompt_menu(title, &items)?.map(|index| candidates[index]))
}

pub fn choose_model(provider: &BuiltinProvider) -> Result<Option<String>, UiError> {
    let items: Vec<MenuItem> = provider.models.iter().map(MenuItem::new).collect();
    let title = format!("Select a model for {}:", provider.display_name);
    Ok(prompt_menu(&title, &items)?.map(|index| provider.models[index].clone()))
}

/// Store a key for `provider` and, if it has none yet, pick a default
/// model. The first provider configured also becomes the global default.
fn configure_provider(
    config: &mut Config,
    auth: &AuthManager,
    provider: &BuiltinProvider,
) -> Result<(), Box<dyn Error>> {
    let key = prompt_secret(&format!("Enter your {} API key: ", provider.display_name))?;
    if key.is_empty() {
        return Err(UiError::new("API key cannot be empty").into());
    }
    auth.store_api_key(&provider.id, &key)?;
    config.mark_configured(&provider.id);

    if config.get_default_model(&provider.id).is_none() {
        if let Some(model) = choose_model(provider)? {
            if config.default_provider.is_none() {
                config.set_global_default(&provider.id, model.clone());
            } else {
                config.set_default_model(&provider.id, model.clone());
            }
            info!(provider = %provider.id, %model, "Default model set");
        }
    }

    println!("✅ {} configured", provider.display_name);
    Ok(())
}

pub fn run_init(paths: &VoltxPaths, auth: &AuthManager) -> Result<(), Box<dyn Error>> {
    let config_path = paths.config_file();
    let mut config = Config::load_from_path(&config_path)?;
    if config.is_initialized() {
        println!("✅ voltx is already initialized.");
        println!("   Run `voltx auth` to add another provider.");
        return Ok(());
    }

    paths.ensure_dirs()?;
    println!("⚡ Welcome to voltx v{VERSION}");
    println!();

    let username = loop {
        let input = prompt_line("Choose a username: ")?;
        match validate_username(&input) {
            Ok(name) => break name,
            Err(err) => eprintln!("❌ {err}"),
        }
    };
    config.user = Some(UserProfile {
        username,
        created_at: Utc::now(),
    });
    config.save_to_path(&config_path)?;
    info!(path = %config_path.display(), "Initialized voltx");

    loop {
        let remaining = unconfigured_providers(&config);
        if remaining.is_empty() {
            break;
        }
        let Some(provider) = choose_provider("Configure a provider:", &remaining)? else {
            break;
        };
        configure_provider(&mut config, auth, provider)?;
        config.save_to_path(&config_path)?;

        if unconfigured_providers(&config).is_empty()
            || !prompt_confirm("Configure another provider?", false)?
        {
            break;
        }
    }

    println!();
    println!("✅ Setup complete. Run `voltx chat` to start chatting.");
    Ok(())
}

pub fn run_auth(
    paths: &VoltxPaths,
    auth: &AuthManager,
    provider: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let config_path = paths.config_file();
    let mut config = Config::load_from_path(&config_path)?;

    let provider = match provider {
        Some(id) => parse_provider(id)?,
        None => {
            let all: Vec<&'static BuiltinProvider> = builtin_providers().iter().collect();
            match choose_provider("Select a provider to authenticate:", &all)? {
                Some(provider) => provider,
                None => return Ok(()),
            }
        }
    };

    configure_provider(&mut config, auth, provider)?;
    config.save_to_path(&config_path)?;
    Ok(())
}

pub fn run_deauth(
    paths: &VoltxPaths,
    auth: &AuthManager,
    provider: &str,
) -> Result<(), Box<dyn Error>> {
    let provider = parse_provider(provider)?;
    let config_path = paths.config_file();
    let mut config = Config::load_from_path(&config_path)?;

    let removed = auth.remove_api_key(&provider.id)?;
    config.mark_unconfigured(&provider.id);
    config.save_to_path(&config_path)?;

    if removed {
        println!("✅ Removed the stored {} API key", provider.display_name);
    } else {
        println!("ℹ️  No stored key for {}", provider.display_name);
    }
    if auth.has_api_key(&provider.id) {
        println!(
            "   {} is still set in your environment.",
            provider.env_key
        );
    }
    Ok(())
}
