//! `voltx config`, `whoami` and `reset`.

use std::error::Error;
use std::fs;

use tracing::{info, warn};

use crate::auth::ui::prompt_confirm;
use crate::auth::{mask_api_key, AuthManager, KeySource};
use crate::core::builtin_providers::builtin_providers;
use crate::core::config::Config;
use crate::core::paths::VoltxPaths;

pub fn config_lines(
    paths: &VoltxPaths,
    config: &Config,
    auth: &AuthManager,
    unmasked: bool,
) -> Vec<String> {
    let mut lines = vec![
        "⚙️  voltx configuration".to_string(),
        String::new(),
        format!("  Data directory: {}", paths.root().display()),
    ];
    match &config.user {
        Some(user) => lines.push(format!("  User:           {}", user.username)),
        None => lines.push("  User:           not initialized (run `voltx init`)".to_string()),
    }
    lines.push(format!(
        "  Default:        {}",
        config
            .global_default()
            .map(|(p, m)| format!("{m} ({p})"))
            .unwrap_or_else(|| "not set".to_string())
    ));

    lines.push(String::new());
    lines.push("  API keys:".to_string());
    for provider in builtin_providers() {
        let entry = match auth.api_key(&provider.id) {
            Ok(Some(key)) => {
                let shown = if unmasked {
                    key.value.clone()
                } else {
                    mask_api_key(&key.value)
                };
                let source = match key.source {
                    KeySource::Keyring => "keyring".to_string(),
                    KeySource::Environment(var) => format!("${var}"),
                };
                format!("{shown} ({source})")
            }
            Ok(None) => "not set".to_string(),
            Err(err) => format!("unavailable: {err}"),
        };
        lines.push(format!("    {:<12}{entry}", provider.id));
    }

    let defaults = config.sorted_default_models();
    if !defaults.is_empty() {
        lines.push(String::new());
        lines.push("  Default models:".to_string());
        for (provider, model) in defaults {
            lines.push(format!("    {provider:<12}{model}"));
        }
    }
    lines
}

pub fn show_config(paths: &VoltxPaths, auth: &AuthManager, unmasked: bool) -> Result<(), Box<dyn Error>> {
    let config = Config::load_from_path(&paths.config_file())?;
    for line in config_lines(paths, &config, auth, unmasked) {
        println!("{line}");
    }
    Ok(())
}

pub fn whoami_lines(config: &Config, saved_chats: usize) -> Vec<String> {
    let Some(user) = &config.user else {
        return vec!["voltx is not initialized. Run `voltx init` to set it up.".to_string()];
    };
    let providers = if config.providers.is_empty() {
        "none".to_string()
    } else {
        config.providers.join(", ")
    };
    vec![
        format!("👤 {}", user.username),
        format!("  Using voltx since {}", user.created_at.format("%d %b %Y")),
        format!("  Providers:   {providers}"),
        format!("  Saved chats: {saved_chats}"),
    ]
}

pub fn whoami(paths: &VoltxPaths) -> Result<(), Box<dyn Error>> {
    let config = Config::load_from_path(&paths.config_file())?;
    for line in whoami_lines(&config, paths.saved_chat_count()) {
        println!("{line}");
    }
    Ok(())
}

/// Delete the data directory and every stored key.
pub fn reset(paths: &VoltxPaths, auth: &AuthManager, danger: bool) -> Result<(), Box<dyn Error>> {
    if !paths.config_file().exists() {
        println!("voltx is not initialized. Run `voltx init` to set it up.");
        return Ok(());
    }
    if !danger {
        println!("⚠️  This permanently removes all voltx data: config, chats, logs, cache and stored keys.");
        println!("   If you are sure, run `voltx reset --danger`.");
        return Ok(());
    }

    println!("This will permanently remove {}", paths.root().display());
    if !prompt_confirm("Continue to deletion?", false)? {
        println!("Aborted. No changes made.");
        return Ok(());
    }

    for provider in builtin_providers() {
        if let Err(err) = auth.remove_api_key(&provider.id) {
            warn!(provider = %provider.id, error = %err, "Could not remove stored key");
        }
    }
    fs::remove_dir_all(paths.root())?;
    info!(path = %paths.root().display(), "Removed voltx data directory");
    println!("✅ voltx data cleared. Run `voltx init` to start again.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryCredentialStore;
    use crate::core::config::UserProfile;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn auth() -> AuthManager {
        AuthManager::with_store(
            Box::new(MemoryCredentialStore::with_key("openai", "sk-abcdef123456")),
            |name: &str| (name == "GEMINI_API_KEY").then(|| "gm-999999".to_string()),
        )
    }

    #[test]
    fn keys_are_masked_unless_asked() {
        let paths = VoltxPaths::new("/tmp/voltx-test");
        let config = Config::default();

        let masked = config_lines(&paths, &config, &auth(), false);
        assert!(masked.contains(&"    openai      **********23456 (keyring)".to_string()));
        assert!(masked.contains(&"    google      ****99999 ($GEMINI_API_KEY)".to_string()));
        assert!(masked.contains(&"    deepseek    not set".to_string()));

        let unmasked = config_lines(&paths, &config, &auth(), true);
        assert!(unmasked.contains(&"    openai      sk-abcdef123456 (keyring)".to_string()));
    }

    #[test]
    fn whoami_reports_profile() {
        let mut config = Config::default();
        assert_eq!(whoami_lines(&config, 0).len(), 1);

        config.user = Some(UserProfile {
            username: "alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 7, 9, 0, 0).unwrap(),
        });
        config.mark_configured("openai");
        config.mark_configured("google");
        assert_eq!(
            whoami_lines(&config, 4),
            vec![
                "👤 alice".to_string(),
                "  Using voltx since 07 Mar 2025".to_string(),
                "  Providers:   openai, google".to_string(),
                "  Saved chats: 4".to_string(),
            ]
        );
    }

    #[test]
    fn reset_without_danger_keeps_everything() {
        let dir = TempDir::new().unwrap();
        let paths = VoltxPaths::new(dir.path().join(".voltx"));
        paths.ensure_dirs().unwrap();
        Config::default().save_to_path(&paths.config_file()).unwrap();

        reset(&paths, &auth(), false).unwrap();
        assert!(paths.config_file().exists());
    }
}
