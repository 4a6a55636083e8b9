//! Default model commands: `defaults`, `set`, `reset-defaults`.

use std::error::Error;

use tracing::info;

use crate::core::config::Config;
use crate::core::paths::VoltxPaths;
use crate::core::providers::parse_provider;

pub fn default_lines(config: &Config) -> Vec<String> {
    let mut lines = vec!["🎯 Default models".to_string(), String::new()];
    match config.global_default() {
        Some((provider, model)) => lines.push(format!("  Global: {model} ({provider})")),
        None => match &config.default_provider {
            Some(provider) => lines.push(format!("  Global: no model set ({provider})")),
            None => lines.push("  Global: not set".to_string()),
        },
    }

    let per_provider = config.sorted_default_models();
    if per_provider.is_empty() {
        lines.push("  No per-provider defaults configured.".to_string());
    } else {
        lines.push(String::new());
        for (provider, model) in per_provider {
            lines.push(format!("  {provider:<12}{model}"));
        }
    }
    lines
}

pub fn show_defaults(config: &Config) {
    for line in default_lines(config) {
        println!("{line}");
    }
}

/// Point `provider`'s default and the global default at `model`.
pub fn apply_default_model(
    config: &mut Config,
    provider: &str,
    model: &str,
) -> Result<Vec<String>, Box<dyn Error>> {
    let provider = parse_provider(provider)?;
    let model = model.trim();
    if model.is_empty() {
        return Err("Model name cannot be empty".into());
    }

    let mut notes = Vec::new();
    if !provider.has_model(model) {
        notes.push(format!(
            "⚠️  {model} is not in the {} catalog; using it anyway.",
            provider.display_name
        ));
    }
    config.set_global_default(&provider.id, model.to_string());
    notes.push(format!("✅ Default model set to {model} ({})", provider.id));
    Ok(notes)
}

pub fn apply_default_provider(
    config: &mut Config,
    provider: &str,
) -> Result<Vec<String>, Box<dyn Error>> {
    let provider = parse_provider(provider)?;
    config.default_provider = Some(provider.id.clone());
    config.default_model = config.get_default_model(&provider.id).cloned();

    let mut notes = vec![format!("✅ Default provider set to {}", provider.id)];
    if config.default_model.is_none() {
        notes.push(format!(
            "⚠️  {} has no default model yet. Run `voltx set default-model {} <model>`.",
            provider.id, provider.id
        ));
    }
    Ok(notes)
}

fn update_config<F>(paths: &VoltxPaths, update: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut Config) -> Result<Vec<String>, Box<dyn Error>>,
{
    let path = paths.config_file();
    let mut config = Config::load_from_path(&path)?;
    let notes = update(&mut config)?;
    config.save_to_path(&path)?;
    for note in notes {
        println!("{note}");
    }
    Ok(())
}

pub fn set_default_model(
    paths: &VoltxPaths,
    provider: &str,
    model: &str,
) -> Result<(), Box<dyn Error>> {
    update_config(paths, |config| apply_default_model(config, provider, model))?;
    info!(provider, model, "Default model changed");
    Ok(())
}

pub fn set_default_provider(paths: &VoltxPaths, provider: &str) -> Result<(), Box<dyn Error>> {
    update_config(paths, |config| apply_default_provider(config, provider))?;
    info!(provider, "Default provider changed");
    Ok(())
}

pub fn reset_defaults(paths: &VoltxPaths, hard: bool) -> Result<(), Box<dyn Error>> {
    if !hard {
        println!("⚠️  This removes every default model and the default provider.");
        println!("   Run `voltx reset-defaults --hard` to continue.");
        return Ok(());
    }
    update_config(paths, |config| {
        config.reset_defaults();
        Ok(vec!["✅ All default models cleared".to_string()])
    })?;
    info!("Default models reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn setting_a_model_updates_global_and_provider_defaults() {
        let mut config = Config::default();
        let notes = apply_default_model(&mut config, "DeepSeek", "deepseek-chat").unwrap();
        assert_eq!(notes, vec!["✅ Default model set to deepseek-chat (deepseek)"]);
        assert_eq!(config.global_default(), Some(("deepseek", "deepseek-chat")));
        assert_eq!(
            config.get_default_model("deepseek").map(String::as_str),
            Some("deepseek-chat")
        );
    }

    #[test]
    fn models_outside_the_catalog_are_accepted_with_a_warning() {
        let mut config = Config::default();
        let notes = apply_default_model(&mut config, "openai", "gpt-5-nano").unwrap();
        assert!(notes[0].contains("not in the OpenAI catalog"));
        assert_eq!(config.default_model.as_deref(), Some("gpt-5-nano"));
    }

    #[test]
    fn unknown_providers_are_rejected() {
        let mut config = Config::default();
        assert!(apply_default_model(&mut config, "mistral", "large").is_err());
        assert!(apply_default_provider(&mut config, "mistral").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn default_provider_picks_up_its_model() {
        let mut config = Config::default();
        config.set_default_model("google", "gemini-1.5-pro".to_string());

        apply_default_provider(&mut config, "google").unwrap();
        assert_eq!(config.global_default(), Some(("google", "gemini-1.5-pro")));

        let notes = apply_default_provider(&mut config, "perplexity").unwrap();
        assert_eq!(config.default_model, None);
        assert!(notes[1].contains("voltx set default-model perplexity <model>"));
    }

    #[test]
    fn default_lines_show_global_and_per_provider() {
        let mut config = Config::default();
        assert!(default_lines(&config).contains(&"  Global: not set".to_string()));

        config.set_global_default("openai", "gpt-4".to_string());
        config.set_default_model("anthropic", "claude-3-5-haiku-latest".to_string());
        let lines = default_lines(&config);
        assert!(lines.contains(&"  Global: gpt-4 (openai)".to_string()));
        let anthropic = lines.iter().position(|l| l.contains("claude-3-5-haiku-latest"));
        let openai = lines.iter().position(|l| l.starts_with("  openai"));
        assert!(anthropic < openai);
    }

    #[test]
    fn soft_reset_leaves_config_alone() {
        let dir = TempDir::new().unwrap();
        let paths = VoltxPaths::new(dir.path());
        set_default_model(&paths, "openai", "gpt-4").unwrap();

        reset_defaults(&paths, false).unwrap();
        let config = Config::load_from_path(&paths.config_file()).unwrap();
        assert_eq!(config.global_default(), Some(("openai", "gpt-4")));

        reset_defaults(&paths, true).unwrap();
        let config = Config::load_from_path(&paths.config_file()).unwrap();
        assert_eq!(config.global_default(), None);
        assert!(config.default_models.is_empty());
    }
}
