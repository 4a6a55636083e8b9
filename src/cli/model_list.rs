//! `voltx models`: the built-in model catalog.

use crate::core::builtin_providers::{builtin_providers, BuiltinProvider};
use crate::core::config::Config;
use crate::core::providers::{parse_provider, ProviderResolutionError};

pub fn model_lines(provider: &BuiltinProvider, default_model: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("🤖 {} ({})", provider.display_name, provider.id)];
    for model in &provider.models {
        if Some(model.as_str()) == default_model {
            lines.push(format!("  • {model} (default)"));
        } else {
            lines.push(format!("  • {model}"));
        }
    }
    if let Some(default) = default_model.filter(|d| !provider.has_model(d)) {
        lines.push(format!("  • {default} (default, not in catalog)"));
    }
    lines
}

pub fn list_models(config: &Config, provider: Option<&str>) -> Result<(), ProviderResolutionError> {
    let providers: Vec<&BuiltinProvider> = match provider {
        Some(id) => vec![parse_provider(id)?],
        None => builtin_providers().iter().collect(),
    };

    for (index, provider) in providers.iter().enumerate() {
        if index > 0 {
            println!();
        }
        let default = config.get_default_model(&provider.id).map(String::as_str);
        for line in model_lines(provider, default) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builtin_providers::find_builtin_provider;

    #[test]
    fn default_model_is_flagged() {
        let deepseek = find_builtin_provider("deepseek").unwrap();
        let lines = model_lines(deepseek, Some("deepseek-chat"));
        assert_eq!(lines[0], "🤖 DeepSeek (deepseek)");
        assert!(lines.contains(&"  • deepseek-chat (default)".to_string()));
        assert_eq!(lines.len(), deepseek.models.len() + 1);
    }

    #[test]
    fn custom_default_is_listed_separately() {
        let deepseek = find_builtin_provider("deepseek").unwrap();
        let lines = model_lines(deepseek, Some("deepseek-custom"));
        assert_eq!(
            lines.last().unwrap(),
            "  • deepseek-custom (default, not in catalog)"
        );
    }
}
