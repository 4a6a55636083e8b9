use crate::auth::AuthManager;
use crate::core::builtin_providers::builtin_providers;
use crate::core::config::Config;

pub fn provider_lines<F>(config: &Config, has_key: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut lines = vec!["🔌 Providers".to_string(), String::new()];
    for provider in builtin_providers() {
        let status = if has_key(&provider.id) { "✅" } else { "❌" };
        let is_default = config
            .default_provider
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(&provider.id));
        let id = if is_default {
            format!("{}*", provider.id)
        } else {
            provider.id.clone()
        };
        lines.push(format!(
            "  {status} {id:<12}{:<20}{}",
            provider.display_name, provider.base_url
        ));
    }
    lines.push(String::new());
    lines.push("✅ = key available   * = default provider".to_string());
    lines
}

pub fn list_providers(config: &Config, auth: &AuthManager) {
    for line in provider_lines(config, |p| auth.has_api_key(p)) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_configured_providers_are_marked() {
        let mut config = Config::default();
        config.set_global_default("anthropic", "claude-3-5-haiku-latest".to_string());

        let lines = provider_lines(&config, |p| p == "anthropic");
        let anthropic = lines
            .iter()
            .find(|l| l.contains("anthropic*"))
            .expect("anthropic row");
        assert!(anthropic.starts_with("  ✅"));
        assert!(anthropic.contains("https://api.anthropic.com/v1"));

        let openai = lines.iter().find(|l| l.contains("openai")).expect("openai row");
        assert!(openai.starts_with("  ❌"));
        assert!(!openai.contains("openai*"));
    }
}
