//! Built-in provider catalog
//!
//! The catalog is embedded from `builtin_providers.toml` at build time and
//! parsed once on first use.

use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinProvider {
    pub id: String,
    pub display_name: String,
    pub base_url: String,
    pub mode: Option<String>,
    /// Environment variable consulted when no key is stored in the keyring.
    pub env_key: String,
    /// Accent color used when the provider tag is drawn.
    pub color: String,
    #[serde(default)]
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinProvidersConfig {
    providers: Vec<BuiltinProvider>,
}

impl BuiltinProvider {
    /// Get the authentication mode for this provider
    pub fn auth_mode(&self) -> &str {
        self.mode.as_deref().unwrap_or("openai")
    }

    /// Check if this provider uses Anthropic-style authentication
    pub fn is_anthropic_mode(&self) -> bool {
        self.auth_mode() == "anthropic"
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

/// All built-in providers, in catalog order.
pub fn builtin_providers() -> &'static [BuiltinProvider] {
    static PROVIDERS: OnceLock<Vec<BuiltinProvider>> = OnceLock::new();
    PROVIDERS.get_or_init(|| {
        const CONFIG_CONTENT: &str = include_str!("../builtin_providers.toml");
        let config: BuiltinProvidersConfig =
            toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_providers.toml");
        config.providers
    })
}

/// Find a built-in provider by ID (case-insensitive)
pub fn find_builtin_provider(id: &str) -> Option<&'static BuiltinProvider> {
    builtin_providers()
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Comma separated list of provider ids, for error messages.
pub fn provider_ids() -> String {
    builtin_providers()
        .iter()
        .map(|p| p.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contains_expected_providers() {
        let ids: Vec<&str> = builtin_providers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["openai", "anthropic", "google", "deepseek", "perplexity"]
        );
    }

    #[test]
    fn test_find_builtin_provider() {
        let provider = find_builtin_provider("OpenAI");
        assert_eq!(provider.map(|p| p.id.as_str()), Some("openai"));

        let provider = find_builtin_provider("deepseek").expect("deepseek");
        assert_eq!(provider.display_name, "DeepSeek");
        assert!(provider.has_model("deepseek-reasoner"));

        assert!(find_builtin_provider("nonexistent").is_none());
    }

    #[test]
    fn test_anthropic_mode() {
        let anthropic = find_builtin_provider("anthropic").unwrap();
        assert!(anthropic.is_anthropic_mode());

        let google = find_builtin_provider("google").unwrap();
        assert!(!google.is_anthropic_mode());
        assert_eq!(google.auth_mode(), "openai");
    }

    #[test]
    fn test_provider_properties() {
        for provider in builtin_providers() {
            assert!(!provider.display_name.is_empty());
            assert!(provider.base_url.starts_with("https://"));
            assert!(provider.env_key.ends_with("_API_KEY"));
            assert!(!provider.models.is_empty(), "{} has no models", provider.id);
        }
    }
}
