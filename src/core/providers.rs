use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::core::builtin_providers::{find_builtin_provider, provider_ids, BuiltinProvider};
use crate::core::config::Config;

const EXIT_CODE: i32 = 2;

/// The provider and model a chat or agent session talks to.
#[derive(Debug, Clone)]
pub struct ChatTarget {
    pub provider: &'static BuiltinProvider,
    pub model: String,
}

impl ChatTarget {
    pub fn provider_id(&self) -> &str {
        &self.provider.id
    }
}

#[derive(Debug)]
pub struct ProviderResolutionError {
    message: String,
    quick_fixes: Vec<String>,
    exit_code: i32,
}

impl ProviderResolutionError {
    pub fn unknown_provider(provider: &str) -> Self {
        Self::new(
            format!(
                "Unknown provider '{provider}'. Available providers: {}",
                provider_ids()
            ),
            vec!["voltx providers                 # List providers".to_string()],
        )
    }

    pub fn provider_not_configured(provider: &str) -> Self {
        Self::new(
            format!("{provider} provider is not configured."),
            vec![
                format!("voltx auth {provider:<20}# Store an API key"),
                match find_builtin_provider(provider) {
                    Some(p) => format!("export {}=...", p.env_key),
                    None => "voltx providers".to_string(),
                },
            ],
        )
    }

    pub fn no_default_provider() -> Self {
        Self::new(
            "No provider given and no default provider configured.",
            vec![
                "voltx chat <provider>           # Pick a provider for this session".to_string(),
                "voltx set default-model <provider> <model>".to_string(),
            ],
        )
    }

    pub fn no_default_model(provider: &str) -> Self {
        Self::new(
            format!("No model given and no default model configured for {provider}."),
            vec![
                format!("voltx chat {provider} --model <model>"),
                format!("voltx set default-model {provider} <model>"),
                format!("voltx models {provider}"),
            ],
        )
    }

    fn new(message: impl Into<String>, quick_fixes: Vec<String>) -> Self {
        Self {
            message: message.into(),
            quick_fixes,
            exit_code: EXIT_CODE,
        }
    }

    pub fn quick_fixes(&self) -> &[String] {
        &self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for ProviderResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ProviderResolutionError {}

/// Look up a provider id from the command line.
pub fn parse_provider(provider: &str) -> Result<&'static BuiltinProvider, ProviderResolutionError> {
    find_builtin_provider(provider).ok_or_else(|| ProviderResolutionError::unknown_provider(provider))
}

/// Work out which provider and model to use.
///
/// An explicit provider uses its per-provider default model; with no
/// provider the global default pair applies. An explicit model always wins.
/// The resulting provider must have a key according to `has_key`.
pub fn resolve_chat_target<F>(
    config: &Config,
    provider_arg: Option<&str>,
    model_arg: Option<&str>,
    has_key: F,
) -> Result<ChatTarget, ProviderResolutionError>
where
    F: Fn(&str) -> bool,
{
    let model_arg = model_arg.map(str::trim).filter(|m| !m.is_empty());
    let provider_arg = provider_arg.map(str::trim).filter(|p| !p.is_empty());

    let (provider, fallback_model) = match provider_arg {
        Some(id) => {
            let provider = parse_provider(id)?;
            (provider, config.get_default_model(&provider.id).cloned())
        }
        None => {
            let id = config
                .default_provider
                .as_deref()
                .ok_or_else(ProviderResolutionError::no_default_provider)?;
            let provider = parse_provider(id)?;
            let model = config
                .default_model
                .clone()
                .or_else(|| config.get_default_model(&provider.id).cloned());
            (provider, model)
        }
    };

    let model = model_arg
        .map(str::to_string)
        .or(fallback_model)
        .ok_or_else(|| ProviderResolutionError::no_default_model(&provider.id))?;

    if !has_key(&provider.id) {
        return Err(ProviderResolutionError::provider_not_configured(&provider.id));
    }
    if !provider.has_model(&model) {
        debug!(provider = %provider.id, model = %model, "Model is not in the built-in catalog");
    }

    Ok(ChatTarget { provider, model })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.set_global_default("openai", "gpt-4".to_string());
        config.set_default_model("deepseek", "deepseek-reasoner".to_string());
        config
    }

    fn resolve(
        config: &Config,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<(String, String), ProviderResolutionError> {
        resolve_chat_target(config, provider, model, |_| true)
            .map(|t| (t.provider.id.clone(), t.model))
    }

    #[test]
    fn global_default_is_used_without_arguments() {
        assert_eq!(
            resolve(&config(), None, None).unwrap(),
            ("openai".to_string(), "gpt-4".to_string())
        );
    }

    #[test]
    fn explicit_provider_uses_its_own_default() {
        assert_eq!(
            resolve(&config(), Some("DeepSeek"), None).unwrap(),
            ("deepseek".to_string(), "deepseek-reasoner".to_string())
        );
    }

    #[test]
    fn explicit_model_wins() {
        assert_eq!(
            resolve(&config(), Some("deepseek"), Some("deepseek-chat")).unwrap(),
            ("deepseek".to_string(), "deepseek-chat".to_string())
        );
        assert_eq!(
            resolve(&config(), None, Some("gpt-4o-2024-11-20")).unwrap(),
            ("openai".to_string(), "gpt-4o-2024-11-20".to_string())
        );
    }

    #[test]
    fn missing_defaults_are_reported() {
        let err = resolve(&Config::default(), None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No provider given and no default provider configured."
        );
        assert_eq!(err.exit_code(), 2);

        let err = resolve(&config(), Some("google"), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No model given and no default model configured for google."
        );
        assert!(err
            .quick_fixes()
            .iter()
            .any(|fix| fix == "voltx set default-model google <model>"));
    }

    #[test]
    fn unknown_provider_lists_alternatives() {
        let err = resolve(&config(), Some("mistral"), Some("x")).unwrap_err();
        assert!(err.to_string().starts_with("Unknown provider 'mistral'"));
        assert!(err.to_string().contains("perplexity"));
    }

    #[test]
    fn provider_without_key_is_rejected() {
        let err = resolve_chat_target(&config(), Some("anthropic"), Some("claude-3-5-haiku-latest"), |p| {
            p == "openai"
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "anthropic provider is not configured.");
        assert!(err
            .quick_fixes()
            .iter()
            .any(|fix| fix == "export ANTHROPIC_API_KEY=..."));
    }
}
