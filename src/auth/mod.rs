//! API key management
//!
//! Keys are read from the system keyring first and from the provider's
//! `<PROVIDER>_API_KEY` environment variable second. Only the keyring is
//! ever written to.

pub mod store;
pub mod ui;

use tracing::{debug, info, warn};

use crate::core::builtin_providers::{builtin_providers, find_builtin_provider};
use crate::core::completion::{CompletionClients, OpenAiCompatibleClient};

use self::store::{CredentialError, CredentialStore, KeyringStore};

const VISIBLE_KEY_CHARS: usize = 5;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Keyring,
    Environment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub value: String,
    pub source: KeySource,
}

pub struct AuthManager {
    store: Box<dyn CredentialStore>,
    env: EnvLookup,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    /// Keyring-backed manager reading fallbacks from the process environment.
    pub fn new() -> Self {
        Self::with_store(Box::new(KeyringStore), |name: &str| {
            std::env::var(name).ok()
        })
    }

    pub fn with_store<F>(store: Box<dyn CredentialStore>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            store,
            env: Box::new(env),
        }
    }

    fn env_key(&self, provider: &str) -> Option<ApiKey> {
        let var = find_builtin_provider(provider)?.env_key.clone();
        let value = (self.env)(&var).filter(|v| !v.trim().is_empty())?;
        Some(ApiKey {
            value: value.trim().to_string(),
            source: KeySource::Environment(var),
        })
    }

    /// The key to use for `provider`, if any.
    pub fn api_key(&self, provider: &str) -> Result<Option<ApiKey>, CredentialError> {
        match self.store.get(provider) {
            Ok(Some(value)) => Ok(Some(ApiKey {
                value,
                source: KeySource::Keyring,
            })),
            Ok(None) => Ok(self.env_key(provider)),
            Err(err) if err.is_unavailable() => {
                warn!(provider, error = %err, "Keyring unavailable, checking environment");
                match self.env_key(provider) {
                    Some(key) => Ok(Some(key)),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    pub fn has_api_key(&self, provider: &str) -> bool {
        matches!(self.api_key(provider), Ok(Some(_)))
    }

    pub fn store_api_key(&self, provider: &str, api_key: &str) -> Result<(), CredentialError> {
        self.store.set(provider, api_key.trim())?;
        info!(provider, "Stored API key");
        Ok(())
    }

    pub fn remove_api_key(&self, provider: &str) -> Result<bool, CredentialError> {
        let removed = self.store.delete(provider)?;
        info!(provider, removed, "Removed API key");
        Ok(removed)
    }

    /// One completion client per provider that has a key.
    pub fn build_clients(&self, http: &reqwest::Client) -> CompletionClients {
        let mut clients = CompletionClients::new();
        for provider in builtin_providers() {
            match self.api_key(&provider.id) {
                Ok(Some(key)) => {
                    debug!(provider = %provider.id, source = ?key.source, "Registering completion client");
                    clients.insert(OpenAiCompatibleClient::new(
                        http.clone(),
                        provider,
                        key.value,
                    ));
                }
                Ok(None) => {}
                Err(err) => warn!(provider = %provider.id, error = %err, "Skipping provider"),
            }
        }
        clients
    }
}

/// Hide all but the last five characters of a key. Keys of five characters
/// or fewer are hidden entirely.
pub fn mask_api_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= VISIBLE_KEY_CHARS {
        return "*".repeat(count);
    }
    let visible: String = key.chars().skip(count - VISIBLE_KEY_CHARS).collect();
    format!("{}{}", "*".repeat(count - VISIBLE_KEY_CHARS), visible)
}

#[cfg(test)]
mod tests {
    use super::store::MemoryCredentialStore;
    use super::*;

    fn manager_with(store: MemoryCredentialStore, env: &'static [(&'static str, &'static str)]) -> AuthManager {
        AuthManager::with_store(Box::new(store), move |name: &str| {
            env.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn keyring_wins_over_environment() {
        let auth = manager_with(
            MemoryCredentialStore::with_key("openai", "sk-keyring"),
            &[("OPENAI_API_KEY", "sk-env")],
        );
        assert_eq!(
            auth.api_key("openai").unwrap(),
            Some(ApiKey {
                value: "sk-keyring".to_string(),
                source: KeySource::Keyring
            })
        );
    }

    #[test]
    fn environment_is_the_fallback() {
        let auth = manager_with(
            MemoryCredentialStore::default(),
            &[("GEMINI_API_KEY", " gm-env "), ("DEEPSEEK_API_KEY", "  ")],
        );
        assert_eq!(
            auth.api_key("google").unwrap(),
            Some(ApiKey {
                value: "gm-env".to_string(),
                source: KeySource::Environment("GEMINI_API_KEY".to_string())
            })
        );
        assert_eq!(auth.api_key("deepseek").unwrap(), None);
        assert!(!auth.has_api_key("anthropic"));
        assert!(auth.has_api_key("google"));
    }

    #[test]
    fn store_and_remove_keys() {
        let auth = manager_with(MemoryCredentialStore::default(), &[]);
        auth.store_api_key("perplexity", " pplx-123 \n").unwrap();
        assert_eq!(
            auth.api_key("perplexity").unwrap().map(|k| k.value),
            Some("pplx-123".to_string())
        );
        assert!(auth.remove_api_key("perplexity").unwrap());
        assert!(!auth.remove_api_key("perplexity").unwrap());
    }

    #[test]
    fn clients_are_built_for_configured_providers_only() {
        let auth = manager_with(
            MemoryCredentialStore::with_key("anthropic", "ak"),
            &[("DEEPSEEK_API_KEY", "dk")],
        );
        let clients = auth.build_clients(&reqwest::Client::new());
        assert_eq!(clients.providers(), vec!["anthropic", "deepseek"]);
        assert!(clients.get("openai").is_none());
    }

    #[test]
    fn masking_keeps_last_five_characters() {
        assert_eq!(mask_api_key("sk-abcdef123456"), "**********23456");
        assert_eq!(mask_api_key("123456"), "*23456");
        assert_eq!(mask_api_key("12345"), "*****");
        assert_eq!(mask_api_key("abc"), "***");
        assert_eq!(mask_api_key(""), "");
    }
}
