use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Contents of `config.toml`.
///
/// Scalar keys are declared before tables so the serialized file stays
/// valid TOML.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider used when `voltx chat` is given none
    pub default_provider: Option<String>,
    /// Model used together with `default_provider`
    pub default_model: Option<String>,
    /// Providers that have a stored credential
    #[serde(default)]
    pub providers: Vec<String>,
    pub user: Option<UserProfile>,
    /// Per-provider default model, keyed by lowercase provider id
    #[serde(default)]
    pub default_models: HashMap<String, String>,
}

impl Config {
    pub fn is_initialized(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_provider_configured(&self, provider: &str) -> bool {
        self.providers
            .iter()
            .any(|p| p.eq_ignore_ascii_case(provider))
    }

    pub fn mark_configured(&mut self, provider: &str) {
        if !self.is_provider_configured(provider) {
            self.providers.push(provider.to_lowercase());
        }
    }

    /// Forget a provider along with every default that points at it.
    pub fn mark_unconfigured(&mut self, provider: &str) {
        self.providers.retain(|p| !p.eq_ignore_ascii_case(provider));
        self.unset_default_model(provider);
        if self
            .default_provider
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(provider))
        {
            self.default_provider = None;
            self.default_model = None;
        }
    }
}
