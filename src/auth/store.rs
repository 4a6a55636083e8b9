//! Where API keys live.
//!
//! Keys are stored in the platform keyring under the `voltx` service, one
//! entry per provider id.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

use keyring::Entry;

pub const KEYRING_SERVICE: &str = "voltx";

/// Failures when talking to the credential backend.
///
/// `Unavailable` covers a keyring that is locked or missing entirely; callers
/// may fall back to environment variables. `Backend` is any other failure and
/// is reported as is.
#[derive(Debug)]
pub enum CredentialError {
    Unavailable(keyring::Error),
    Backend(keyring::Error),
}

impl CredentialError {
    fn inner(&self) -> &keyring::Error {
        match self {
            CredentialError::Unavailable(err) | CredentialError::Backend(err) => err,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, CredentialError::Unavailable(_))
    }
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                CredentialError::Unavailable(err)
            }
            other => CredentialError::Backend(other),
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Unavailable(err) => write!(f, "system keyring unavailable: {err}"),
            CredentialError::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

pub trait CredentialStore: Send + Sync {
    fn get(&self, provider: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, provider: &str, api_key: &str) -> Result<(), CredentialError>;
    /// Returns whether an entry existed.
    fn delete(&self, provider: &str) -> Result<bool, CredentialError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(provider: &str) -> Result<Entry, CredentialError> {
        Ok(Entry::new(KEYRING_SERVICE, &provider.to_lowercase())?)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, provider: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(provider)?.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, provider: &str, api_key: &str) -> Result<(), CredentialError> {
        Self::entry(provider)?.set_password(api_key)?;
        Ok(())
    }

    fn delete(&self, provider: &str) -> Result<bool, CredentialError> {
        match Self::entry(provider)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store, for tests and keyring-less environments.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    keys: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn with_key(provider: &str, api_key: &str) -> Self {
        let store = Self::default();
        if let Ok(mut keys) = store.keys.lock() {
            keys.insert(provider.to_lowercase(), api_key.to_string());
        }
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, provider: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .keys
            .lock()
            .ok()
            .and_then(|keys| keys.get(&provider.to_lowercase()).cloned()))
    }

    fn set(&self, provider: &str, api_key: &str) -> Result<(), CredentialError> {
        if let Ok(mut keys) = self.keys.lock() {
            keys.insert(provider.to_lowercase(), api_key.to_string());
        }
        Ok(())
    }

    fn delete(&self, provider: &str) -> Result<bool, CredentialError> {
        Ok(self
            .keys
            .lock()
            .ok()
            .and_then(|mut keys| keys.remove(&provider.to_lowercase()))
            .is_some())
    }
}
