//! Credential store backed by the operating system keyring.

use keyring::Entry;
use thiserror::Error;
use tracing::error;

use crate::credentials::{CredentialKey, CredentialStore};

pub const DEFAULT_KEYRING_SERVICE: &str = "teams-gateway";

#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("keyring error")]
    KeyringAccessError(#[from] keyring::Error),
}

pub struct KeyringCredentialStore {
    service: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> KeyringCredentialStore {
        KeyringCredentialStore {
            service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: CredentialKey) -> Result<Entry, KeyringError> {
        Ok(Entry::new(&self.service, key.as_ref())?)
    }

    pub fn try_get(&self, key: CredentialKey) -> Result<Option<String>, KeyringError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeyringError::from(e)),
        }
    }

    pub fn set(&self, key: CredentialKey, value: &str) -> Result<(), KeyringError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    pub fn remove(&self, key: CredentialKey) -> Result<(), KeyringError> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeyringError::from(e)),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read {} from keyring: {}", key, e);
                None
            }
        }
    }
}
