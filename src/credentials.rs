//! Credential storage consumed by the request layer.
//!
//! The request layer only ever reads credentials. Writing happens from the
//! CLI (`credentials set`) or from whatever login flow embeds the library.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CREDENTIALS_FILE_NAME: &str = "credentials.json";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("failed to resolve the credentials directory")]
    FailedToFindCredentialsDirectory,
    #[cfg(feature = "keyring-store")]
    #[error("keyring error: {0}")]
    KeyringError(#[from] crate::keyring::KeyringError),
}

/// Names of the values a credential store holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    TenantId,
    OrganizationId,
    ActiveTeamId,
}

/// Authentication context derived per call; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub access_token: Option<String>,
    pub tenant_id: Option<String>,
    pub organization_id: Option<String>,
    pub active_team_id: Option<String>,
}

/// Read access to persisted credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Option<String>;

    fn access_token(&self) -> Option<String> {
        self.get(CredentialKey::AccessToken)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(CredentialKey::RefreshToken)
    }

    fn tenant_id(&self) -> Option<String> {
        self.get(CredentialKey::TenantId)
    }

    fn organization_id(&self) -> Option<String> {
        self.get(CredentialKey::OrganizationId)
    }

    fn active_team_id(&self) -> Option<String> {
        self.get(CredentialKey::ActiveTeamId)
    }

    fn auth_context(&self) -> AuthContext {
        AuthContext {
            access_token: self.access_token(),
            tenant_id: self.tenant_id(),
            organization_id: self.organization_id(),
            active_team_id: self.active_team_id(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct StoredCredentials {
    values: BTreeMap<CredentialKey, String>,
}

impl Serialize for CredentialKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for CredentialKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Process-local store, used by tests and by embedders that manage tokens themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: CredentialKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: CredentialKey, value: impl Into<String>) {
        self.credentials.write().values.insert(key, value.into());
    }

    pub fn remove(&self, key: CredentialKey) {
        self.credentials.write().values.remove(&key);
    }

    pub fn clear(&self) {
        self.credentials.write().values.clear();
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.credentials.read().values.get(&key).cloned()
    }
}

/// JSON file store kept next to the configuration file.
///
/// The file is read once at open; writes go through to disk immediately.
pub struct FileCredentialStore {
    file_path: PathBuf,
    credentials: RwLock<StoredCredentials>,
}

impl FileCredentialStore {
    pub fn get_default_file_path() -> Result<PathBuf, CredentialError> {
        let mut path = crate::configuration::Configuration::get_default_configuration_directory()
            .map_err(|_| CredentialError::FailedToFindCredentialsDirectory)?;
        path.push(DEFAULT_CREDENTIALS_FILE_NAME);
        Ok(path)
    }

    pub fn open_default() -> Result<Self, CredentialError> {
        Self::open(Self::get_default_file_path()?)
    }

    pub fn open(file_path: PathBuf) -> Result<Self, CredentialError> {
        let credentials = if file_path.exists() {
            let content = fs::read_to_string(&file_path)?;
            serde_json::from_str(&content)?
        } else {
            debug!("No credentials file at {:?}, starting empty", file_path);
            StoredCredentials::default()
        };

        Ok(Self {
            file_path,
            credentials: RwLock::new(credentials),
        })
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.file_path, content)?;
        Ok(())
    }

    pub fn set(&self, key: CredentialKey, value: impl Into<String>) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write();
        credentials.values.insert(key, value.into());
        self.save(&credentials)
    }

    pub fn remove(&self, key: CredentialKey) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write();
        credentials.values.remove(&key);
        self.save(&credentials)
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write();
        credentials.values.clear();
        if self.file_path.exists() {
            fs::remove_file(&self.file_path)?;
        } else {
            warn!("Credentials file {:?} already absent", self.file_path);
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.credentials.read().values.get(&key).cloned()
    }
}
