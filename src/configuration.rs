use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "teams-gateway";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "TEAMS_GATEWAY_CONFIG_DIR";
pub const SERVER_URL_ENV: &str = "TEAMS_GATEWAY_SERVER_URL";

pub const DEFAULT_LOCAL_API_URL: &str = "http://localhost:3030";
pub const DEFAULT_REDIRECT_PATH: &str = "/auth/passcode";
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_LANGUAGES: [&str; 13] = [
    "en", "fr", "ar", "bg", "zh", "nl", "de", "he", "it", "pl", "pt", "ru", "es",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause:?}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause:?}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid value {value:?} for property {name:?}")]
    InvalidPropertyValue { name: String, value: String },
}

/// Settings for both request clients and the session policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Origin of the backend-for-frontend; the local client talks to `{local_api_url}/api`.
    local_api_url: Url,
    /// Origin of the remote API; the direct client talks to `{server_url}/api`.
    #[serde(skip_serializing_if = "Option::is_none")]
    server_url: Option<Url>,
    /// Desktop deployment mode: the server address is asked from the local backend.
    desktop: bool,
    redirect_path: String,
    languages: Vec<String>,
    timeout_secs: u64,
    /// Authenticate local calls with the active team id instead of the access token.
    legacy_team_bearer: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            local_api_url: default_local_api_url(),
            server_url: None,
            desktop: false,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            legacy_team_bearer: false,
        }
    }
}

fn default_local_api_url() -> Url {
    Url::parse(DEFAULT_LOCAL_API_URL).unwrap_or_else(|_| unreachable!("static URL is valid"))
}

impl Configuration {
    pub fn local_api_url(&self) -> &Url {
        &self.local_api_url
    }

    pub fn server_url(&self) -> Option<&Url> {
        self.server_url.as_ref()
    }

    pub fn desktop(&self) -> bool {
        self.desktop
    }

    pub fn redirect_path(&self) -> &str {
        &self.redirect_path
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn legacy_team_bearer(&self) -> bool {
        self.legacy_team_bearer
    }

    pub fn with_local_api_url(mut self, url: Url) -> Self {
        self.local_api_url = url;
        self
    }

    pub fn with_server_url(mut self, url: Option<Url>) -> Self {
        self.server_url = url;
        self
    }

    pub fn with_desktop(mut self, desktop: bool) -> Self {
        self.desktop = desktop;
        self
    }

    pub fn with_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_legacy_team_bearer(mut self, legacy_team_bearer: bool) -> Self {
        self.legacy_team_bearer = legacy_team_bearer;
        self
    }

    /// Set a property by its YAML name, as the `config set` command does.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), ConfigurationError> {
        let invalid = || ConfigurationError::InvalidPropertyValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "local_api_url" => self.local_api_url = Url::parse(value).map_err(|_| invalid())?,
            "server_url" if value.is_empty() => self.server_url = None,
            "server_url" => self.server_url = Some(Url::parse(value).map_err(|_| invalid())?),
            "desktop" => self.desktop = value.parse().map_err(|_| invalid())?,
            "redirect_path" if value.starts_with('/') => self.redirect_path = value.to_string(),
            "languages" => {
                self.languages = value
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "timeout_secs" => self.timeout_secs = value.parse().map_err(|_| invalid())?,
            "legacy_team_bearer" => self.legacy_team_bearer = value.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Apply environment overrides on top of the file values.
    pub fn apply_env(mut self) -> Self {
        if let Ok(server_url) = std::env::var(SERVER_URL_ENV) {
            match Url::parse(&server_url) {
                Ok(url) => {
                    debug!("Using server URL from {}", SERVER_URL_ENV);
                    self.server_url = Some(url);
                }
                Err(e) => warn!("Ignoring invalid {}={:?}: {}", SERVER_URL_ENV, server_url, e),
            }
        }
        self
    }

    pub fn get_default_configuration_directory() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(config_dir_str));
        }

        match dirs::config_dir() {
            Some(mut directory) => {
                directory.push(DEFAULT_APPLICATION_ID);
                Ok(directory)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        let mut path = Self::get_default_configuration_directory()?;
        path.push(DEFAULT_CONFIGURATION_FILE_NAME);
        Ok(path)
    }

    /// Load default configuration, creating a default one if none exists
    pub fn load_or_create_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading or creating configuration from {:?}...", default_file_path);

        if !default_file_path.exists() {
            debug!("Configuration file not found, creating default configuration");
            let default_config = Configuration::default();
            default_config.save(&default_file_path)?;
            return Ok(default_config.apply_env());
        }

        Ok(Configuration::load_from_file(default_file_path)?.apply_env())
    }

    pub fn load_from_file(path: PathBuf) -> Result<Configuration, ConfigurationError> {
        let content = fs::read_to_string(path).map_err(|cause| {
            ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }
        })?;
        serde_yaml::from_str(&content).map_err(|cause| ConfigurationError::FailedToLoadData {
            cause: Box::new(cause),
        })
    }

    pub fn write(&self, writer: Box<dyn Write>) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn to_yaml(&self) -> Result<String, ConfigurationError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigurationError> {
        match path.parent() {
            Some(directory) => fs::create_dir_all(directory)
                .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?,
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(Box::new(file))
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }
}
