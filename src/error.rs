use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    configuration::ConfigurationError, credentials::CredentialError, exit_codes::GatewayExitCode,
    response::ErrorResponse,
};

/// Errors surfaced by the request clients and the router.
///
/// Nothing here is retried; every variant reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum RequestError {
    /// DNS, connection, timeout or body streaming failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status
    #[error("request failed with status {}: {}", .0.status, .0.message())]
    Status(ErrorResponse),
    /// The response body could not be decoded into the requested type
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
    /// A request option document contained a key outside `tenantId`, `directAPI`, `headers`
    #[error("unknown request option {0:?}")]
    UnknownOption(String),
    #[error("invalid value for request option {0:?}")]
    InvalidOption(String),
}

impl RequestError {
    /// The HTTP error response, when the failure came from the server.
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            RequestError::Status(response) => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status(response) => Some(response.status),
            RequestError::Transport(error) => error.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn exit_code(&self) -> GatewayExitCode {
        match self {
            RequestError::Status(response) if response.status == StatusCode::UNAUTHORIZED => {
                GatewayExitCode::SessionExpired
            }
            RequestError::Status(_) => GatewayExitCode::ApiError,
            RequestError::Transport(_) => GatewayExitCode::Unavailable,
            RequestError::Json(_) => GatewayExitCode::DataError,
            RequestError::InvalidUrl(_) => GatewayExitCode::ConfigError,
            RequestError::InvalidHeader { .. }
            | RequestError::UnknownOption(_)
            | RequestError::InvalidOption(_) => GatewayExitCode::UsageError,
        }
    }
}

/// Error types that can occur while running a CLI command
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    #[error("Credential error: {0}")]
    CredentialError(#[from] CredentialError),
    #[error("{0}")]
    RequestError(#[from] RequestError),
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
    #[error("Undefined or unsupported subcommand")]
    UnsupportedSubcommand(String),
}

impl GatewayError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> GatewayExitCode {
        match self {
            GatewayError::ConfigurationError(_) => GatewayExitCode::ConfigError,
            GatewayError::CredentialError(_) => GatewayExitCode::IoError,
            GatewayError::RequestError(e) => e.exit_code(),
            GatewayError::JsonError(_) => GatewayExitCode::DataError,
            GatewayError::MissingRequiredArgument(_) => GatewayExitCode::UsageError,
            GatewayError::UnsupportedSubcommand(_) => GatewayExitCode::UsageError,
        }
    }
}
