//! Custom exit codes for the teams-gateway binary
//!
//! Codes follow the BSD sysexits.h conventions through the `exitcode` crate,
//! with a few application-specific codes above 100.

/// Exit codes reported by the `teams-gateway` binary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayExitCode {
    /// Command completed successfully
    Success = exitcode::OK,

    /// Command line usage error, e.g. a malformed option document
    UsageError = exitcode::USAGE,

    /// Response or request data could not be parsed
    DataError = exitcode::DATAERR,

    /// Remote host could not be reached
    Unavailable = exitcode::UNAVAILABLE,

    /// Unexpected internal failure
    SoftwareError = exitcode::SOFTWARE,

    /// Local file could not be read or written
    IoError = exitcode::IOERR,

    /// Configuration file or value is invalid
    ConfigError = exitcode::CONFIG,

    /// The session expired (HTTP 401)
    SessionExpired = 100,

    /// Remote API answered with an error status
    ApiError = 102,
}

impl GatewayExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            GatewayExitCode::Success => "Success",
            GatewayExitCode::UsageError => "Command line usage error",
            GatewayExitCode::DataError => "Data format error",
            GatewayExitCode::Unavailable => "Service unavailable",
            GatewayExitCode::SoftwareError => "Internal software error",
            GatewayExitCode::IoError => "Input/output error",
            GatewayExitCode::ConfigError => "Configuration error",
            GatewayExitCode::SessionExpired => "Session expired",
            GatewayExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<GatewayExitCode> for i32 {
    fn from(code: GatewayExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysexits_values() {
        assert_eq!(GatewayExitCode::Success.code(), 0);
        assert_eq!(GatewayExitCode::UsageError.code(), 64);
        assert_eq!(GatewayExitCode::ConfigError.code(), 78);
        assert_eq!(i32::from(GatewayExitCode::SessionExpired), 100);
    }
}
