//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map ProviderError and ConfigError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Signal handling (see cancellation.rs for SIGINT handling).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use kconnect_config::ConfigError;
use kconnect_provider::ProviderError;

/// Structured exit codes for kconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Authentication failure - rejected credentials, failed login, or no
    /// usable credentials.
    AuthenticationFailed = 2,

    /// Connection error - endpoint discovery, realm lookup, cluster lookup or
    /// the `az` executable could not be reached.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// Unknown provider name.
    NotFound = 4,

    /// Validation error - missing or invalid configuration, malformed cluster
    /// identifier.
    ///
    /// Scripts should fix the input and not retry the same request.
    ValidationError = 5,

    /// A login needs a human but interaction was disabled.
    ///
    /// Scripts should rerun with `--interactive true` from a terminal.
    InteractionRequired = 6,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }

    /// Returns true if this exit code indicates a retryable condition.
    #[allow(dead_code)]
    pub const fn is_retryable(self) -> bool {
        matches!(self, ExitCode::ConnectionError)
    }
}

impl From<&ProviderError> for ExitCode {
    fn from(err: &ProviderError) -> Self {
        if err.is_not_found() {
            ExitCode::NotFound
        } else if err.requires_interaction() {
            ExitCode::InteractionRequired
        } else if err.is_config_error() {
            ExitCode::ValidationError
        } else if err.is_transport_error() {
            ExitCode::ConnectionError
        } else if err.is_auth_error() {
            ExitCode::AuthenticationFailed
        } else {
            ExitCode::GeneralError
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::MissingRequiredValue(_)
            | ConfigError::InvalidValue { .. }
            | ConfigError::TypeMismatch { .. }
            | ConfigError::ItemNotFound(_)
            | ConfigError::Deserialize(_) => ExitCode::ValidationError,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no provider or config error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(provider_err) = cause.downcast_ref::<ProviderError>() {
                return ExitCode::from(provider_err);
            }
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(config_err);
            }
        }

        ExitCode::GeneralError
    }
}
