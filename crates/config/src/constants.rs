//! Centralized constants for the kconnect workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Environment
// =============================================================================

/// Prefix for environment variables that populate configuration items.
pub const ENV_PREFIX: &str = "KCONNECT";

/// Setting this variable to anything but `0`/`false` skips `.env` loading.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// HTTP Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of retries for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: usize = 3;

// =============================================================================
// Credential Defaults
// =============================================================================

/// Credential lifetime assumed when a backend reports no expiry (1 hour).
pub const DEFAULT_CREDENTIAL_LIFETIME_SECS: i64 = 3600;

/// Buffer before expiry within which an identity should be refreshed.
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;

// =============================================================================
// Common Item Names
// =============================================================================

/// Username shared by identity providers.
pub const USERNAME_CONFIG_ITEM: &str = "username";

/// Password shared by identity providers.
pub const PASSWORD_CONFIG_ITEM: &str = "password";
