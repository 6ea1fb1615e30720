//! Shared test utilities for kconnect integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Clear `KCONNECT_*` variables inherited from the host.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Tests only exercise paths that fail or finish before any network or
//!   subprocess call.

use assert_cmd::Command;

/// Returns a hermetic `kconnect` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `KCONNECT_*` variables from the host are cleared.
pub fn kconnect_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kconnect");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    for (key, _) in std::env::vars() {
        if key.starts_with("KCONNECT_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("RUST_LOG");

    cmd
}
