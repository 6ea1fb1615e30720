//! Azure CLI (`az`) invocations and token parsing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use crate::exec::{CommandInvocation, StdioMode};

pub const AZ_PROGRAM: &str = "az";

/// `az login` with a username and password, output captured.
pub fn password_login(username: &str, password: &SecretString, tenant: &str) -> CommandInvocation {
    CommandInvocation::new(AZ_PROGRAM)
        .args(["login", "--username", username, "--password"])
        .secret_arg(password.clone())
        .args(["--tenant", tenant])
        .stdio(StdioMode::Captured)
}

/// `az login` against a tenant, sharing the user's terminal.
pub fn interactive_login(tenant: &str) -> CommandInvocation {
    CommandInvocation::new(AZ_PROGRAM)
        .args(["login", "--tenant", tenant])
        .stdio(StdioMode::Inherited)
}

/// `az account get-access-token` for a tenant, JSON output captured.
pub fn get_access_token(tenant: &str) -> CommandInvocation {
    CommandInvocation::new(AZ_PROGRAM)
        .args(["account", "get-access-token", "--tenant", tenant, "--output", "json"])
        .stdio(StdioMode::Captured)
}

#[derive(Deserialize)]
struct AzAccessToken {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "tokenType", default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_on: Option<i64>,
    #[serde(rename = "expiresOn", default)]
    expires_on_local: Option<String>,
}

/// A token reported by `az account get-access-token`.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Parse `az account get-access-token --output json` output.
///
/// The expiry is taken from the POSIX `expires_on` field when present, else
/// from the local-time `expiresOn` string. A token with neither has no expiry.
pub fn parse_access_token(stdout: &str) -> Result<AccessToken, serde_json::Error> {
    let raw: AzAccessToken = serde_json::from_str(stdout)?;

    let expires_at = raw
        .expires_on
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .or_else(|| raw.expires_on_local.as_deref().and_then(parse_local_expiry));

    Ok(AccessToken {
        access_token: SecretString::new(raw.access_token.into()),
        token_type: raw.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_at,
    })
}

fn parse_local_expiry(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
