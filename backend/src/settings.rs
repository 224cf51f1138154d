//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `LEDGER_*` environment variables and an
//! optional configuration file, in OrthoConfig's usual precedence.
//!
//! Switches are held as text and parsed by their accessors. A `bool` field
//! becomes a clap flag that reports `false` when absent, which would mask the
//! environment and the defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("bootstrap admin username and password must be set together")]
    PartialBootstrapAdmin,
    #[error("{name} must be true or false, got {value:?}")]
    Switch { name: &'static str, value: String },
}

/// Accept a switch written as a bool, a number or a string.
fn switch_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.map(|value| match value {
        Value::String(text) => text,
        other => other.to_string(),
    }))
}

fn parse_switch(
    name: &'static str,
    value: Option<&str>,
    default: bool,
) -> Result<bool, SettingsError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::Switch {
            name,
            value: raw.to_owned(),
        }),
    }
}

/// Configuration for the ledger server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LEDGER")]
pub struct LedgerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. The in-memory ledger is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway session key when the key file is missing.
    #[serde(default, deserialize_with = "switch_text")]
    pub allow_ephemeral_session_key: Option<String>,
    /// Mark the session cookie `Secure`. Defaults to true.
    #[serde(default, deserialize_with = "switch_text")]
    pub cookie_secure: Option<String>,
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    /// Seed the demo staff, students and requests on startup.
    #[serde(default, deserialize_with = "switch_text")]
    pub seed_demo_data: Option<String>,
}

impl LedgerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> Result<bool, SettingsError> {
        parse_switch("cookie_secure", self.cookie_secure.as_deref(), true)
    }

    pub fn allow_ephemeral_session_key(&self) -> Result<bool, SettingsError> {
        parse_switch(
            "allow_ephemeral_session_key",
            self.allow_ephemeral_session_key.as_deref(),
            false,
        )
    }

    pub fn seed_demo_data(&self) -> Result<bool, SettingsError> {
        parse_switch("seed_demo_data", self.seed_demo_data.as_deref(), false)
    }

    /// The configured bootstrap admin as `(username, password)`.
    ///
    /// Setting only one half is a configuration error.
    pub fn bootstrap_admin(&self) -> Result<Option<(&str, &str)>, SettingsError> {
        match (
            self.bootstrap_admin_username.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(username), Some(password)) => Ok(Some((username, password))),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialBootstrapAdmin),
        }
    }
}
