//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service name under which credentials are stored.
pub const KEYRING_SERVICE: &str = "dinner-rotation";

/// Slack channel selection and bot credentials.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Channel used while developing or testing the rotation.
    pub dev_channel_id: String,
    /// Channel the real dinner group reads.
    pub prod_channel_id: String,
    /// Post into the production channel instead of the dev one.
    #[serde(default)]
    pub production: bool,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

impl SlackConfig {
    /// Channel that announcements and reports are posted to.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        if self.production {
            &self.prod_channel_id
        } else {
            &self.dev_channel_id
        }
    }
}

fn default_http_host() -> String {
    "127.0.0.1".into()
}

fn default_http_port() -> u16 {
    8080
}

fn default_report_limit() -> usize {
    crate::rotation::report::REPORT_LIMIT
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path of the `SQLite` database file.
    pub db_path: PathBuf,
    /// Interface the HTTP server binds to.
    #[serde(default = "default_http_host")]
    pub http_host: String,
    /// Port the HTTP server binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Maximum number of members listed in the weekly report message.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,
    /// Slack connectivity settings.
    pub slack: SlackConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the Slack bot token from OS keychain with env-var fallback.
    ///
    /// Tries the `dinner-rotation` keyring service first, then falls back
    /// to the `SLACK_BOT_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides the token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    /// Socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form a valid address.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|err| AppError::Config(format!("invalid http address: {err}")))
    }

    fn validate(&self) -> Result<()> {
        if self.slack.dev_channel_id.trim().is_empty() {
            return Err(AppError::Config("slack.dev_channel_id must not be empty".into()));
        }
        if self.slack.prod_channel_id.trim().is_empty() {
            return Err(AppError::Config(
                "slack.prod_channel_id must not be empty".into(),
            ));
        }
        if self.report_limit == 0 {
            return Err(AppError::Config(
                "report_limit must be greater than zero".into(),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }
        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
