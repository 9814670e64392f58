//! Environment-driven configuration.
//!
//! Every key is prefixed with `CONTRIVANCE_`:
//!
//! - `DATABASE_URL`: `PostgreSQL` connection string (optional; the in-memory
//!   stores are used without it)
//! - `DB_POOL_SIZE`: maximum pooled connections (default 8)
//! - `LOG_FILTER`: `tracing` filter directive (default `info`)
//! - `LOG_FORMAT`: `compact` or `json` (default `compact`)
//! - `CHAT_API_KEY`: chat-completion credential (optional)
//! - `CHAT_BASE_URL`: chat-completion endpoint root (default
//!   `https://api.x.ai/v1`)
//! - `CHAT_MODEL`: model name (default `grok-3-mini`)
//! - `CHAT_TIMEOUT_SECS`: request timeout (default 30)
//! - `STATUS_FIELD` / `STATUS_DISPLAY_FIELD`: row attributes receiving the
//!   derived technical win status
//!
//! Malformed values are errors rather than silent defaults.

use crate::pipeline::services::StatusFields;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const PREFIX: &str = "CONTRIVANCE_";

/// Default chat-completion endpoint root.
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.x.ai/v1";
/// Default chat-completion model.
pub const DEFAULT_CHAT_MODEL: &str = "grok-3-mini";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric key could not be parsed.
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber {
        /// Full variable name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// The log format is not recognised.
    #[error("{key} must be 'compact' or 'json', got '{value}'")]
    InvalidLogFormat {
        /// Full variable name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// A key that must not be blank was set to whitespace.
    #[error("{key} must not be blank")]
    Blank {
        /// Full variable name.
        key: String,
    },
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Compact,
        }
    }
}

/// Database settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Chat-completion collaborator settings, handed to the client at
/// construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Bearer credential. Chat features are disabled without one.
    pub api_key: Option<String>,
    /// Endpoint root; `/chat/completions` is appended.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ChatConfig {
    /// Returns `true` when a credential is present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CHAT_BASE_URL.to_owned(),
            model: DEFAULT_CHAT_MODEL.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Database settings, when a database is configured.
    pub database: Option<DatabaseConfig>,
    /// Logging settings.
    pub log: LogConfig,
    /// Chat-completion settings.
    pub chat: ChatConfig,
    /// Row attributes receiving the derived status.
    pub status_fields: StatusFields,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which receives full variable
    /// names.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let reader = Reader { lookup };

        let database = match reader.text("DATABASE_URL")? {
            Some(url) => Some(DatabaseConfig {
                url,
                pool_size: reader.number("DB_POOL_SIZE")?.unwrap_or(8),
            }),
            None => None,
        };

        let log_format = match reader.text("LOG_FORMAT")? {
            Some(value) => value
                .parse::<LogFormat>()
                .map_err(|()| ConfigError::InvalidLogFormat {
                    key: full_key("LOG_FORMAT"),
                    value,
                })?,
            None => LogFormat::default(),
        };
        let log = LogConfig {
            filter: reader
                .text("LOG_FILTER")?
                .unwrap_or_else(|| LogConfig::default().filter),
            format: log_format,
        };

        let chat_defaults = ChatConfig::default();
        let chat = ChatConfig {
            api_key: reader.optional("CHAT_API_KEY"),
            base_url: reader
                .text("CHAT_BASE_URL")?
                .map_or(chat_defaults.base_url, |url| url.trim_end_matches('/').to_owned()),
            model: reader.text("CHAT_MODEL")?.unwrap_or(chat_defaults.model),
            timeout: reader
                .number::<u64>("CHAT_TIMEOUT_SECS")?
                .map_or(chat_defaults.timeout, Duration::from_secs),
        };

        let status_defaults = StatusFields::default();
        let status_fields = StatusFields {
            primary: reader
                .text("STATUS_FIELD")?
                .unwrap_or(status_defaults.primary),
            display: reader
                .text("STATUS_DISPLAY_FIELD")?
                .unwrap_or(status_defaults.display),
        };

        Ok(Self {
            database,
            log,
            chat,
            status_fields,
        })
    }
}

struct Reader<F> {
    lookup: F,
}

impl<F> Reader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(&full_key(key))
    }

    /// Unset and empty keys are absent; whitespace-only values are errors.
    fn text(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.raw(key) {
            None => Ok(None),
            Some(value) if value.is_empty() => Ok(None),
            Some(value) if value.trim().is_empty() => Err(ConfigError::Blank {
                key: full_key(key),
            }),
            Some(value) => Ok(Some(value.trim().to_owned())),
        }
    }

    /// Secrets: unset, empty, and whitespace-only are all absent.
    fn optional(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn number<N>(&self, key: &str) -> Result<Option<N>, ConfigError>
    where
        N: FromStr + PartialOrd + Default,
    {
        let Some(value) = self.text(key)? else {
            return Ok(None);
        };
        match value.parse::<N>() {
            Ok(number) if number > N::default() => Ok(Some(number)),
            _ => Err(ConfigError::InvalidNumber {
                key: full_key(key),
                value,
            }),
        }
    }
}

fn full_key(key: &str) -> String {
    format!("{PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults are valid");

        assert_eq!(config, AppConfig::default());
        assert!(config.database.is_none());
        assert!(!config.chat.is_configured());
        assert_eq!(config.status_fields.primary, "Technical Win Status");
    }

    #[rstest]
    fn values_are_read_with_prefix() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CONTRIVANCE_DATABASE_URL", "postgres://localhost/contrivance"),
            ("CONTRIVANCE_DB_POOL_SIZE", "4"),
            ("CONTRIVANCE_LOG_FORMAT", "JSON"),
            ("CONTRIVANCE_CHAT_API_KEY", " secret "),
            ("CONTRIVANCE_CHAT_BASE_URL", "https://llm.example/v1/"),
            ("CONTRIVANCE_CHAT_TIMEOUT_SECS", "5"),
            ("CONTRIVANCE_STATUS_DISPLAY_FIELD", "TW"),
        ]))
        .expect("valid configuration");

        let database = config.database.expect("database configured");
        assert_eq!(database.pool_size, 4);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.chat.api_key.as_deref(), Some("secret"));
        assert_eq!(config.chat.base_url, "https://llm.example/v1");
        assert_eq!(config.chat.timeout, Duration::from_secs(5));
        assert_eq!(config.status_fields.display, "TW");
    }

    #[rstest]
    #[case("CONTRIVANCE_DB_POOL_SIZE", "many")]
    #[case("CONTRIVANCE_DB_POOL_SIZE", "0")]
    #[case("CONTRIVANCE_CHAT_TIMEOUT_SECS", "-1")]
    fn malformed_numbers_are_errors(#[case] key: &str, #[case] value: &str) {
        let err = AppConfig::from_lookup(lookup(&[
            ("CONTRIVANCE_DATABASE_URL", "postgres://localhost/contrivance"),
            (key, value),
        ]))
        .expect_err("value should be rejected");

        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[rstest]
    fn unknown_log_format_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("CONTRIVANCE_LOG_FORMAT", "xml")]))
            .expect_err("format should be rejected");

        assert_eq!(
            err,
            ConfigError::InvalidLogFormat {
                key: "CONTRIVANCE_LOG_FORMAT".to_owned(),
                value: "xml".to_owned(),
            }
        );
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let config = ChatConfig {
            api_key: Some("sk-live".to_owned()),
            ..ChatConfig::default()
        };

        assert!(!format!("{config:?}").contains("sk-live"));
    }
}
