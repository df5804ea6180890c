//! Sender configuration types.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// SMTP server settings handed to a transport.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 587).
    pub port: u16,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl SmtpSettings {
    /// Submission port used when none is configured.
    #[must_use]
    pub const fn default_port() -> u16 {
        587
    }

    /// Creates settings on the default port.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Self::default_port(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Overrides the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &password)
            .finish()
    }
}

/// Settings for a sender with a fixed envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// SMTP server settings.
    pub smtp: SmtpSettings,
    /// Sender address.
    pub from: String,
    /// Recipient addresses, in header order.
    pub to: Vec<String>,
}

impl SenderConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(smtp: SmtpSettings, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            smtp,
            from: from.into(),
            to,
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// Missing fields take their defaults; nothing is validated here.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading sender configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the configuration to a file, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn config() -> SenderConfig {
        SenderConfig::new(
            SmtpSettings::new("smtp.example.com", "user", "hunter2"),
            "sender@example.com",
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
        )
    }

    mod smtp_settings_tests {
        use super::*;

        #[test]
        fn test_default_port() {
            assert_eq!(SmtpSettings::default_port(), 587);
            assert_eq!(SmtpSettings::default().port, 587);
            assert_eq!(SmtpSettings::new("h", "u", "p").port, 587);
            assert_eq!(SmtpSettings::new("h", "u", "p").with_port(2525).port, 2525);
        }

        #[test]
        fn test_debug_hides_password() {
            let debug = format!("{:?}", SmtpSettings::new("h", "u", "hunter2"));
            assert!(!debug.contains("hunter2"));
            assert!(debug.contains("<redacted>"));
            assert!(debug.contains("\"u\""));
        }

        #[test]
        fn test_config_debug_hides_password() {
            assert!(!format!("{:?}", config()).contains("hunter2"));
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_parse_full() {
            let json = r#"{
                "smtp": {"host": "smtp.example.com", "port": 465, "username": "user", "password": "pw"},
                "from": "sender@example.com",
                "to": ["x@y.com", "z@y.com"]
            }"#;
            let config = SenderConfig::from_json(json).unwrap();
            assert_eq!(config.smtp.port, 465);
            assert_eq!(config.to, vec!["x@y.com", "z@y.com"]);
        }

        #[test]
        fn test_missing_port_defaults() {
            let json = r#"{"smtp": {"host": "h"}, "from": "a@b.com"}"#;
            let config = SenderConfig::from_json(json).unwrap();
            assert_eq!(config.smtp.port, 587);
            assert!(config.to.is_empty());
        }

        #[test]
        fn test_malformed_json() {
            let err = SenderConfig::from_json("{not json").unwrap_err();
            assert!(matches!(err, crate::Error::Json(_)));
        }

        #[test]
        fn test_save_then_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("sender.json");

            config().save(&path).unwrap();
            assert_eq!(SenderConfig::load(&path).unwrap(), config());
        }

        #[test]
        fn test_load_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = SenderConfig::load(dir.path().join("absent.json")).unwrap_err();
            assert!(matches!(err, crate::Error::Io(_)));
        }
    }
}
