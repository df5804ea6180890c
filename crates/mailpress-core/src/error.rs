//! Error types for the sending layer.

use thiserror::Error;

use crate::config::ValidationError;

/// Errors that can occur while configuring or sending mail.
#[derive(Debug, Error)]
pub enum Error {
    /// Message assembly failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailpress_mime::Error),

    /// The transport refused or failed to deliver the payload.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sender configuration failed validation.
    #[error("Invalid configuration: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for Error {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

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

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = Error::from(vec![ValidationError::EmptySmtpHost, ValidationError::NoRecipients]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: SMTP server is required; At least one recipient is required"
        );
    }

    #[test]
    fn test_mime_error_wrapped() {
        let err = Error::from(mailpress_mime::Error::EmptyBody);
        assert!(matches!(err, Error::Mime(mailpress_mime::Error::EmptyBody)));
        assert_eq!(err.to_string(), "MIME error: email body is empty");
    }
}
