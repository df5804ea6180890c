//! Sender configuration validation.

use mailpress_mime::is_valid_address;

use super::model::SenderConfig;

/// Validation error for sender configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// SMTP host is empty.
    EmptySmtpHost,
    /// SMTP port is invalid.
    InvalidSmtpPort,
    /// SMTP username is empty.
    EmptySmtpUsername,
    /// SMTP password is empty.
    EmptySmtpPassword,
    /// Sender address is empty.
    EmptyFrom,
    /// Sender address format is invalid.
    InvalidFrom,
    /// No recipients configured.
    NoRecipients,
    /// A recipient address format is invalid.
    InvalidRecipient(String),
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptySmtpHost => "SMTP server is required",
            Self::InvalidSmtpPort => "SMTP port must be 1-65535",
            Self::EmptySmtpUsername => "SMTP username is required",
            Self::EmptySmtpPassword => "SMTP password is required",
            Self::EmptyFrom => "Sender address is required",
            Self::InvalidFrom => "Invalid sender address format",
            Self::NoRecipients => "At least one recipient is required",
            Self::InvalidRecipient(_) => "Invalid recipient address format",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptySmtpHost => "smtp_host",
            Self::InvalidSmtpPort => "smtp_port",
            Self::EmptySmtpUsername => "smtp_username",
            Self::EmptySmtpPassword => "smtp_password",
            Self::EmptyFrom | Self::InvalidFrom => "from",
            Self::NoRecipients | Self::InvalidRecipient(_) => "to",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecipient(address) => write!(f, "{}: {address}", self.message()),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a sender configuration.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a sender configuration.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_config(config: &SenderConfig) -> ValidationResult {
    let mut errors = Vec::new();

    // SMTP validation
    if config.smtp.host.trim().is_empty() {
        errors.push(ValidationError::EmptySmtpHost);
    }
    if config.smtp.port == 0 {
        errors.push(ValidationError::InvalidSmtpPort);
    }
    if config.smtp.username.trim().is_empty() {
        errors.push(ValidationError::EmptySmtpUsername);
    }
    if config.smtp.password.is_empty() {
        errors.push(ValidationError::EmptySmtpPassword);
    }

    // Envelope validation
    if config.from.trim().is_empty() {
        errors.push(ValidationError::EmptyFrom);
    } else if !is_valid_address(&config.from) {
        errors.push(ValidationError::InvalidFrom);
    }
    if config.to.is_empty() {
        errors.push(ValidationError::NoRecipients);
    }
    errors.extend(
        config
            .to
            .iter()
            .filter(|address| !is_valid_address(address))
            .map(|address| ValidationError::InvalidRecipient(address.clone())),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
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
    use crate::config::SmtpSettings;

    fn complete() -> SenderConfig {
        SenderConfig::new(
            SmtpSettings::new("smtp.example.com", "user", "secret"),
            "sender@example.com",
            vec!["recipient@example.com".to_string()],
        )
    }

    #[test]
    fn test_validate_empty_config() {
        let errors = validate_config(&SenderConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptySmtpHost,
                ValidationError::EmptySmtpUsername,
                ValidationError::EmptySmtpPassword,
                ValidationError::EmptyFrom,
                ValidationError::NoRecipients,
            ]
        );
    }

    #[test]
    fn test_validate_complete_config() {
        assert!(validate_config(&complete()).is_ok());
    }

    #[test]
    fn test_port_zero() {
        let mut config = complete();
        config.smtp.port = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidSmtpPort]
        );
    }

    #[test]
    fn test_invalid_addresses_collected() {
        let mut config = complete();
        config.from = "nobody".to_string();
        config.to.push("bad@".to_string());
        config.to.push("also bad".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidFrom,
                ValidationError::InvalidRecipient("bad@".to_string()),
                ValidationError::InvalidRecipient("also bad".to_string()),
            ]
        );
        assert_eq!(errors[1].field(), "to");
        assert_eq!(errors[1].to_string(), "Invalid recipient address format: bad@");
    }

    #[test]
    fn test_whitespace_only_fields() {
        let mut config = complete();
        config.smtp.host = "   ".to_string();
        config.from = " ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptySmtpHost));
        assert!(errors.contains(&ValidationError::EmptyFrom));
    }
}
