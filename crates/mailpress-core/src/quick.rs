//! Plain-text sends with a fixed envelope.

use mailpress_mime::Message;

use crate::config::{SenderConfig, validate_config};
use crate::error::Result;
use crate::sender::MailSender;
use crate::transport::Transport;

/// Sends plain-text messages from one sender to a fixed recipient list.
#[derive(Debug)]
pub struct QuickSender<T> {
    sender: MailSender<T>,
    from: String,
    to: Vec<String>,
}

impl<T: Transport> QuickSender<T> {
    /// Creates a quick sender.
    ///
    /// Addresses are checked when a message is sent.
    #[must_use]
    pub fn new(transport: T, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            sender: MailSender::new(transport),
            from: from.into(),
            to,
        }
    }

    /// Creates a quick sender from a validated configuration.
    ///
    /// The SMTP settings are the transport's concern; only the envelope is
    /// taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] with every problem found.
    pub fn from_config(transport: T, config: &SenderConfig) -> Result<Self> {
        validate_config(config)?;
        Ok(Self::new(transport, config.from.clone(), config.to.clone()))
    }

    /// Sender address.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Recipient addresses.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.to
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        self.sender.transport()
    }

    /// Sends a plain-text message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mime`] for an empty body or invalid
    /// addresses, or the transport's error if delivery fails.
    pub fn send(&mut self, subject: &str, body: &str) -> Result<()> {
        let mut message = Message::new(self.from.as_str(), subject, body);
        message.to.clone_from(&self.to);
        self.sender.send(&message)
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
    use std::cell::RefCell;

    use super::*;
    use crate::config::{SmtpSettings, ValidationError};
    use crate::transport::Envelope;
    use crate::Error;

    #[derive(Debug, Default)]
    struct Recording {
        sent: RefCell<Vec<(Envelope, String)>>,
    }

    impl Transport for Recording {
        fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
            self.sent.borrow_mut().push((
                envelope.clone(),
                String::from_utf8_lossy(payload).into_owned(),
            ));
            Ok(())
        }
    }

    fn recipients() -> Vec<String> {
        vec!["x@y.com".to_string(), "z@y.com".to_string()]
    }

    #[test]
    fn test_send_plain_text() {
        let mut quick = QuickSender::new(Recording::default(), "sender@example.com", recipients());
        quick.send("Status", "All systems nominal.").unwrap();

        let sent = quick.transport().sent.borrow();
        let (envelope, text) = &sent[0];
        assert_eq!(envelope.to, recipients());
        assert!(text.contains("To: x@y.com, z@y.com\r\n"));
        assert!(text.contains("Subject: Status\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=UTF-8"));
        assert!(!text.contains("multipart"));
    }

    #[test]
    fn test_send_empty_body_rejected() {
        let mut quick = QuickSender::new(Recording::default(), "sender@example.com", recipients());
        let err = quick.send("Status", "").unwrap_err();
        assert!(matches!(err, Error::Mime(mailpress_mime::Error::EmptyBody)));
        assert!(quick.transport().sent.borrow().is_empty());
    }

    #[test]
    fn test_send_without_recipients_rejected() {
        let mut quick = QuickSender::new(Recording::default(), "sender@example.com", Vec::new());
        let err = quick.send("Status", "body").unwrap_err();
        assert!(matches!(err, Error::Mime(mailpress_mime::Error::EmptyRecipients)));
    }

    #[test]
    fn test_from_config() {
        let config = SenderConfig::new(
            SmtpSettings::new("smtp.example.com", "user", "secret"),
            "sender@example.com",
            recipients(),
        );
        let quick = QuickSender::from_config(Recording::default(), &config).unwrap();
        assert_eq!(quick.from(), "sender@example.com");
        assert_eq!(quick.recipients(), recipients().as_slice());
    }

    #[test]
    fn test_from_invalid_config() {
        let err = QuickSender::from_config(Recording::default(), &SenderConfig::default())
            .unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.contains(&ValidationError::EmptySmtpHost));
                assert!(errors.contains(&ValidationError::NoRecipients));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
