//! Assemble-then-deliver sending.

use mailpress_mime::{Assembler, FileSource, LocalFiles, Message};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::Result;
use crate::transport::{Envelope, Transport};

/// Sends messages through a transport.
///
/// Assembly failures abort before the transport is called.
#[derive(Debug)]
pub struct MailSender<T, R = OsRng, F = LocalFiles> {
    transport: T,
    assembler: Assembler<R, F>,
}

impl<T: Transport> MailSender<T> {
    /// Creates a sender with the default assembler.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            assembler: Assembler::new(),
        }
    }
}

impl<T, R, F> MailSender<T, R, F>
where
    T: Transport,
    R: RngCore + CryptoRng,
    F: FileSource,
{
    /// Creates a sender with a configured assembler.
    pub const fn with_assembler(transport: T, assembler: Assembler<R, F>) -> Self {
        Self {
            transport,
            assembler,
        }
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Assembles `message` and hands it to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mime`] if assembly fails, or the transport's
    /// error if delivery fails.
    pub fn send(&mut self, message: &Message) -> Result<()> {
        let payload = self.assembler.assemble(message)?;
        let envelope = Envelope::from(message);

        tracing::info!(
            from = %envelope.from,
            recipients = envelope.to.len(),
            bytes = payload.len(),
            "handing message to transport"
        );
        self.transport.send(&envelope, &payload).inspect_err(|e| {
            tracing::warn!(from = %envelope.from, error = %e, "transport failed");
        })
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

    use mailpress_mime::Attachment;

    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<(Envelope, Vec<u8>)>>,
        fail: bool,
    }

    impl Transport for Recording {
        fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
            if self.fail {
                return Err(Error::Transport("connection refused".to_string()));
            }
            self.sent
                .borrow_mut()
                .push((envelope.clone(), payload.to_vec()));
            Ok(())
        }
    }

    fn message() -> Message {
        Message::new("sender@example.com", "Hello", "Body text").to("recipient@example.com")
    }

    #[test]
    fn test_send_delivers_assembled_payload() {
        let mut sender = MailSender::new(Recording::default());
        sender.send(&message()).unwrap();

        let sent = sender.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        let (envelope, payload) = &sent[0];
        assert_eq!(envelope.from, "sender@example.com");
        assert_eq!(envelope.to, vec!["recipient@example.com"]);

        let text = String::from_utf8(payload.clone()).unwrap();
        assert!(text.starts_with("From: sender@example.com\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=UTF-8"));
        assert!(text.ends_with("Body text"));
    }

    #[test]
    fn test_assembly_error_skips_transport() {
        let mut sender = MailSender::new(Recording::default());
        let err = sender
            .send(&Message::new("sender@example.com", "s", "body"))
            .unwrap_err();

        assert!(matches!(err, Error::Mime(mailpress_mime::Error::EmptyRecipients)));
        assert!(sender.transport().sent.borrow().is_empty());
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut sender = MailSender::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let err = sender.send(&message()).unwrap_err();
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_custom_assembler_file_source() {
        let files = |_: &std::path::Path| -> std::io::Result<Vec<u8>> { Ok(b"from disk".to_vec()) };
        let assembler = Assembler::new().with_files(files);
        let mut sender = MailSender::with_assembler(Recording::default(), assembler);

        sender
            .send(&message().attach(Attachment::from_file("report.txt")))
            .unwrap();

        let sent = sender.transport().sent.borrow();
        let text = String::from_utf8(sent[0].1.clone()).unwrap();
        assert!(text.contains("ZnJvbSBkaXNr"));
    }
}
