//! Delivery boundary.
//!
//! Assembly produces bytes; a [`Transport`] moves them. Network sessions,
//! pickup directories and test doubles all live behind this trait.

use mailpress_mime::Message;

use crate::error::Result;

/// Envelope addresses for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Reverse-path.
    pub from: String,
    /// Forward-paths, in header order.
    pub to: Vec<String>,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: from.into(),
            to,
        }
    }
}

impl From<&Message> for Envelope {
    fn from(message: &Message) -> Self {
        Self::new(message.from.clone(), message.to.clone())
    }
}

/// Delivers an assembled message.
pub trait Transport {
    /// Sends `payload` to every envelope recipient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] (or any other variant) when
    /// delivery fails.
    fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
        (**self).send(envelope, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
        (**self).send(envelope, payload)
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

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<(Envelope, Vec<u8>)>>,
    }

    impl Transport for Recording {
        fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((envelope.clone(), payload.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_envelope_from_message() {
        let message = Message::new("a@b.com", "s", "body").to("x@y.com").to("z@y.com");
        let envelope = Envelope::from(&message);
        assert_eq!(envelope.from, "a@b.com");
        assert_eq!(envelope.to, vec!["x@y.com", "z@y.com"]);
    }

    #[test]
    fn test_reference_and_box_forward() {
        let recording = Recording::default();
        let envelope = Envelope::new("a@b.com", vec!["c@d.com".to_string()]);

        (&recording).send(&envelope, b"one").unwrap();
        let boxed: Box<dyn Transport + '_> = Box::new(&recording);
        boxed.send(&envelope, b"two").unwrap();

        let sent = recording.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].1, b"two");
    }
}
