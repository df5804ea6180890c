//! Outgoing message description.

use std::path::{Path, PathBuf};

use crate::content_type::{MailType, effective_content_type};

/// Where an attachment's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Content supplied in memory. May legitimately be empty.
    Bytes(Vec<u8>),
    /// Content read from this path at assembly time.
    File(PathBuf),
}

/// A file offered for download (`Content-Disposition: attachment`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename label shown to the recipient.
    pub name: String,
    /// Declared MIME type; empty means `application/octet-stream`.
    pub content_type: String,
    /// Content source.
    pub source: AttachmentSource,
}

impl Attachment {
    /// Creates an attachment from a name, content type and body.
    ///
    /// An empty `body` means the content is read from the path `name`
    /// when the message is assembled. Use [`Attachment::from_bytes`] for
    /// content that is genuinely empty.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        let name = name.into();
        let source = if body.is_empty() {
            AttachmentSource::File(PathBuf::from(&name))
        } else {
            AttachmentSource::Bytes(body)
        };
        Self {
            name,
            content_type: content_type.into(),
            source,
        }
    }

    /// Creates an attachment with in-memory content.
    pub fn from_bytes(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: String::new(),
            source: AttachmentSource::Bytes(body.into()),
        }
    }

    /// Creates an attachment read from `path`, labelled with the path.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path.to_string_lossy().into_owned(),
            content_type: String::new(),
            source: AttachmentSource::File(path.to_path_buf()),
        }
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Returns the content type to declare for this part.
    #[must_use]
    pub fn effective_content_type(&self) -> &str {
        effective_content_type(&self.content_type)
    }
}

/// A resource embedded in an HTML body and referenced via `cid:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineResource {
    /// Content-ID token, without angle brackets (e.g. `logo`).
    pub content_id: String,
    /// Filename label.
    pub name: String,
    /// Declared MIME type; empty means `application/octet-stream`.
    pub content_type: String,
    /// Resource content.
    pub body: Vec<u8>,
}

impl InlineResource {
    /// Creates an inline resource.
    pub fn new(
        content_id: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            name: name.into(),
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Returns the content type to declare for this part.
    #[must_use]
    pub fn effective_content_type(&self) -> &str {
        effective_content_type(&self.content_type)
    }
}

/// An email to be assembled into MIME bytes.
///
/// The assembler only reads a message; it never modifies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Body kind.
    pub mail_type: MailType,
    /// Sender address.
    pub from: String,
    /// Recipient addresses, in header order.
    pub to: Vec<String>,
    /// Subject line (any Unicode).
    pub subject: String,
    /// Text or HTML body.
    pub body: String,
    /// Downloadable attachments, in order.
    pub attachments: Vec<Attachment>,
    /// Resources referenced from the HTML body, in order.
    pub inline: Vec<InlineResource>,
}

impl Message {
    /// Creates a plain-text message.
    #[must_use]
    pub fn new(from: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Creates an HTML message.
    #[must_use]
    pub fn html(from: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            mail_type: MailType::Html,
            ..Self::new(from, subject, body)
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Adds an inline resource.
    #[must_use]
    pub fn embed(mut self, resource: InlineResource) -> Self {
        self.inline.push(resource);
        self
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

    #[test]
    fn test_attachment_empty_body_reads_name() {
        let attachment = Attachment::new("report.pdf", "", Vec::new());
        assert_eq!(
            attachment.source,
            AttachmentSource::File(PathBuf::from("report.pdf"))
        );
    }

    #[test]
    fn test_attachment_with_body() {
        let attachment = Attachment::new("a.txt", "text/plain", b"hi".to_vec());
        assert_eq!(attachment.source, AttachmentSource::Bytes(b"hi".to_vec()));
        assert_eq!(attachment.effective_content_type(), "text/plain");
    }

    #[test]
    fn test_attachment_from_bytes_keeps_empty_content() {
        let attachment = Attachment::from_bytes("empty.bin", Vec::<u8>::new());
        assert_eq!(attachment.source, AttachmentSource::Bytes(Vec::new()));
        assert_eq!(attachment.effective_content_type(), "application/octet-stream");
    }

    #[test]
    fn test_attachment_from_file() {
        let attachment = Attachment::from_file("docs/notes.txt").with_content_type("text/plain");
        assert_eq!(attachment.name, "docs/notes.txt");
        assert_eq!(
            attachment.source,
            AttachmentSource::File(PathBuf::from("docs/notes.txt"))
        );
        assert_eq!(attachment.content_type, "text/plain");
    }

    #[test]
    fn test_inline_default_content_type() {
        let resource = InlineResource::new("logo", "logo.png", "", vec![1u8, 2, 3]);
        assert_eq!(resource.effective_content_type(), "application/octet-stream");
        assert_eq!(resource.content_type, "");
    }

    #[test]
    fn test_message_builder() {
        let message = Message::html("a@b.com", "Hi", "<b>hi</b>")
            .to("c@d.com")
            .to("e@f.com")
            .attach(Attachment::from_bytes("x.txt", "x"))
            .embed(InlineResource::new("logo", "logo.png", "image/png", vec![0u8]));

        assert_eq!(message.mail_type, MailType::Html);
        assert_eq!(message.to, vec!["c@d.com", "e@f.com"]);
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.inline.len(), 1);
    }
}
