//! Content type, transfer encoding and disposition values.

use std::fmt;

/// Content type used when a part declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Charset declared for every text body.
pub const BODY_CHARSET: &str = "UTF-8";

/// Returns the declared content type, or `application/octet-stream` if
/// the declaration is empty.
#[must_use]
pub fn effective_content_type(declared: &str) -> &str {
    if declared.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        declared
    }
}

/// Kind of text body a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailType {
    /// `text/plain`.
    #[default]
    PlainText,
    /// `text/html`.
    Html,
}

impl MailType {
    /// Returns the MIME type of the body.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
        }
    }
}

impl fmt::Display for MailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Transfer encodings emitted by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Base64 encoding, used for attachments and inline resources.
    Base64,
    /// Quoted-Printable encoding, used for the text body.
    QuotedPrintable,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// How a binary part is presented to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Rendered within the body, referenced by Content-ID.
    Inline,
    /// Offered as a download.
    Attachment,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Attachment => write!(f, "attachment"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_content_type() {
        assert_eq!(effective_content_type(""), "application/octet-stream");
        assert_eq!(effective_content_type("image/png"), "image/png");
    }

    #[test]
    fn test_mail_type_display() {
        assert_eq!(MailType::PlainText.to_string(), "text/plain");
        assert_eq!(MailType::Html.to_string(), "text/html");
        assert_eq!(MailType::default(), MailType::PlainText);
    }

    #[test]
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::Base64.to_string(), "base64");
        assert_eq!(
            TransferEncoding::QuotedPrintable.to_string(),
            "quoted-printable"
        );
    }

    #[test]
    fn test_disposition_display() {
        assert_eq!(Disposition::Inline.to_string(), "inline");
        assert_eq!(Disposition::Attachment.to_string(), "attachment");
    }
}
