//! Top-level message headers.

use std::io::{self, Write};

use crate::encoding::encode_rfc2047;

/// Charset declared in encoded subject words.
const SUBJECT_CHARSET: &str = "utf-8";

/// Separator between recipients in the `To` header.
const RECIPIENT_SEPARATOR: &str = ", ";

/// Joins recipient addresses for the `To` header, preserving order.
#[must_use]
pub fn join_recipients<S: AsRef<str>>(to: &[S]) -> String {
    to.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(RECIPIENT_SEPARATOR)
}

/// Renders a subject for the `Subject` header.
///
/// ASCII subjects pass through; anything else becomes RFC 2047 Q words.
#[must_use]
pub fn encode_subject(subject: &str) -> String {
    encode_rfc2047(subject, SUBJECT_CHARSET)
}

/// Writes `From`, `To`, `Subject` and `MIME-Version`, in that order,
/// each terminated by CRLF.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_headers<W, S>(out: &mut W, from: &str, to: &[S], subject: &str) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    write!(out, "From: {from}\r\n")?;
    write!(out, "To: {}\r\n", join_recipients(to))?;
    write!(out, "Subject: {}\r\n", encode_subject(subject))?;
    out.write_all(b"MIME-Version: 1.0\r\n")
}

/// Renders the header block as a string.
#[must_use]
pub fn format_headers<S: AsRef<str>>(from: &str, to: &[S], subject: &str) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_headers(&mut out, from, to, subject);
    String::from_utf8_lossy(&out).into_owned()
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
    fn test_header_order_and_terminators() {
        let headers = format_headers("a@b.com", &["c@d.com"], "Hi");
        assert_eq!(
            headers,
            "From: a@b.com\r\nTo: c@d.com\r\nSubject: Hi\r\nMIME-Version: 1.0\r\n"
        );
    }

    #[test]
    fn test_recipients_joined_in_order() {
        assert_eq!(join_recipients(&["x@y.com", "z@y.com"]), "x@y.com, z@y.com");
        assert_eq!(
            join_recipients(&["3@x.org".to_string(), "1@x.org".to_string(), "2@x.org".to_string()]),
            "3@x.org, 1@x.org, 2@x.org"
        );
    }

    #[test]
    fn test_ascii_subject_unencoded() {
        assert_eq!(encode_subject("Quarterly report = done?"), "Quarterly report = done?");
    }

    #[test]
    fn test_non_ascii_subject_q_encoded() {
        let headers = format_headers("a@b.com", &["c@d.com"], "Grüße");
        assert!(headers.contains("Subject: =?utf-8?q?Gr=C3=BC=C3=9Fe?=\r\n"));
    }

    #[test]
    fn test_empty_subject() {
        let headers = format_headers("a@b.com", &["c@d.com"], "");
        assert!(headers.contains("Subject: \r\n"));
    }
}
