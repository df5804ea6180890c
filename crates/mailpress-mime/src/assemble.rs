//! Message assembly: turns a [`Message`] into MIME bytes.
//!
//! The part layout depends only on which optional content is present:
//!
//! ```text
//! SinglePart   text body
//! Mixed        multipart/mixed
//!              ├── text body
//!              └── attachment*
//! Related      multipart/mixed
//!              ├── multipart/related
//!              │   ├── text body
//!              │   └── inline resource*
//!              └── attachment*
//! ```

use std::borrow::Cow;
use std::io::Write;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, trace, warn};

use crate::address::is_valid_address;
use crate::boundary::BoundaryGenerator;
use crate::content_type::{BODY_CHARSET, Disposition, TransferEncoding};
use crate::encoding::{QuotedPrintableWriter, write_base64_wrapped};
use crate::error::{AddressRole, Error, Result};
use crate::fs::{FileSource, LocalFiles};
use crate::header::write_headers;
use crate::message::{Attachment, AttachmentSource, InlineResource, Message};

/// Part structure chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// Only the text body, no multipart wrapper.
    SinglePart,
    /// Body and attachments inside `multipart/mixed`.
    Mixed,
    /// Body and inline resources inside `multipart/related`, itself inside
    /// `multipart/mixed` together with any attachments.
    Related,
}

impl Structure {
    /// Selects the structure for `message`.
    #[must_use]
    pub fn of(message: &Message) -> Self {
        if !message.inline.is_empty() {
            Self::Related
        } else if !message.attachments.is_empty() {
            Self::Mixed
        } else {
            Self::SinglePart
        }
    }

    /// Returns true if the message gets a `multipart/mixed` wrapper.
    #[must_use]
    pub const fn is_multipart(self) -> bool {
        !matches!(self, Self::SinglePart)
    }
}

/// Checks the preconditions for assembly.
///
/// Checks run in a fixed order and stop at the first failure: recipients
/// present, body present, sender valid, then each recipient in order.
///
/// # Errors
///
/// Returns [`Error::EmptyRecipients`], [`Error::EmptyBody`] or
/// [`Error::InvalidAddress`] naming the first offending address.
pub fn validate(message: &Message) -> Result<()> {
    if message.to.is_empty() {
        return Err(Error::EmptyRecipients);
    }

    if message.body.is_empty() {
        return Err(Error::EmptyBody);
    }

    if !is_valid_address(&message.from) {
        return Err(Error::invalid_address(AddressRole::From, &message.from));
    }

    if let Some(address) = message.to.iter().find(|a| !is_valid_address(a)) {
        return Err(Error::invalid_address(AddressRole::To, address));
    }

    Ok(())
}

/// Builds MIME messages.
///
/// Owns its two collaborators: the random source for boundaries and the
/// file source for attachments given by path. Each call to
/// [`assemble`](Assembler::assemble) produces an independent buffer.
#[derive(Debug, Clone)]
pub struct Assembler<R = OsRng, F = LocalFiles> {
    boundaries: BoundaryGenerator<R>,
    files: F,
}

impl Assembler<OsRng, LocalFiles> {
    /// Creates an assembler using the OS random source and local files.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            boundaries: BoundaryGenerator::new(),
            files: LocalFiles::new(),
        }
    }
}

impl Default for Assembler<OsRng, LocalFiles> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, F> Assembler<R, F>
where
    R: RngCore + CryptoRng,
    F: FileSource,
{
    /// Creates an assembler from explicit collaborators.
    pub fn with_parts(boundaries: BoundaryGenerator<R>, files: F) -> Self {
        Self { boundaries, files }
    }

    /// Replaces the random source used for boundaries.
    pub fn with_rng<S: RngCore + CryptoRng>(self, rng: S) -> Assembler<S, F> {
        Assembler {
            boundaries: BoundaryGenerator::with_rng(rng),
            files: self.files,
        }
    }

    /// Replaces the file source used for attachments given by path.
    pub fn with_files<G: FileSource>(self, files: G) -> Assembler<R, G> {
        Assembler {
            boundaries: self.boundaries,
            files,
        }
    }

    /// Assembles `message` into a complete MIME byte stream.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered: a failed precondition (see
    /// [`validate`]), a random source failure, an attachment read failure
    /// or an encoder write failure. No partial output is returned.
    pub fn assemble(&mut self, message: &Message) -> Result<Vec<u8>> {
        validate(message)?;

        let structure = Structure::of(message);
        debug!(
            from = %message.from,
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            inline = message.inline.len(),
            ?structure,
            "Assembling message"
        );

        let mut out: Vec<u8> = Vec::with_capacity(message.body.len() + 512);
        write_headers(&mut out, &message.from, &message.to, &message.subject)?;

        match structure {
            Structure::SinglePart => write_body(&mut out, message)?,
            Structure::Mixed => {
                let mixed = self.boundaries.next_boundary()?;
                open_multipart(&mut out, "mixed", &mixed)?;
                write_body(&mut out, message)?;
                self.write_attachments(&mut out, &mixed, &message.attachments)?;
                close_multipart(&mut out, &mixed)?;
            }
            Structure::Related => {
                let mixed = self.boundaries.next_boundary()?;
                let related = self.distinct_boundary(&mixed)?;
                open_multipart(&mut out, "mixed", &mixed)?;
                open_multipart(&mut out, "related", &related)?;
                write_body(&mut out, message)?;
                for resource in &message.inline {
                    write_inline(&mut out, &related, resource)?;
                }
                close_multipart(&mut out, &related)?;
                self.write_attachments(&mut out, &mixed, &message.attachments)?;
                close_multipart(&mut out, &mixed)?;
            }
        }

        debug!(bytes = out.len(), "Message assembled");
        Ok(out)
    }

    fn distinct_boundary(&mut self, other: &str) -> Result<String> {
        let boundary = self.boundaries.next_boundary()?;
        if boundary != other {
            return Ok(boundary);
        }

        let boundary = self.boundaries.next_boundary()?;
        if boundary == other {
            return Err(Error::Randomness(rand::Error::new(
                "random source repeated a boundary",
            )));
        }
        Ok(boundary)
    }

    fn write_attachments(
        &self,
        out: &mut Vec<u8>,
        boundary: &str,
        attachments: &[Attachment],
    ) -> Result<()> {
        for attachment in attachments {
            let content = self.attachment_content(attachment)?;
            write_delimiter(out, boundary)?;
            write_binary_headers(
                out,
                attachment.effective_content_type(),
                &attachment.name,
                None,
                Disposition::Attachment,
            )?;
            write_base64_wrapped(out, &content)?;
            trace!(name = %attachment.name, bytes = content.len(), "Wrote attachment part");
        }
        Ok(())
    }

    fn attachment_content<'a>(&self, attachment: &'a Attachment) -> Result<Cow<'a, [u8]>> {
        match &attachment.source {
            AttachmentSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            AttachmentSource::File(path) => {
                debug!(path = %path.display(), "Reading attachment from file");
                self.files.read(path).map(Cow::Owned).map_err(|source| {
                    warn!(path = %path.display(), error = %source, "Attachment read failed");
                    Error::AttachmentRead {
                        path: path.clone(),
                        source,
                    }
                })
            }
        }
    }
}

impl Message {
    /// Assembles this message with the OS random source and local files.
    ///
    /// # Errors
    ///
    /// See [`Assembler::assemble`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Assembler::new().assemble(self)
    }
}

fn open_multipart(out: &mut Vec<u8>, subtype: &str, boundary: &str) -> Result<()> {
    write!(
        out,
        "Content-Type: multipart/{subtype}; boundary={boundary}\r\n\r\n--{boundary}\r\n"
    )?;
    Ok(())
}

fn write_delimiter(out: &mut Vec<u8>, boundary: &str) -> Result<()> {
    write!(out, "\r\n--{boundary}\r\n")?;
    Ok(())
}

fn close_multipart(out: &mut Vec<u8>, boundary: &str) -> Result<()> {
    write!(out, "\r\n--{boundary}--\r\n")?;
    Ok(())
}

fn write_body(out: &mut Vec<u8>, message: &Message) -> Result<()> {
    write!(
        out,
        "Content-Type: {}; charset={BODY_CHARSET}\r\nContent-Transfer-Encoding: {}\r\n\r\n",
        message.mail_type,
        TransferEncoding::QuotedPrintable
    )?;

    let mut encoder = QuotedPrintableWriter::new(&mut *out);
    encoder.write_all(message.body.as_bytes())?;
    encoder.finish()?;
    trace!(mail_type = %message.mail_type, "Wrote body part");
    Ok(())
}

fn write_inline(out: &mut Vec<u8>, boundary: &str, resource: &InlineResource) -> Result<()> {
    write_delimiter(out, boundary)?;
    write_binary_headers(
        out,
        resource.effective_content_type(),
        &resource.name,
        Some(resource.content_id.as_str()),
        Disposition::Inline,
    )?;
    write_base64_wrapped(out, &resource.body)?;
    trace!(content_id = %resource.content_id, bytes = resource.body.len(), "Wrote inline part");
    Ok(())
}

fn write_binary_headers(
    out: &mut Vec<u8>,
    content_type: &str,
    name: &str,
    content_id: Option<&str>,
    disposition: Disposition,
) -> Result<()> {
    write!(out, "Content-Type: {content_type}; name=\"{name}\"\r\n")?;
    write!(out, "Content-Transfer-Encoding: {}\r\n", TransferEncoding::Base64)?;
    if let Some(id) = content_id {
        write!(out, "Content-ID: <{id}>\r\n")?;
    }
    write!(out, "Content-Disposition: {disposition}; filename=\"{name}\"\r\n\r\n")?;
    Ok(())
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
    use std::io;
    use std::path::{Path, PathBuf};

    /// Deterministic source: byte values count up from zero.
    struct SequenceRng(u8);

    impl RngCore for SequenceRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest {
                *b = self.0;
                self.0 = self.0.wrapping_add(1);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for SequenceRng {}

    /// Source that always yields zeros.
    struct StuckRng;

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for StuckRng {}

    const OUTER: &str = "boundary-000102030405060708090a0b0c0d0e0f";
    const RELATED: &str = "boundary-101112131415161718191a1b1c1d1e1f";

    fn no_files(path: &Path) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("unexpected read of {}", path.display()),
        ))
    }

    fn assembler() -> Assembler<SequenceRng, fn(&Path) -> io::Result<Vec<u8>>> {
        Assembler::new()
            .with_rng(SequenceRng(0))
            .with_files(no_files as fn(&Path) -> io::Result<Vec<u8>>)
    }

    fn simple() -> Message {
        Message::new("a@b.com", "Hi", "hello").to("c@d.com")
    }

    #[test]
    fn test_structure_selection() {
        assert_eq!(Structure::of(&simple()), Structure::SinglePart);

        let mixed = simple().attach(Attachment::from_bytes("a.txt", "x"));
        assert_eq!(Structure::of(&mixed), Structure::Mixed);

        let related = simple().embed(InlineResource::new("logo", "l.png", "", vec![1u8]));
        assert_eq!(Structure::of(&related), Structure::Related);

        let both = related.attach(Attachment::from_bytes("a.txt", "x"));
        assert_eq!(Structure::of(&both), Structure::Related);
        assert!(Structure::Related.is_multipart());
        assert!(!Structure::SinglePart.is_multipart());
    }

    #[test]
    fn test_validation_order() {
        let mut message = Message::new("bad", "s", "");
        assert!(matches!(validate(&message), Err(Error::EmptyRecipients)));

        message.to.push("also-bad".into());
        assert!(matches!(validate(&message), Err(Error::EmptyBody)));

        message.body = "body".into();
        match validate(&message) {
            Err(Error::InvalidAddress { role, address }) => {
                assert_eq!(role, AddressRole::From);
                assert_eq!(address, "bad");
            }
            other => panic!("unexpected: {other:?}"),
        }

        message.from = "ok@example.com".into();
        match validate(&message) {
            Err(Error::InvalidAddress { role, address }) => {
                assert_eq!(role, AddressRole::To);
                assert_eq!(address, "also-bad");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_first_invalid_recipient_reported() {
        let message = simple().to("x@").to("y@");
        let err = validate(&message).unwrap_err();
        assert_eq!(err.to_string(), "invalid To email address: x@");
    }

    #[test]
    fn test_single_part_exact_output() {
        let bytes = assembler().assemble(&simple()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            concat!(
                "From: a@b.com\r\n",
                "To: c@d.com\r\n",
                "Subject: Hi\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: text/plain; charset=UTF-8\r\n",
                "Content-Transfer-Encoding: quoted-printable\r\n",
                "\r\n",
                "hello",
            )
        );
    }

    #[test]
    fn test_related_with_attachment_exact_output() {
        let message = Message::html("a@b.com", "Hi", "<b>hello</b>")
            .to("c@d.com")
            .embed(InlineResource::new("logo", "logo.png", "image/png", b"PNG".to_vec()))
            .attach(Attachment::from_bytes("a.txt", "hi"));

        let bytes = assembler().assemble(&message).unwrap();
        let expected = format!(
            concat!(
                "From: a@b.com\r\n",
                "To: c@d.com\r\n",
                "Subject: Hi\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: multipart/mixed; boundary={o}\r\n",
                "\r\n",
                "--{o}\r\n",
                "Content-Type: multipart/related; boundary={r}\r\n",
                "\r\n",
                "--{r}\r\n",
                "Content-Type: text/html; charset=UTF-8\r\n",
                "Content-Transfer-Encoding: quoted-printable\r\n",
                "\r\n",
                "<b>hello</b>",
                "\r\n--{r}\r\n",
                "Content-Type: image/png; name=\"logo.png\"\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-ID: <logo>\r\n",
                "Content-Disposition: inline; filename=\"logo.png\"\r\n",
                "\r\n",
                "UE5H\r\n",
                "\r\n--{r}--\r\n",
                "\r\n--{o}\r\n",
                "Content-Type: application/octet-stream; name=\"a.txt\"\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-Disposition: attachment; filename=\"a.txt\"\r\n",
                "\r\n",
                "aGk=\r\n",
                "\r\n--{o}--\r\n",
            ),
            o = OUTER,
            r = RELATED,
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_mixed_has_no_related_container() {
        let message = simple().attach(Attachment::new("a.txt", "text/plain", b"x".to_vec()));
        let text = String::from_utf8(assembler().assemble(&message).unwrap()).unwrap();

        assert!(text.contains(&format!("Content-Type: multipart/mixed; boundary={OUTER}\r\n")));
        assert!(!text.contains("multipart/related"));
        assert!(!text.contains(RELATED));
        assert!(text.contains("Content-Type: text/plain; name=\"a.txt\"\r\n"));
        assert!(text.ends_with(&format!("\r\n--{OUTER}--\r\n")));
    }

    #[test]
    fn test_inline_only_still_wrapped_in_mixed() {
        let message = simple().embed(InlineResource::new("logo", "logo.png", "", b"x".to_vec()));
        let text = String::from_utf8(assembler().assemble(&message).unwrap()).unwrap();

        assert!(text.contains(&format!("multipart/mixed; boundary={OUTER}")));
        assert!(text.contains(&format!("multipart/related; boundary={RELATED}")));
        assert!(text.contains("Content-Type: application/octet-stream; name=\"logo.png\""));
        assert!(text.ends_with(&format!("\r\n--{RELATED}--\r\n\r\n--{OUTER}--\r\n")));
    }

    #[test]
    fn test_file_fallback_uses_file_source() {
        let message = simple().attach(Attachment::new("report.txt", "", Vec::new()));
        let files = |path: &Path| -> io::Result<Vec<u8>> {
            assert_eq!(path, Path::new("report.txt"));
            Ok(b"from disk".to_vec())
        };

        let bytes = assembler().with_files(files).assemble(&message).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("ZnJvbSBkaXNr\r\n"));
    }

    #[test]
    fn test_file_read_failure_aborts() {
        let message = simple().attach(Attachment::from_file("missing.bin"));
        let err = assembler().assemble(&message).unwrap_err();
        match err {
            Error::AttachmentRead { path, source } => {
                assert_eq!(path, PathBuf::from("missing.bin"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_bytes_attachment_not_read_from_disk() {
        let message = simple().attach(Attachment::from_bytes("empty.bin", Vec::<u8>::new()));
        let text = String::from_utf8(assembler().assemble(&message).unwrap()).unwrap();
        assert!(text.contains(
            "Content-Disposition: attachment; filename=\"empty.bin\"\r\n\r\n\r\n--"
        ));
    }

    #[test]
    fn test_repeating_random_source_rejected() {
        let message = simple().embed(InlineResource::new("logo", "l.png", "", vec![1u8]));
        let err = assembler().with_rng(StuckRng).assemble(&message).unwrap_err();
        assert!(matches!(err, Error::Randomness(_)));
    }

    #[test]
    fn test_single_part_needs_no_randomness() {
        let bytes = assembler().with_rng(StuckRng).assemble(&simple()).unwrap();
        assert!(!String::from_utf8(bytes).unwrap().contains("boundary"));
    }

    #[test]
    fn test_message_is_not_modified() {
        let message = simple()
            .attach(Attachment::new("a.bin", "", vec![9u8; 100]))
            .embed(InlineResource::new("c", "c.gif", "", vec![7u8; 10]));
        let before = message.clone();
        let _ = assembler().assemble(&message).unwrap();
        assert_eq!(message, before);
    }

    #[test]
    fn test_to_bytes_default_collaborators() {
        let bytes = simple().to_bytes().unwrap();
        assert!(bytes.starts_with(b"From: a@b.com\r\n"));
    }
}
