//! End-to-end tests for message assembly.
//!
//! Outputs are split back into parts with the boundaries they declare and
//! decoded with the crate's own decoders.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::io;
use std::path::Path;

use proptest::prelude::*;

use mailpress_mime::encoding::{
    MAX_LINE_LENGTH, decode_base64_wrapped, decode_quoted_printable, decode_rfc2047,
    encode_base64,
};
use mailpress_mime::{
    AddressRole, Assembler, Attachment, Error, InlineResource, LocalFiles, Message,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailpress_mime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn assemble(message: &Message) -> String {
    String::from_utf8(message.to_bytes().unwrap()).unwrap()
}

fn sample() -> Message {
    Message::new("sender@example.com", "Test Subject", "This is a plain text body.")
        .to("recipient@example.com")
}

/// Boundary tokens declared in `Content-Type` headers, outermost first.
fn declared_boundaries(text: &str) -> Vec<String> {
    text.match_indices("; boundary=")
        .map(|(i, m)| {
            let rest = &text[i + m.len()..];
            rest[..rest.find("\r\n").unwrap()].to_string()
        })
        .collect()
}

/// Content of the part whose headers end at `marker`, up to the next
/// delimiter of `boundary` (or the end of the message).
fn part_content<'a>(text: &'a str, marker: &str, boundary: Option<&str>) -> &'a str {
    let start = text.find(marker).expect("part header present");
    let after_headers = &text[start..];
    let body_start = after_headers.find("\r\n\r\n").unwrap() + 4;
    let content = &after_headers[body_start..];
    match boundary {
        Some(b) => &content[..content.find(&format!("\r\n--{b}")).unwrap()],
        None => content,
    }
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn plain_text_has_no_multipart() {
    let text = assemble(
        &Message::new("a@b.com", "Hi", "hello").to("c@d.com"),
    );
    assert!(text.contains("Content-Type: text/plain; charset=UTF-8"));
    assert!(!text.contains("multipart"));
    assert!(!text.contains("boundary"));
}

#[test]
fn html_body_content_type() {
    let text = assemble(&Message::html("a@b.com", "Hi", "<b>hi</b>").to("c@d.com"));
    assert!(text.contains("Content-Type: text/html; charset=UTF-8"));
    assert!(text.contains("<b>hi</b>"));
}

#[test]
fn single_part_body_is_top_level() {
    let text = assemble(&sample());
    let headers_end = text.find("\r\n\r\n").unwrap();
    let headers = &text[..headers_end];
    assert!(headers.ends_with("Content-Transfer-Encoding: quoted-printable"));
    assert!(headers.contains("\r\nContent-Type: text/plain; charset=UTF-8\r\n"));
}

#[test]
fn header_lines_in_order() {
    let text = assemble(&sample().to("second@example.com"));
    assert!(text.starts_with(concat!(
        "From: sender@example.com\r\n",
        "To: recipient@example.com, second@example.com\r\n",
        "Subject: Test Subject\r\n",
        "MIME-Version: 1.0\r\n",
    )));
}

#[test]
fn recipients_joined_with_comma_space() {
    let text = assemble(&Message::new("a@b.com", "s", "b").to("x@y.com").to("z@y.com"));
    assert!(text.contains("\r\nTo: x@y.com, z@y.com\r\n"));
}

#[test]
fn non_ascii_subject_is_q_encoded() {
    let text = assemble(&Message::new("a@b.com", "Привет, мир", "body").to("c@d.com"));
    let line = text
        .lines()
        .find(|l| l.starts_with("Subject: "))
        .unwrap()
        .trim_start_matches("Subject: ");
    assert!(line.starts_with("=?utf-8?q?"));
    assert!(line.is_ascii());
    assert_eq!(decode_rfc2047(line).unwrap(), "Привет, мир");
}

#[test]
fn attachment_scenario() {
    let content = b"This is the content of the file.";
    let message = Message::new("sender@example.com", "Test Attachment", "Please see the attached file.")
        .to("recipient@example.com")
        .attach(Attachment::new("testfile.txt", "", content.to_vec()));

    let text = assemble(&message);
    assert!(text.contains("Content-Disposition: attachment; filename=\"testfile.txt\""));
    assert!(text.contains("Content-Type: application/octet-stream; name=\"testfile.txt\""));
    assert!(text.contains(&encode_base64(content)));
    assert!(!text.contains("multipart/related"));
}

#[test]
fn inline_scenario() {
    init_tracing();
    let message = Message::html("a@b.com", "Logo", "<img src=\"cid:logo\">")
        .to("c@d.com")
        .embed(InlineResource::new("logo", "logo.png", "image/png", vec![0x89u8, b'P', b'N', b'G']));

    let text = assemble(&message);
    let boundaries = declared_boundaries(&text);
    assert_eq!(boundaries.len(), 2);
    let related = &boundaries[1];

    let related_start = text.find("multipart/related").unwrap();
    let content_id = text.find("Content-ID: <logo>").unwrap();
    let related_end = text.find(&format!("--{related}--")).unwrap();
    assert!(related_start < content_id && content_id < related_end);
    assert!(text.contains("Content-Disposition: inline; filename=\"logo.png\""));
}

#[test]
fn empty_recipients_rejected() {
    let message = Message::new("sender@example.com", "Test Empty To", "This email has no recipients.");
    let err = message.to_bytes().unwrap_err();
    assert!(matches!(err, Error::EmptyRecipients));
    assert_eq!(err.to_string(), "recipient list is empty");
}

#[test]
fn empty_body_rejected() {
    let message = Message::new("sender@example.com", "Test Empty Body", "").to("recipient@example.com");
    let err = message.to_bytes().unwrap_err();
    assert!(matches!(err, Error::EmptyBody));
    assert_eq!(err.to_string(), "email body is empty");
}

#[test]
fn invalid_addresses_named() {
    let err = Message::new("not an address", "s", "b")
        .to("c@d.com")
        .to_bytes()
        .unwrap_err();
    assert!(matches!(
        &err,
        Error::InvalidAddress { role: AddressRole::From, address } if address == "not an address"
    ));

    let err = sample().to("broken@").to_bytes().unwrap_err();
    assert!(err.to_string().contains("broken@"));
    assert!(matches!(err, Error::InvalidAddress { role: AddressRole::To, .. }));
}

#[test]
fn two_distinct_boundaries_with_matching_delimiter_counts() {
    let message = Message::html("a@b.com", "s", "<p>hi</p>")
        .to("c@d.com")
        .embed(InlineResource::new("one", "1.png", "image/png", vec![1u8; 10]))
        .embed(InlineResource::new("two", "2.png", "", vec![2u8; 10]))
        .attach(Attachment::from_bytes("a.bin", vec![3u8; 10]))
        .attach(Attachment::from_bytes("b.bin", vec![4u8; 10]))
        .attach(Attachment::from_bytes("c.bin", vec![5u8; 10]));

    let text = assemble(&message);
    let boundaries = declared_boundaries(&text);
    assert_eq!(boundaries.len(), 2);
    let (mixed, related) = (&boundaries[0], &boundaries[1]);
    assert_ne!(mixed, related);

    // related container + three attachments
    assert_eq!(count(&text, &format!("--{mixed}\r\n")), 4);
    assert_eq!(count(&text, &format!("--{mixed}--\r\n")), 1);
    // body + two inline resources
    assert_eq!(count(&text, &format!("--{related}\r\n")), 3);
    assert_eq!(count(&text, &format!("--{related}--\r\n")), 1);
    assert!(text.ends_with(&format!("\r\n--{mixed}--\r\n")));
}

#[test]
fn parts_keep_caller_order() {
    let message = sample()
        .attach(Attachment::from_bytes("first.txt", "1"))
        .attach(Attachment::from_bytes("second.txt", "2"))
        .attach(Attachment::from_bytes("third.txt", "3"));

    let text = assemble(&message);
    let first = text.find("filename=\"first.txt\"").unwrap();
    let second = text.find("filename=\"second.txt\"").unwrap();
    let third = text.find("filename=\"third.txt\"").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn body_round_trips_through_quoted_printable() {
    let body = "Grüße aus Köln = schön!\r\nA long line: ".to_string() + &"ü-x ".repeat(60) + "\r\nend \t";
    let message = Message::new("a@b.com", "s", body.clone())
        .to("c@d.com")
        .attach(Attachment::from_bytes("x.txt", "x"));

    let text = assemble(&message);
    let mixed = &declared_boundaries(&text)[0];
    let encoded = part_content(&text, "quoted-printable", Some(mixed));

    assert!(encoded.split("\r\n").all(|l| l.len() <= MAX_LINE_LENGTH));
    assert_eq!(decode_quoted_printable(encoded).unwrap(), body);
}

#[test]
fn binary_parts_round_trip_through_base64() {
    let attachment: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
    let image: Vec<u8> = (0..777u32).map(|i| (i * 31 % 251) as u8).collect();
    let message = Message::html("a@b.com", "s", "<img src=\"cid:img\">")
        .to("c@d.com")
        .embed(InlineResource::new("img", "img.bin", "", image.clone()))
        .attach(Attachment::from_bytes("data.bin", attachment.clone()));

    let text = assemble(&message);
    let boundaries = declared_boundaries(&text);

    let inline = part_content(&text, "Content-ID: <img>", Some(&boundaries[1]));
    assert!(inline.split("\r\n").all(|l| l.len() <= MAX_LINE_LENGTH));
    assert_eq!(decode_base64_wrapped(inline).unwrap(), image);

    let data = part_content(&text, "filename=\"data.bin\"", Some(&boundaries[0]));
    assert!(data.ends_with("\r\n"));
    assert!(data.split("\r\n").all(|l| l.len() <= MAX_LINE_LENGTH));
    assert_eq!(decode_base64_wrapped(data).unwrap(), attachment);
}

#[test]
fn attachment_falls_back_to_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("testfile.txt"), "This is the content of the file.").unwrap();

    let message = sample().attach(Attachment::new("testfile.txt", "text/plain", Vec::new()));
    let mut assembler = Assembler::new().with_files(LocalFiles::with_root(dir.path()));
    let text = String::from_utf8(assembler.assemble(&message).unwrap()).unwrap();

    assert!(text.contains("Content-Type: text/plain; name=\"testfile.txt\""));
    assert!(text.contains(&encode_base64(b"This is the content of the file.")));
}

#[test]
fn attachment_from_absolute_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    std::fs::write(&path, [0u8, 1, 2, 3]).unwrap();

    let text = assemble(&sample().attach(Attachment::from_file(&path)));
    assert!(text.contains(&encode_base64(&[0u8, 1, 2, 3])));
}

#[test]
fn missing_attachment_file_is_an_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let message = sample().attach(Attachment::new("nope.txt", "", Vec::new()));
    let mut assembler = Assembler::new().with_files(LocalFiles::with_root(dir.path()));

    match assembler.assemble(&message).unwrap_err() {
        Error::AttachmentRead { path, source } => {
            assert_eq!(path, Path::new("nope.txt"));
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn repeated_assembly_uses_fresh_boundaries() {
    let message = sample().attach(Attachment::from_bytes("a.txt", "a"));
    let first = declared_boundaries(&assemble(&message));
    let second = declared_boundaries(&assemble(&message));
    assert_ne!(first, second);
}

#[test]
fn concurrent_assembly_is_independent() {
    let message = sample().attach(Attachment::from_bytes("a.txt", "payload"));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let message = message.clone();
            std::thread::spawn(move || assemble(&message))
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let mut boundaries: Vec<String> = outputs
        .iter()
        .map(|t| declared_boundaries(t)[0].clone())
        .collect();
    boundaries.sort();
    boundaries.dedup();
    assert_eq!(boundaries.len(), outputs.len());
    assert!(outputs.iter().all(|t| t.contains(&encode_base64(b"payload"))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_assembled_parts_round_trip(
        lines in prop::collection::vec("[^\r\n]{1,150}", 1..5),
        inline in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..3),
        attachments in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..3),
    ) {
        let body = lines.join("\r\n");
        let mut message = Message::html("a@b.com", "s", body.clone()).to("c@d.com");
        for (i, data) in inline.iter().enumerate() {
            message = message.embed(InlineResource::new(format!("cid{i}"), format!("i{i}.bin"), "", data.clone()));
        }
        for (i, data) in attachments.iter().enumerate() {
            message = message.attach(Attachment::from_bytes(format!("a{i}.bin"), data.clone()));
        }

        let text = assemble(&message);
        let boundaries = declared_boundaries(&text);
        let expected_boundaries = match (inline.is_empty(), attachments.is_empty()) {
            (true, true) => 0,
            (true, false) => 1,
            _ => 2,
        };
        prop_assert_eq!(boundaries.len(), expected_boundaries);

        let body_boundary = boundaries.last().map(String::as_str);
        let encoded = part_content(&text, "quoted-printable", body_boundary);
        prop_assert!(encoded.split("\r\n").all(|l| l.len() <= MAX_LINE_LENGTH));
        prop_assert_eq!(decode_quoted_printable(encoded).unwrap(), body);

        for (i, data) in inline.iter().enumerate() {
            let part = part_content(&text, &format!("Content-ID: <cid{i}>"), Some(&boundaries[1]));
            prop_assert_eq!(&decode_base64_wrapped(part).unwrap(), data);
        }
        for (i, data) in attachments.iter().enumerate() {
            let part = part_content(&text, &format!("filename=\"a{i}.bin\""), Some(&boundaries[0]));
            prop_assert_eq!(&decode_base64_wrapped(part).unwrap(), data);
        }
    }
}
