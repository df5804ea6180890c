//! MIME encoding and decoding utilities.
//!
//! Supports Base64 (with 76-column wrapping), Quoted-Printable, and
//! RFC 2047 header encoding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Maximum encoded line length, excluding the CRLF terminator.
pub const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of a single RFC 2047 encoded word.
const MAX_ENCODED_WORD_LENGTH: usize = 75;

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Writes `data` as Base64 hard-wrapped at 76 characters.
///
/// Every line, including a short final one, ends with CRLF. Empty input
/// writes nothing.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_base64_wrapped<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let encoded = STANDARD.encode(data);
    for line in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        out.write_all(line)?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

/// Encodes data as Base64 wrapped at 76 characters with CRLF line ends.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);
    for line in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        result.push_str(&String::from_utf8_lossy(line));
        result.push_str("\r\n");
    }
    result
}

/// Decodes wrapped Base64, ignoring line breaks and other whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64_wrapped(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    decode_base64(&cleaned)
}

/// Streaming Quoted-Printable encoder (RFC 2045).
///
/// Lines are buffered and written to the inner writer once complete.
/// Input line breaks (`\r\n`, `\n` or `\r`) become CRLF, whitespace
/// before a line break is escaped, and long lines are soft-wrapped so
/// that no output line exceeds 76 characters. Call [`finish`] to flush
/// the last line.
///
/// [`finish`]: QuotedPrintableWriter::finish
#[derive(Debug)]
pub struct QuotedPrintableWriter<W: Write> {
    inner: W,
    line: Vec<u8>,
    after_cr: bool,
}

impl<W: Write> QuotedPrintableWriter<W> {
    /// Creates an encoder writing to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: Vec::with_capacity(MAX_LINE_LENGTH + 2),
            after_cr: false,
        }
    }

    /// Flushes the pending line and returns the inner writer.
    ///
    /// No line terminator is appended after the last line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.escape_trailing_whitespace()?;
        self.inner.write_all(&self.line)?;
        self.line.clear();
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode_byte(&mut self, byte: u8) -> io::Result<()> {
        match byte {
            b'\r' | b'\n' => {
                if self.after_cr && byte == b'\n' {
                    self.after_cr = false;
                    return Ok(());
                }
                self.after_cr = byte == b'\r';
                self.escape_trailing_whitespace()?;
                self.hard_break()
            }
            b'!'..=b'<' | b'>'..=b'~' | b' ' | b'\t' => {
                self.after_cr = false;
                self.push_literal(byte)
            }
            _ => {
                self.after_cr = false;
                self.push_escaped(byte)
            }
        }
    }

    fn push_literal(&mut self, byte: u8) -> io::Result<()> {
        if self.line.len() >= MAX_LINE_LENGTH - 1 {
            self.soft_break()?;
        }
        self.line.push(byte);
        Ok(())
    }

    fn push_escaped(&mut self, byte: u8) -> io::Result<()> {
        // An escape never straddles a soft break.
        if self.line.len() + 3 > MAX_LINE_LENGTH - 1 {
            self.soft_break()?;
        }
        self.line.extend_from_slice(&[
            b'=',
            UPPER_HEX[usize::from(byte >> 4)],
            UPPER_HEX[usize::from(byte & 0x0f)],
        ]);
        Ok(())
    }

    fn escape_trailing_whitespace(&mut self) -> io::Result<()> {
        if let Some(&last) = self.line.last()
            && (last == b' ' || last == b'\t')
        {
            self.line.pop();
            self.push_escaped(last)?;
        }
        Ok(())
    }

    fn soft_break(&mut self) -> io::Result<()> {
        self.line.push(b'=');
        self.hard_break()
    }

    fn hard_break(&mut self) -> io::Result<()> {
        self.line.extend_from_slice(b"\r\n");
        self.inner.write_all(&self.line)?;
        self.line.clear();
        Ok(())
    }
}

impl<W: Write> Write for QuotedPrintableWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.encode_byte(byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// See [`QuotedPrintableWriter`] for the exact rules.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut writer = QuotedPrintableWriter::new(Vec::with_capacity(text.len()));
    // Writing into a Vec cannot fail.
    let _ = writer.write_all(text.as_bytes());
    let encoded = writer.finish().unwrap_or_default();
    String::from_utf8_lossy(&encoded).into_owned()
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// Soft line breaks may use CRLF or a bare LF.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences or
/// does not decode to UTF-8.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let decoded = decode_qp_bytes(text.as_bytes(), false)?;
    String::from_utf8(decoded).map_err(Into::into)
}

fn decode_qp_bytes(input: &[u8], underscore_is_space: bool) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            b'=' => match input.get(i + 1..) {
                Some([b'\r', b'\n', ..]) => i += 3,
                Some([b'\n', ..]) => i += 2,
                Some([hi, lo, ..]) => {
                    let byte = hex_value(*hi)
                        .zip(hex_value(*lo))
                        .map(|(hi, lo)| hi << 4 | lo)
                        .ok_or_else(|| {
                            Error::InvalidEncoding(format!(
                                "Invalid hex escape: ={}{}",
                                char::from(*hi),
                                char::from(*lo)
                            ))
                        })?;
                    result.push(byte);
                    i += 3;
                }
                _ => {
                    return Err(Error::InvalidEncoding(
                        "Incomplete escape sequence".to_string(),
                    ));
                }
            },
            b'_' if underscore_is_space => {
                result.push(b' ');
                i += 1;
            }
            byte => {
                result.push(byte);
                i += 1;
            }
        }
    }

    Ok(result)
}

const fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

/// Returns true if a header value must be RFC 2047 encoded.
///
/// Anything outside printable ASCII and space, tab excepted, needs it.
#[must_use]
pub fn needs_rfc2047(text: &str) -> bool {
    text.chars().any(|c| (c < ' ' || c > '~') && c != '\t')
}

const fn is_q_literal(byte: u8) -> bool {
    matches!(byte, b'!'..=b'~') && byte != b'=' && byte != b'?' && byte != b'_'
}

/// Encodes a header value using RFC 2047 "Q" encoding.
///
/// Format: `=?charset?q?encoded-text?=`. Text that needs no encoding is
/// returned as is. Long values are split into several encoded words of
/// at most 75 characters, on character boundaries, separated by a space.
///
/// # Arguments
///
/// * `text` - Text to encode
/// * `charset` - Character set (e.g., "utf-8")
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if !needs_rfc2047(text) {
        return text.to_string();
    }

    let prefix = format!("=?{charset}?q?");
    let max_content = MAX_ENCODED_WORD_LENGTH.saturating_sub(prefix.len() + 2);

    let mut result = String::with_capacity(text.len() * 3 + prefix.len() + 2);
    result.push_str(&prefix);
    let mut word_length = 0;
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        let bytes = ch.encode_utf8(&mut buf).as_bytes();
        let encoded_length: usize = bytes
            .iter()
            .map(|&b| if b == b' ' || is_q_literal(b) { 1 } else { 3 })
            .sum();

        if word_length > 0 && word_length + encoded_length > max_content {
            result.push_str("?= ");
            result.push_str(&prefix);
            word_length = 0;
        }

        for &byte in bytes {
            if byte == b' ' {
                result.push('_');
            } else if is_q_literal(byte) {
                result.push(char::from(byte));
            } else {
                let _ = write!(result, "={byte:02X}");
            }
        }
        word_length += encoded_length;
    }

    result.push_str("?=");
    result
}

/// Decodes an RFC 2047 encoded header value.
///
/// Handles any number of whitespace-separated encoded words (B or Q).
/// Whitespace between adjacent encoded words is dropped; plain words pass
/// through with single spaces. Values without encoded words are returned
/// unchanged.
///
/// # Errors
///
/// Returns an error if an encoded word is malformed or the result is not
/// valid UTF-8.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.contains("=?") {
        return Ok(text.to_string());
    }

    let mut decoded = Vec::with_capacity(text.len());
    let mut previous_encoded = false;

    for (index, token) in text.split_whitespace().enumerate() {
        match decode_encoded_word(token)? {
            Some(bytes) => {
                if index > 0 && !previous_encoded {
                    decoded.push(b' ');
                }
                decoded.extend_from_slice(&bytes);
                previous_encoded = true;
            }
            None => {
                if index > 0 {
                    decoded.push(b' ');
                }
                decoded.extend_from_slice(token.as_bytes());
                previous_encoded = false;
            }
        }
    }

    String::from_utf8(decoded).map_err(Into::into)
}

fn decode_encoded_word(token: &str) -> Result<Option<Vec<u8>>> {
    let Some(inner) = token
        .strip_prefix("=?")
        .and_then(|rest| rest.strip_suffix("?="))
    else {
        return Ok(None);
    };

    let parts: Vec<&str> = inner.splitn(3, '?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    };

    match encoding.to_ascii_uppercase().as_str() {
        "B" => decode_base64(encoded_text).map(Some),
        "Q" => decode_qp_bytes(encoded_text.as_bytes(), true).map(Some),
        other => Err(Error::InvalidEncoding(format!("Unknown encoding: {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn longest_line(encoded: &str) -> usize {
        encoded.split("\r\n").map(str::len).max().unwrap_or(0)
    }

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_wrapped_short_input() {
        let encoded = encode_base64_wrapped(b"This is the content of the file.");
        assert_eq!(
            encoded,
            "VGhpcyBpcyB0aGUgY29udGVudCBvZiB0aGUgZmlsZS4=\r\n"
        );
    }

    #[test]
    fn test_base64_wrapped_line_boundaries() {
        // 57 input bytes encode to exactly 76 characters.
        let encoded = encode_base64_wrapped(&[0xAB; 57]);
        assert_eq!(encoded.len(), 78);
        assert!(encoded.ends_with("\r\n"));

        let encoded = encode_base64_wrapped(&[0xAB; 58]);
        let lines: Vec<&str> = encoded.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines[1], "qw==");
    }

    #[test]
    fn test_base64_wrapped_empty() {
        assert_eq!(encode_base64_wrapped(b""), "");
        let mut out = Vec::new();
        write_base64_wrapped(&mut out, b"").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_base64_writer_matches_string_form() {
        let data: Vec<u8> = (0..=255).collect();
        let mut out = Vec::new();
        write_base64_wrapped(&mut out, &data).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), encode_base64_wrapped(&data));
    }

    #[test]
    fn test_quoted_printable_encode() {
        let text = "Hello, World!";
        let encoded = encode_quoted_printable(text);
        assert_eq!(encoded, "Hello, World!");

        let text = "Héllo, Wørld!";
        let encoded = encode_quoted_printable(text);
        assert_eq!(encoded, "H=C3=A9llo, W=C3=B8rld!");
    }

    #[test]
    fn test_quoted_printable_equals_sign() {
        assert_eq!(encode_quoted_printable("a=b"), "a=3Db");
    }

    #[test]
    fn test_quoted_printable_line_breaks_canonical() {
        assert_eq!(encode_quoted_printable("a\nb"), "a\r\nb");
        assert_eq!(encode_quoted_printable("a\r\nb"), "a\r\nb");
        assert_eq!(encode_quoted_printable("a\rb"), "a\r\nb");
        assert_eq!(encode_quoted_printable("a\n\nb"), "a\r\n\r\nb");
    }

    #[test]
    fn test_quoted_printable_trailing_whitespace() {
        assert_eq!(encode_quoted_printable("end \r\nnext"), "end=20\r\nnext");
        assert_eq!(encode_quoted_printable("tab\t\nnext"), "tab=09\r\nnext");
        assert_eq!(encode_quoted_printable("last "), "last=20");
        assert_eq!(encode_quoted_printable("a b"), "a b");
    }

    #[test]
    fn test_quoted_printable_soft_wrap() {
        let text = "x".repeat(200);
        let encoded = encode_quoted_printable(&text);
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 76);
        assert!(lines[0].ends_with('='));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
    }

    #[test]
    fn test_quoted_printable_escape_not_split() {
        let text = format!("{}é", "x".repeat(73));
        let encoded = encode_quoted_printable(&text);
        assert!(longest_line(&encoded) <= MAX_LINE_LENGTH);
        for line in encoded.split("\r\n") {
            let trimmed = line.trim_end_matches('=');
            assert!(!trimmed.ends_with("=C") && !trimmed.ends_with("=C3=A"));
        }
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
    }

    #[test]
    fn test_quoted_printable_decode() {
        let encoded = "Hello, World!";
        let decoded = decode_quoted_printable(encoded).unwrap();
        assert_eq!(decoded, "Hello, World!");

        let encoded = "H=C3=A9llo";
        let decoded = decode_quoted_printable(encoded).unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        let encoded = "Hello=\r\nWorld";
        let decoded = decode_quoted_printable(encoded).unwrap();
        assert_eq!(decoded, "HelloWorld");

        assert_eq!(decode_quoted_printable("Hello=\nWorld").unwrap(), "HelloWorld");
    }

    #[test]
    fn test_quoted_printable_decode_invalid() {
        assert!(decode_quoted_printable("bad=ZZ").is_err());
        assert!(decode_quoted_printable("cut=4").is_err());
    }

    #[test]
    fn test_writer_reports_inner_errors() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = QuotedPrintableWriter::new(FailingWriter);
        writer.write_all(b"short").unwrap();
        assert!(writer.finish().is_err());

        let mut writer = QuotedPrintableWriter::new(FailingWriter);
        assert!(writer.write_all(b"line\r\n").is_err());
    }

    #[test]
    fn test_rfc2047_encode() {
        let text = "Hello";
        let encoded = encode_rfc2047(text, "utf-8");
        assert_eq!(encoded, "Hello"); // No encoding needed

        let text = "Héllo wörld";
        let encoded = encode_rfc2047(text, "utf-8");
        assert_eq!(encoded, "=?utf-8?q?H=C3=A9llo_w=C3=B6rld?=");
    }

    #[test]
    fn test_rfc2047_escapes_specials() {
        let encoded = encode_rfc2047("é=?_", "utf-8");
        assert_eq!(encoded, "=?utf-8?q?=C3=A9=3D=3F=5F?=");
    }

    #[test]
    fn test_rfc2047_splits_long_values() {
        let text = "Привет, это очень длинная тема письма для проверки переноса";
        let encoded = encode_rfc2047(text, "utf-8");
        let words: Vec<&str> = encoded.split(' ').collect();
        assert!(words.len() > 1);
        for word in &words {
            assert!(word.len() <= 75, "encoded word too long: {word}");
            assert!(word.starts_with("=?utf-8?q?") && word.ends_with("?="));
        }
        assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
    }

    #[test]
    fn test_rfc2047_control_characters_trigger_encoding() {
        assert!(needs_rfc2047("line\r\nbreak"));
        assert!(!needs_rfc2047("tab\tseparated"));
        assert!(!needs_rfc2047("plain ASCII subject"));
    }

    #[test]
    fn test_rfc2047_decode() {
        let encoded = "Hello";
        let decoded = decode_rfc2047(encoded).unwrap();
        assert_eq!(decoded, "Hello");

        let encoded = "=?utf-8?B?SMOpbGxv?=";
        let decoded = decode_rfc2047(encoded).unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn test_rfc2047_quoted_printable() {
        let encoded = "=?utf-8?Q?H=C3=A9llo?=";
        let decoded = decode_rfc2047(encoded).unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn test_rfc2047_mixed_words() {
        let decoded = decode_rfc2047("Re: =?utf-8?q?caf=C3=A9?= =?utf-8?q?_ol=C3=A9?=").unwrap();
        assert_eq!(decoded, "Re: café olé");
    }

    proptest! {
        #[test]
        fn prop_quoted_printable_round_trip(text in "[^\r\n]{0,400}") {
            let encoded = encode_quoted_printable(&text);
            prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
        }

        #[test]
        fn prop_quoted_printable_crlf_round_trip(lines in prop::collection::vec("[^\r\n]{0,120}", 1..6)) {
            let text = lines.join("\r\n");
            let encoded = encode_quoted_printable(&text);
            prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
        }

        #[test]
        fn prop_quoted_printable_line_length(text in "\\PC{0,400}") {
            let encoded = encode_quoted_printable(&text);
            prop_assert!(longest_line(&encoded) <= MAX_LINE_LENGTH);
            prop_assert!(encoded.bytes().all(|b| b.is_ascii()));
        }

        #[test]
        fn prop_base64_wrapped_round_trip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let encoded = encode_base64_wrapped(&data);
            prop_assert!(longest_line(&encoded) <= MAX_LINE_LENGTH);
            prop_assert_eq!(decode_base64_wrapped(&encoded).unwrap(), data);
        }

        #[test]
        fn prop_rfc2047_round_trip(text in "\\PC{0,120}") {
            let encoded = encode_rfc2047(&text, "utf-8");
            for word in encoded.split(' ').filter(|w| w.starts_with("=?")) {
                prop_assert!(word.len() <= 75);
            }
            if needs_rfc2047(&text) {
                prop_assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
            }
        }
    }
}
