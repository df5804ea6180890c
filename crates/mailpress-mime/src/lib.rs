//! # mailpress-mime
//!
//! Assembles outgoing email into a single MIME byte stream (RFC 2045,
//! 2046, 2047 and 5322), ready to hand to a mail transport as the message
//! payload.
//!
//! ## Features
//!
//! - **Assembly**: text or HTML body, attachments (`multipart/mixed`) and
//!   inline resources (`multipart/related`)
//! - **Encoding/Decoding**: wrapped Base64, Quoted-Printable, RFC 2047
//!   header words
//! - **Validation**: syntactic address checks before anything is written
//! - **Injectable collaborators**: random source for boundaries, file
//!   source for attachments given by path
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpress_mime::{Attachment, InlineResource, Message};
//!
//! let message = Message::html("sender@example.com", "Report", "<img src=\"cid:logo\">")
//!     .to("recipient@example.com")
//!     .embed(InlineResource::new("logo", "logo.png", "image/png", logo_bytes))
//!     .attach(Attachment::from_file("report.pdf").with_content_type("application/pdf"));
//!
//! let payload: Vec<u8> = message.to_bytes()?;
//! ```
//!
//! ### Deterministic boundaries
//!
//! ```ignore
//! use mailpress_mime::Assembler;
//!
//! let mut assembler = Assembler::new().with_rng(my_seeded_crypto_rng);
//! let payload = assembler.assemble(&message)?;
//! ```
//!
//! ### Encoding
//!
//! ```ignore
//! use mailpress_mime::encoding::{encode_base64_wrapped, encode_quoted_printable, encode_rfc2047};
//!
//! let body = encode_quoted_printable("Héllo, Wørld!");
//! let data = encode_base64_wrapped(b"\x89PNG...");
//! let subject = encode_rfc2047("Grüße", "utf-8");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod assemble;
mod boundary;
mod content_type;
mod error;
mod fs;
mod header;
mod message;

pub mod encoding;

pub use address::is_valid_address;
pub use assemble::{Assembler, Structure, validate};
pub use boundary::{BOUNDARY_PREFIX, BoundaryGenerator};
pub use content_type::{
    BODY_CHARSET, DEFAULT_CONTENT_TYPE, Disposition, MailType, TransferEncoding,
    effective_content_type,
};
pub use error::{AddressRole, Error, Result};
pub use fs::{FileSource, LocalFiles};
pub use header::{encode_subject, format_headers, join_recipients, write_headers};
pub use message::{Attachment, AttachmentSource, InlineResource, Message};
