//! Error types for MIME operations.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which header an invalid address was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    /// The `From` header.
    From,
    /// One entry of the `To` header.
    To,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => write!(f, "From"),
            Self::To => write!(f, "To"),
        }
    }
}

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The recipient list is empty.
    #[error("recipient list is empty")]
    EmptyRecipients,

    /// The message body is empty.
    #[error("email body is empty")]
    EmptyBody,

    /// An address failed the syntactic check.
    #[error("invalid {role} email address: {address}")]
    InvalidAddress {
        /// Header the address belongs to.
        role: AddressRole,
        /// The offending address, verbatim.
        address: String,
    },

    /// Writing an encoded part failed.
    #[error("Encoding failure: {0}")]
    Encoding(#[from] io::Error),

    /// Reading attachment content from the filesystem failed.
    #[error("Failed to read attachment {}: {source}", path.display())]
    AttachmentRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The secure random source could not supply a boundary.
    #[error("Secure random source failed: {0}")]
    Randomness(#[from] rand::Error),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}

impl Error {
    /// Creates an invalid address error.
    #[must_use]
    pub fn invalid_address(role: AddressRole, address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            role,
            address: address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        assert_eq!(Error::EmptyRecipients.to_string(), "recipient list is empty");
        assert_eq!(Error::EmptyBody.to_string(), "email body is empty");
    }

    #[test]
    fn test_invalid_address_message_names_address() {
        let err = Error::invalid_address(AddressRole::To, "not-an-address");
        assert_eq!(err.to_string(), "invalid To email address: not-an-address");

        let err = Error::invalid_address(AddressRole::From, "a@b");
        assert_eq!(err.to_string(), "invalid From email address: a@b");
    }

    #[test]
    fn test_attachment_read_message_has_path() {
        let err = Error::AttachmentRead {
            path: PathBuf::from("missing.pdf"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.pdf"));
        assert!(msg.contains("no such file"));
    }
}
