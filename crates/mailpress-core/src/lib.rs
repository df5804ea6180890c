//! # mailpress-core
//!
//! Sending surfaces built on `mailpress-mime`.
//!
//! This crate provides:
//! - **Transport boundary** - [`Transport`] trait and [`Envelope`]; network
//!   sessions are supplied by the caller
//! - **Mail sending** - [`MailSender`] assembles a message and delivers it
//! - **Quick sends** - [`QuickSender`] for plain-text mail to a fixed list
//! - **Configuration** - JSON-backed [`SenderConfig`] with validation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod quick;
mod sender;
mod transport;

pub use config::{
    SenderConfig, SmtpSettings, ValidationError, ValidationResult, validate_config,
};
pub use error::{Error, Result};
pub use quick::QuickSender;
pub use sender::MailSender;
pub use transport::{Envelope, Transport};
