//! Sender configuration.
//!
//! Provides the SMTP settings and default envelope used by quick sends,
//! JSON persistence, and validation.

mod model;
mod validation;

pub use model::{SenderConfig, SmtpSettings};
pub use validation::{ValidationError, ValidationResult, validate_config};
