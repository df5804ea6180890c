//! Syntactic email address check.
//!
//! This is a filter for obviously malformed input, not an RFC 5322
//! parser. No DNS or mailbox verification happens here.

use std::sync::LazyLock;

use regex::Regex;

/// `local-part@domain` where the last domain label is letters only.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Returns true if `address` looks like a deliverable mailbox address.
///
/// Accepts a local part of letters, digits and `._%+-`, an `@`, and a
/// domain of letters, digits, `.` and `-` whose final label is at least
/// two letters.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
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
    fn test_valid_addresses() {
        assert!(is_valid_address("user@example.com"));
        assert!(is_valid_address("user.name+tag@example.com"));
        assert!(is_valid_address("first_last%x@sub.example.co.uk"));
        assert!(is_valid_address("a@b.io"));
        assert!(is_valid_address("a-b@my-host.org"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("user"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address("user@"));
        assert!(!is_valid_address("user@example"));
        assert!(!is_valid_address("user@@example.com"));
        assert!(!is_valid_address("user@example.c"));
        assert!(!is_valid_address("user@example.c0m"));
        assert!(!is_valid_address("user name@example.com"));
        assert!(!is_valid_address("Name <user@example.com>"));
    }

    #[test]
    fn test_no_surrounding_whitespace() {
        assert!(!is_valid_address(" user@example.com"));
        assert!(!is_valid_address("user@example.com\r\n"));
    }
}
