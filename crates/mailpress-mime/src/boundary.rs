//! Multipart boundary generation.
//!
//! Each multipart container gets its own token, drawn from a
//! cryptographically secure source so that nested containers never
//! collide with each other or with body content.

use std::fmt::Write as _;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::Result;

/// Literal prefix of every generated boundary.
pub const BOUNDARY_PREFIX: &str = "boundary-";

/// Number of random bytes per boundary.
const BOUNDARY_ENTROPY: usize = 16;

/// Generator for multipart boundary tokens.
///
/// The random source is an explicit capability so tests can substitute a
/// deterministic one. Tokens have the form `boundary-` followed by 32
/// lowercase hex digits.
#[derive(Debug, Clone)]
pub struct BoundaryGenerator<R = OsRng> {
    rng: R,
}

impl BoundaryGenerator<OsRng> {
    /// Creates a generator backed by the operating system's secure source.
    #[must_use]
    pub const fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for BoundaryGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> BoundaryGenerator<R> {
    /// Creates a generator with the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Produces a fresh boundary token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Randomness`](crate::Error::Randomness) if the
    /// random source cannot supply bytes. There is no weaker fallback.
    pub fn next_boundary(&mut self) -> Result<String> {
        let mut bytes = [0u8; BOUNDARY_ENTROPY];
        self.rng.try_fill_bytes(&mut bytes)?;

        let mut token = String::with_capacity(BOUNDARY_PREFIX.len() + BOUNDARY_ENTROPY * 2);
        token.push_str(BOUNDARY_PREFIX);
        for byte in bytes {
            let _ = write!(token, "{byte:02x}");
        }
        Ok(token)
    }
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
    use crate::Error;

    /// Deterministic source that counts up from a seed.
    struct CountingRng(u8);

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            u32::from(self.next_byte())
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.next_byte())
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest {
                *b = self.next_byte();
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CountingRng {
        fn next_byte(&mut self) -> u8 {
            let b = self.0;
            self.0 = self.0.wrapping_add(1);
            b
        }
    }

    impl CryptoRng for CountingRng {}

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("entropy pool empty")))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_boundary_format() {
        let boundary = BoundaryGenerator::new().next_boundary().unwrap();
        assert!(boundary.starts_with(BOUNDARY_PREFIX));

        let hex = &boundary[BOUNDARY_PREFIX.len()..];
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_deterministic_source() {
        let mut generator = BoundaryGenerator::with_rng(CountingRng(0));
        assert_eq!(
            generator.next_boundary().unwrap(),
            "boundary-000102030405060708090a0b0c0d0e0f"
        );
        assert_eq!(
            generator.next_boundary().unwrap(),
            "boundary-101112131415161718191a1b1c1d1e1f"
        );
    }

    #[test]
    fn test_successive_boundaries_differ() {
        let mut generator = BoundaryGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generator.next_boundary().unwrap()));
        }
    }

    #[test]
    fn test_random_failure_propagates() {
        let mut generator = BoundaryGenerator::with_rng(BrokenRng);
        let err = generator.next_boundary().unwrap_err();
        assert!(matches!(err, Error::Randomness(_)));
    }
}
