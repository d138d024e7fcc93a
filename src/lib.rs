//! Cryptographically secure password generation from configurable character classes.
//!
//! The entry point is [`Generator`], which holds a [`GenerationConfig`] and produces passwords
//! from any [`EntropySource`]. Production code uses the operating system's CSPRNG
//! ([`rand::rngs::OsRng`]); tests can substitute a seeded generator.

pub mod charset;
pub mod config;
pub mod password_generation;
pub mod random;
pub mod sampler;

pub use charset::{compose_char_range, CharClass, CharClasses};
pub use config::{Algorithm, GenerationConfig};
pub use password_generation::Generator;
pub use random::EntropySource;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("provided length value cannot be zero")]
    InvalidLength,
    #[error(
        "number of generated random bytes ({read}) does not match the expected length ({expected})"
    )]
    LengthMismatch { expected: usize, read: usize },
    #[error("provided character range is empty")]
    InvalidCharRange,
    #[error(
        "provided character range has {len} characters; at most {} are supported",
        sampler::MAX_CHAR_RANGE
    )]
    CharRangeTooLarge { len: usize },
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("the configured minimums can never be satisfied: {0}")]
    InfeasibleConstraints(String),
    #[error("no candidate met the configured minimums after {0} attempts")]
    AttemptsExhausted(u32),
    #[error("failed to read from the entropy source: {0}")]
    Entropy(#[source] rand::Error),
}

/// A generated password. The `Debug` output never shows the contents.
#[derive(Clone, Eq, PartialEq)]
pub struct Secret(String);

opaque_debug::implement!(Secret);

impl Secret {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Secret {
        Secret(s)
    }
}
