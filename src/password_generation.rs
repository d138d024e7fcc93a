//! Utilities for generating passwords.

use rand::rngs::OsRng;
use tracing::debug;

use crate::charset::{compose_char_range, CharClass};
use crate::config::{Algorithm, GenerationConfig};
use crate::random::{coin_flip_bool, rand_num, random_u64, EntropySource};
use crate::sampler::sample_string;
use crate::{Error, Secret};

/// Generates passwords according to a fixed [`GenerationConfig`].
///
/// A generator holds no state besides its configuration, so one instance can be shared between
/// threads; each call brings its own entropy source.
#[derive(Clone, Debug)]
pub struct Generator {
    config: GenerationConfig,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Generator {
        Generator { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a password (or a coin flip) using the operating system's CSPRNG.
    pub fn generate_os(&self) -> Result<Secret, Error> {
        self.generate(&mut OsRng)
    }

    /// Generate according to the configured algorithm.
    pub fn generate<R>(&self, rng: &mut R) -> Result<Secret, Error>
    where
        R: EntropySource + ?Sized,
    {
        match self.config.algorithm {
            Algorithm::RandomPassword => self.generate_with_char_range(rng, &self.char_range()),
            Algorithm::CoinFlip => {
                let outcome = if coin_flip_bool(rng)? { "Heads" } else { "Tails" };
                Ok(Secret(outcome.to_owned()))
            }
            Algorithm::Unsupported => Err(Error::UnsupportedAlgorithm),
        }
    }

    /// Generate a random password over an explicit alphabet, instead of the one composed from
    /// the configured classes. Length and minimum counts are still taken from the configuration.
    ///
    /// Candidates are sampled until one satisfies every configured minimum, or until
    /// `max_attempts` candidates have been rejected.
    pub fn generate_with_char_range<R>(
        &self,
        rng: &mut R,
        char_range: &str,
    ) -> Result<Secret, Error>
    where
        R: EntropySource + ?Sized,
    {
        if char_range.is_empty() {
            return Err(Error::InvalidCharRange);
        }
        self.check_feasible(char_range)?;

        let length = self.resolve_length_with_floor(rng, self.config.required_chars())?;
        debug!(length, alphabet = char_range.chars().count(), "generating password");

        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let candidate = sample_string(rng, length, char_range)?;
            if self.meets_minimums(&candidate) {
                debug!(attempts, "candidate accepted");
                return Ok(Secret(candidate));
            }
            if let Some(max_attempts) = self.config.max_attempts {
                if attempts >= max_attempts.get() {
                    return Err(Error::AttemptsExhausted(attempts));
                }
            }
        }
    }

    /// The alphabet for the configured classes.
    pub fn char_range(&self) -> String {
        compose_char_range(&self.config.classes, self.config.human_readable)
    }

    /// Pick the length of the next password: the fixed length if one is configured, otherwise a
    /// uniformly random length between the bounds (inclusive). Never less than 1.
    pub fn resolve_length<R>(&self, rng: &mut R) -> Result<usize, Error>
    where
        R: EntropySource + ?Sized,
    {
        self.resolve_length_with_floor(rng, 0)
    }

    /// Like `resolve_length`, but ranged lengths start at `floor` at the lowest. `floor` must
    /// not exceed the upper bound.
    fn resolve_length_with_floor<R>(&self, rng: &mut R, floor: usize) -> Result<usize, Error>
    where
        R: EntropySource + ?Sized,
    {
        if let Some(fixed) = self.fixed_length() {
            return Ok(fixed);
        }
        let (lo, hi) = self.length_bounds();
        let lo = lo.max(floor);
        let hi = hi.max(lo);
        let offset = match ((hi - lo) as u64).checked_add(1) {
            Some(span) => rand_num(rng, span)?,
            None => random_u64(rng)?,
        };
        Ok((lo + offset as usize).max(1))
    }

    fn fixed_length(&self) -> Option<usize> {
        self.config.fixed_length.filter(|&length| length > 0)
    }

    fn length_bounds(&self) -> (usize, usize) {
        let (min, max) = (self.config.min_length, self.config.max_length);
        (min.min(max), min.max(max))
    }

    /// Whether `candidate` contains at least the configured number of characters of each class.
    pub fn meets_minimums(&self, candidate: &str) -> bool {
        CharClass::CANONICAL_ORDER.into_iter().all(|class| {
            let minimum = self.config.minimum(class);
            if minimum == 0 {
                return true;
            }
            let literal = class.literal(self.config.human_readable);
            let count = candidate.chars().filter(|&c| literal.contains(c)).count();
            count >= minimum
        })
    }

    /// Refuse minimums that no candidate drawn from `char_range` could ever meet, which would
    /// otherwise keep the generator sampling forever.
    fn check_feasible(&self, char_range: &str) -> Result<(), Error> {
        for class in CharClass::CANONICAL_ORDER {
            let minimum = self.config.minimum(class);
            let literal = class.literal(self.config.human_readable);
            if minimum > 0 && !char_range.chars().any(|c| literal.contains(c)) {
                return Err(Error::InfeasibleConstraints(format!(
                    "at least {minimum} {class} characters are required, but the alphabet has \
                     none"
                )));
            }
        }
        let required = self.config.required_chars();
        let longest = match self.fixed_length() {
            Some(fixed) => fixed,
            None => self.length_bounds().1.max(1),
        };
        if required > longest {
            return Err(Error::InfeasibleConstraints(format!(
                "the minimums require {required} characters, but passwords are at most {longest} \
                 characters long"
            )));
        }
        Ok(())
    }
}
