//! Generation settings, and loading them from YAML profile files.

use std::fmt;
use std::fs::File;
use std::io;
use std::num::NonZeroU32;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::charset::{CharClass, CharClasses};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Algorithm {
    /// Sample a password from the configured character classes.
    #[default]
    RandomPassword,
    /// Answer "Heads" or "Tails".
    CoinFlip,
    /// A selector that names no known algorithm. Generating with it fails.
    Unsupported,
}

impl FromStr for Algorithm {
    type Err = std::convert::Infallible;

    /// Anything unrecognised selects [`Algorithm::Unsupported`]; the error surfaces when a
    /// password is generated.
    fn from_str(s: &str) -> Result<Algorithm, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "1" | "random" => Algorithm::RandomPassword,
            "2" | "coinflip" | "coin-flip" => Algorithm::CoinFlip,
            _ => Algorithm::Unsupported,
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::RandomPassword => "random",
            Algorithm::CoinFlip => "coinflip",
            Algorithm::Unsupported => "unsupported",
        })
    }
}

impl Serialize for Algorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.parse() {
            Ok(algorithm) => Ok(algorithm),
            Err(never) => match never {},
        }
    }
}

/// Everything that controls what a [`crate::Generator`] produces.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenerationConfig {
    /// When set (and non-zero), every password has exactly this length, regardless of
    /// `min_length` and `max_length`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_length: Option<usize>,
    pub min_length: usize,
    pub max_length: usize,
    pub classes: CharClasses,
    pub human_readable: bool,
    pub min_lower_case: usize,
    pub min_upper_case: usize,
    pub min_numeric: usize,
    pub min_special: usize,
    pub algorithm: Algorithm,
    /// Give up after this many rejected candidates. Unbounded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<NonZeroU32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            fixed_length: None,
            min_length: 12,
            max_length: 20,
            classes: CharClasses {
                lower: true,
                upper: true,
                numeric: true,
                special: false,
            },
            human_readable: false,
            min_lower_case: 0,
            min_upper_case: 0,
            min_numeric: 0,
            min_special: 0,
            algorithm: Algorithm::RandomPassword,
            max_attempts: None,
        }
    }
}

impl GenerationConfig {
    /// Load a profile from a YAML file. Keys that are left out take their default values.
    pub fn from_yaml_file(path: &Path) -> Result<GenerationConfig, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        serde_yaml::from_reader(file).map_err(ConfigError::Parse)
    }

    /// The configured minimum number of occurrences for `class`.
    pub fn minimum(&self, class: CharClass) -> usize {
        match class {
            CharClass::Lower => self.min_lower_case,
            CharClass::Upper => self.min_upper_case,
            CharClass::Numeric => self.min_numeric,
            CharClass::Special => self.min_special,
        }
    }

    pub fn set_minimum(&mut self, class: CharClass, minimum: usize) {
        let slot = match class {
            CharClass::Lower => &mut self.min_lower_case,
            CharClass::Upper => &mut self.min_upper_case,
            CharClass::Numeric => &mut self.min_numeric,
            CharClass::Special => &mut self.min_special,
        };
        *slot = minimum;
    }

    /// Total of all per-class minimums.
    pub fn required_chars(&self) -> usize {
        CharClass::CANONICAL_ORDER
            .iter()
            .map(|class| self.minimum(*class))
            .sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[source] io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[source] serde_yaml::Error),
}
