//! Character classes, their literal sets, and composing them into an alphabet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const LOWER_HUMAN: &str = "abcdefghjkmnpqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const UPPER_HUMAN: &str = "ABCDEFGHJKMNPQRSTUVWXYZ";
pub const NUMERIC: &str = "0123456789";
pub const NUMERIC_HUMAN: &str = "23456789";
pub const SPECIAL: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
pub const SPECIAL_HUMAN: &str = "#%*+-:=?@^_";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharClass {
    Lower,
    Upper,
    Numeric,
    Special,
}

impl CharClass {
    /// The order in which classes are laid out in a composed alphabet.
    pub const CANONICAL_ORDER: [CharClass; 4] = [
        CharClass::Lower,
        CharClass::Numeric,
        CharClass::Special,
        CharClass::Upper,
    ];

    /// The literal set for this class. The human-readable variant leaves out characters that are
    /// easily confused with one another, such as `0`/`O` and `1`/`l`.
    pub fn literal(self, human_readable: bool) -> &'static str {
        match (self, human_readable) {
            (CharClass::Lower, false) => LOWER,
            (CharClass::Lower, true) => LOWER_HUMAN,
            (CharClass::Upper, false) => UPPER,
            (CharClass::Upper, true) => UPPER_HUMAN,
            (CharClass::Numeric, false) => NUMERIC,
            (CharClass::Numeric, true) => NUMERIC_HUMAN,
            (CharClass::Special, false) => SPECIAL,
            (CharClass::Special, true) => SPECIAL_HUMAN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharClass::Lower => "lower case",
            CharClass::Upper => "upper case",
            CharClass::Numeric => "numeric",
            CharClass::Special => "special",
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which character classes are enabled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CharClasses {
    pub lower: bool,
    pub upper: bool,
    pub numeric: bool,
    pub special: bool,
}

impl CharClasses {
    pub const ALL: CharClasses = CharClasses {
        lower: true,
        upper: true,
        numeric: true,
        special: true,
    };

    pub fn contains(&self, class: CharClass) -> bool {
        match class {
            CharClass::Lower => self.lower,
            CharClass::Upper => self.upper,
            CharClass::Numeric => self.numeric,
            CharClass::Special => self.special,
        }
    }

    pub fn set(&mut self, class: CharClass, enabled: bool) {
        let flag = match class {
            CharClass::Lower => &mut self.lower,
            CharClass::Upper => &mut self.upper,
            CharClass::Numeric => &mut self.numeric,
            CharClass::Special => &mut self.special,
        };
        *flag = enabled;
    }

    /// Enabled classes, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = CharClass> + '_ {
        CharClass::CANONICAL_ORDER
            .into_iter()
            .filter(move |class| self.contains(*class))
    }
}

/// Build the alphabet for the enabled classes: each enabled class's literal set, once, in
/// canonical order (lower case, numeric, special, upper case).
///
/// Returns an empty string when no class is enabled.
pub fn compose_char_range(classes: &CharClasses, human_readable: bool) -> String {
    let mut char_range = String::new();
    for class in classes.iter() {
        char_range.push_str(class.literal(human_readable));
    }
    char_range
}

/// The result of parsing a mode string such as `"LUNsH"`.
///
/// Each letter names a mode: `L` lower case, `U` upper case, `N` numeric, `S` special and
/// `H` human readable. An upper-case letter enables the mode, a lower-case letter disables it.
/// Modes not mentioned are left as they were.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ModeString {
    changes: Vec<(Mode, bool)>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Class(CharClass),
    HumanReadable,
}

impl ModeString {
    /// Apply the parsed changes on top of existing settings.
    pub fn apply(&self, classes: &mut CharClasses, human_readable: &mut bool) {
        for (mode, enabled) in &self.changes {
            match mode {
                Mode::Class(class) => classes.set(*class, *enabled),
                Mode::HumanReadable => *human_readable = *enabled,
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(
    "unknown mode {0:?}; expected one of L, U, N, S or H (upper case enables, lower case \
     disables)"
)]
pub struct UnknownMode(char);

impl FromStr for ModeString {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<ModeString, UnknownMode> {
        let mut changes = Vec::with_capacity(s.len());
        for ch in s.chars() {
            let mode = match ch.to_ascii_uppercase() {
                'L' => Mode::Class(CharClass::Lower),
                'U' => Mode::Class(CharClass::Upper),
                'N' => Mode::Class(CharClass::Numeric),
                'S' => Mode::Class(CharClass::Special),
                'H' => Mode::HumanReadable,
                _ => return Err(UnknownMode(ch)),
            };
            changes.push((mode, ch.is_ascii_uppercase()));
        }
        Ok(ModeString { changes })
    }
}
