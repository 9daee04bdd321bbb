//! Beider-Morse Phonetic Matching.
//!
//! The encoder rewrites a normalized name with an ordered, context sensitive
//! rule table, then refines the intermediate phonetic with two final rule
//! passes. The output is a phonetic string whose parenthesized groups carry
//! alternative pronunciations and whose bracketed attributes carry language
//! compatibility masks. Names written in different languages or
//! romanizations end up with overlapping alternatives.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

mod context;
mod engine;
mod input;
mod lang;
mod languages;
mod phoneme;
mod rule;

pub use input::MAX_INPUT_LENGTH;
pub use languages::{Language, LanguageMask};

use crate::beider_morse::engine::PhoneticEngine;
use crate::beider_morse::lang::Langs;
use crate::beider_morse::phoneme::strip_attrs;
use crate::beider_morse::rule::Rules;
use crate::{Encoder, PhoneticError};

const ASH: &str = "ash";
const GEN: &str = "gen";
const SEP: &str = "sep";

const GENERIC_PREFIXES: [&str; 19] = [
    "al", "bar", "ben", "da", "dal", "de", "del", "dela", "della", "des", "di", "do", "dos", "du",
    "el", "van", "vanden", "vander", "von",
];
const ASHKENAZIC_PREFIXES: [&str; 6] = ["bar", "ben", "da", "de", "van", "von"];
const SEPHARDIC_PREFIXES: [&str; 15] = [
    "al", "da", "dal", "de", "del", "dela", "della", "des", "di", "do", "dos", "du", "el", "van",
    "von",
];

/// Errors raised while loading rule data.
#[derive(Debug)]
pub enum RuleLoadError {
    /// A required rule file is absent.
    FileNotFound(String),
    /// A rule file isn't valid JSON, or a rule in it is malformed.
    InvalidFormat(String),
    /// A rule file lacks a mandatory field.
    MissingField(String),
    /// A context or language detection regex doesn't compile.
    BadContextRegex(regex::Error),
    /// An IO error other than file-not-found.
    ParseConfiguration(std::io::Error),
}

impl Display for RuleLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(error) => write!(f, "File not found : {}", error),
            Self::InvalidFormat(error) => write!(f, "Invalid rule file : {}", error),
            Self::MissingField(error) => write!(f, "Missing field : {}", error),
            Self::BadContextRegex(error) => write!(f, "{}", error),
            Self::ParseConfiguration(error) => write!(f, "Error reading files : {}", error),
        }
    }
}

impl From<regex::Error> for RuleLoadError {
    fn from(error: regex::Error) -> Self {
        Self::BadContextRegex(error)
    }
}

impl From<std::io::Error> for RuleLoadError {
    fn from(error: std::io::Error) -> Self {
        Self::ParseConfiguration(error)
    }
}

impl Error for RuleLoadError {}

/// Which rule table family applies : names of different origins follow
/// different orthographic conventions.
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, Sequence,
)]
pub enum NameType {
    /// Ashkenazi Jewish names.
    #[serde(rename = "ash")]
    Ashkenazic,
    /// Any name.
    #[serde(rename = "gen")]
    Generic,
    /// Sephardi Jewish names.
    #[serde(rename = "sep")]
    Sephardic,
}

impl NameType {
    /// Name of the rule data subdirectory of this name type.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Ashkenazic => "Ashkenazic",
            Self::Generic => "Generic",
            Self::Sephardic => "Sephardic",
        }
    }

    /// Name particles that, as the first word of a name, are not encoded on
    /// their own.
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Ashkenazic => &ASHKENAZIC_PREFIXES,
            Self::Generic => &GENERIC_PREFIXES,
            Self::Sephardic => &SEPHARDIC_PREFIXES,
        }
    }
}

impl Display for NameType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let r = match self {
            Self::Ashkenazic => ASH,
            Self::Generic => GEN,
            Self::Sephardic => SEP,
        };
        write!(f, "{}", r)
    }
}

impl TryFrom<&str> for NameType {
    type Error = RuleLoadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            ASH => Ok(Self::Ashkenazic),
            GEN => Ok(Self::Generic),
            SEP => Ok(Self::Sephardic),
            _ => Err(RuleLoadError::InvalidFormat(format!(
                "Unknown name type {}",
                value
            ))),
        }
    }
}

/// Accuracy of an encode.
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, Sequence,
)]
pub enum Accuracy {
    /// Approximate rules. They lead to the largest number of phonetic
    /// interpretations.
    #[serde(rename = "approx")]
    Approx,
    /// Exact rules. They lead to the minimum number of phonetic
    /// interpretations.
    #[serde(rename = "exact")]
    Exact,
}

impl Display for Accuracy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let r = match self {
            Self::Approx => "approx",
            Self::Exact => "exact",
        };
        write!(f, "{}", r)
    }
}

/// The loaded rule data : language detection rules and rewrite rule tables
/// of every name type. Immutable once built, it can be shared freely across
/// threads and [BeiderMorse] instances.
#[derive(Debug)]
pub struct ConfigFiles {
    langs: Langs,
    rules: Rules,
}

impl ConfigFiles {
    /// Load a rule data directory. It must contain one subdirectory per
    /// name type (`Generic`, `Ashkenazic`, `Sephardic`), each with a
    /// `language_rules.json`, a `rules_any.json` and any number of optional
    /// `rules_<language>.json`, `approx_*.json` and `exact_*.json` files.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), bmpm::PhoneticError> {
    /// use std::path::PathBuf;
    ///
    /// use bmpm::ConfigFiles;
    ///
    /// let config_files = ConfigFiles::new(&PathBuf::from("./Data"))?;
    /// #   Ok(())
    /// # }
    /// ```
    pub fn new(directory: &Path) -> Result<Self, PhoneticError> {
        Ok(Self {
            langs: Langs::new(directory)?,
            rules: Rules::new(directory)?,
        })
    }
}

#[cfg(feature = "embedded_bm")]
impl Default for ConfigFiles {
    fn default() -> Self {
        Self {
            langs: Langs::default(),
            rules: Rules::default(),
        }
    }
}

/// This is a builder for [BeiderMorse].
///
/// Defaults are [NameType::Generic] and [Accuracy::Approx].
#[derive(Clone, Copy, Debug)]
pub struct BeiderMorseBuilder<'a> {
    config_files: &'a ConfigFiles,
    name_type: NameType,
    accuracy: Accuracy,
}

impl<'a> BeiderMorseBuilder<'a> {
    /// Create a builder over loaded rule data.
    pub fn new(config_files: &'a ConfigFiles) -> Self {
        Self {
            config_files,
            name_type: NameType::Generic,
            accuracy: Accuracy::Approx,
        }
    }

    /// Set the name type.
    pub fn name_type(mut self, name_type: NameType) -> Self {
        self.name_type = name_type;
        self
    }

    /// Set the accuracy.
    pub fn accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Construct the encoder.
    pub fn build(&self) -> BeiderMorse<'a> {
        BeiderMorse {
            engine: PhoneticEngine {
                langs: &self.config_files.langs,
                rules: &self.config_files.rules,
                name_type: self.name_type,
                accuracy: self.accuracy,
            },
        }
    }
}

/// The Beider-Morse encoder.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), bmpm::PhoneticError> {
/// use std::path::PathBuf;
///
/// use bmpm::{BeiderMorseBuilder, ConfigFiles};
///
/// let config_files = ConfigFiles::new(&PathBuf::from("./Data"))?;
/// let encoder = BeiderMorseBuilder::new(&config_files).build();
///
/// assert_eq!(encoder.try_encode("Smith")?, "(smit|zmit)");
/// #   Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BeiderMorse<'a> {
    engine: PhoneticEngine<'a>,
}

impl BeiderMorse<'_> {
    /// Encode a name into its phonetic form. An input that is empty or
    /// whitespace only yields `""`.
    ///
    /// # Errors
    ///
    /// [PhoneticError::InputTooLong] past [MAX_INPUT_LENGTH] codepoints.
    pub fn try_encode(&self, value: &str) -> Result<String, PhoneticError> {
        match input::prepare(value, self.engine.name_type) {
            Ok(prepared) => Ok(self.engine.encode(&prepared)),
            Err(PhoneticError::EmptyInput) => Ok(String::new()),
            Err(error) => Err(error),
        }
    }

    /// [BeiderMorse::try_encode] with a caller supplied language mask in
    /// place of language detection.
    pub fn try_encode_with_mask(
        &self,
        value: &str,
        mask: LanguageMask,
    ) -> Result<String, PhoneticError> {
        match input::prepare(value, self.engine.name_type) {
            Ok(prepared) => Ok(self.engine.encode_with_mask(&prepared, mask)),
            Err(PhoneticError::EmptyInput) => Ok(String::new()),
            Err(error) => Err(error),
        }
    }

    /// [BeiderMorse::try_encode] for raw bytes. Besides UTF-8 input,
    /// ISO-8859-1 and Windows-1252 are recognized.
    ///
    /// # Errors
    ///
    /// [PhoneticError::InvalidEncoding] on bytes no candidate encoding can
    /// decode, plus everything [BeiderMorse::try_encode] can raise.
    pub fn try_encode_bytes(&self, value: &[u8]) -> Result<String, PhoneticError> {
        match input::prepare_bytes(value, self.engine.name_type) {
            Ok(prepared) => Ok(self.engine.encode(&prepared)),
            Err(PhoneticError::EmptyInput) => Ok(String::new()),
            Err(error) => Err(error),
        }
    }

    /// Encode a name and expand the result into plain alternatives, with
    /// language attributes stripped.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), bmpm::PhoneticError> {
    /// use std::path::PathBuf;
    ///
    /// use bmpm::{BeiderMorseBuilder, ConfigFiles};
    ///
    /// let config_files = ConfigFiles::new(&PathBuf::from("./Data"))?;
    /// let encoder = BeiderMorseBuilder::new(&config_files).build();
    ///
    /// assert_eq!(encoder.encode_to_vec("Smith")?, vec!["smit", "zmit"]);
    /// #   Ok(())
    /// # }
    /// ```
    pub fn encode_to_vec(&self, value: &str) -> Result<Vec<String>, PhoneticError> {
        let phonetic = self.try_encode(value)?;
        Ok(phoneme::expand(&phonetic)
            .iter()
            .map(|alternative| strip_attrs(alternative))
            .filter(|alternative| !alternative.is_empty())
            .collect())
    }

    /// The detected language mask of a name.
    pub fn detect(&self, value: &str) -> Result<LanguageMask, PhoneticError> {
        let prepared = input::prepare(value, self.engine.name_type)?;
        Ok(self.engine.detect(&prepared))
    }

    /// The detected languages of a name.
    pub fn detect_languages(&self, value: &str) -> Result<Vec<Language>, PhoneticError> {
        Ok(self
            .detect(value)?
            .decode(self.engine.name_type))
    }

    /// The first concrete detected language of a name, [Language::Any] when
    /// detection narrows down to nothing more specific.
    pub fn detect_primary(&self, value: &str) -> Result<Language, PhoneticError> {
        Ok(self
            .detect_languages(value)?
            .into_iter()
            .find(|language| *language != Language::Any)
            .unwrap_or(Language::Any))
    }
}

impl Encoder for BeiderMorse<'_> {
    fn encode(&self, s: &str) -> String {
        self.try_encode(s).unwrap_or_default()
    }
}
