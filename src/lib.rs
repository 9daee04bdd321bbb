/*
 * Licensed to the Apache Software Foundation (ASF) under one or more
 * contributor license agreements.  See the NOTICE file distributed with
 * this work for additional information regarding copyright ownership.
 * The ASF licenses this file to You under the Apache License, Version 2.0
 * (the "License"); you may not use this file except in compliance with
 * the License.  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */
//! This library contains phonetic matching algorithms for personal names :
//!
//! * [BeiderMorse] : the [Beider-Morse Phonetic Matching](https://stevemorse.org/phoneticinfo.htm)
//!   algorithm. It produces language-annotated phonetic encodings of a name that
//!   can be compared across spellings, languages and romanizations.
//! * [DaitchMokotoffSoundex] : see [Wikipedia](https://en.wikipedia.org/wiki/Daitch%E2%80%93Mokotoff_Soundex).
//!   It produces one or more 6 digit codes.
//!
//! Both algorithms are rule driven. Rules are data, not code : they are loaded
//! from a `Data` directory (see [ConfigFiles] and [DaitchMokotoffSoundexBuilder])
//! or embedded with the corresponding features.
//!
//! ## Features
#![doc = document_features::document_features!()]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
#[macro_use]
extern crate lazy_static;

use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

pub use crate::beider_morse::{
    Accuracy, BeiderMorse, BeiderMorseBuilder, ConfigFiles, Language, LanguageMask, NameType,
    RuleLoadError, MAX_INPUT_LENGTH,
};
pub use crate::daitch_mokotoff::{DaitchMokotoffSoundex, DaitchMokotoffSoundexBuilder};

mod beider_morse;
mod daitch_mokotoff;
mod helper;
mod rules_parser;

/// Errors
#[derive(Debug)]
pub enum PhoneticError {
    /// This variant is raised when the input is empty or contains only
    /// whitespaces.
    EmptyInput,
    /// This variant is raised when input bytes are neither UTF-8 nor one of
    /// the supported legacy encodings.
    InvalidEncoding(String),
    /// This variant is raised when the normalized input exceeds
    /// [MAX_INPUT_LENGTH] codepoints.
    InputTooLong(usize),
    /// This variant is raised when Beider-Morse rule files can't be loaded.
    RuleLoad(RuleLoadError),
    /// This variant is raised when there is an error in the rule
    /// file of Daitch Mokotoff soundex.
    ParseRuleError(String),
}

impl fmt::Display for PhoneticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "Input is empty or blank"),
            Self::InvalidEncoding(error) => write!(f, "Unsupported input encoding : {}", error),
            Self::InputTooLong(length) => write!(
                f,
                "Input is {} codepoints long, maximum is {}",
                length, MAX_INPUT_LENGTH
            ),
            Self::RuleLoad(error) => write!(f, "Error loading rule files : {}", error),
            Self::ParseRuleError(error) => write!(f, "Error parsing rule file : {}", error),
        }
    }
}

impl From<RuleLoadError> for PhoneticError {
    fn from(error: RuleLoadError) -> Self {
        Self::RuleLoad(error)
    }
}

impl Error for PhoneticError {}

/// This trait represents a phonetic algorithm.
pub trait Encoder {
    /// This method convert a string into its code.
    ///
    /// # Parameter
    ///
    /// * `s` : string to encode.
    ///
    /// # Return
    ///
    /// String encoded.
    ///
    /// # Example
    ///
    /// Example using [DaitchMokotoffSoundex].
    ///
    /// ```rust
    /// # fn main() -> Result<(), bmpm::PhoneticError> {
    /// use bmpm::{DaitchMokotoffSoundexBuilder, Encoder};
    ///
    /// const RULES: &str = include_str!("../Data/dmrules.txt");
    ///
    /// let encoder = DaitchMokotoffSoundexBuilder::with_rules(RULES).build()?;
    ///
    /// assert_eq!(encoder.encode("Thompson"), "367460");
    /// #   Ok(())
    /// # }
    /// ```
    fn encode(&self, s: &str) -> String;

    /// This method check that two strings have the same code.
    ///
    /// # Parameters
    ///
    /// * `first` : first string.
    /// * `second` : second string.
    ///
    /// # Return
    ///
    /// Return `true` if both strings have the same code, false otherwise.
    ///
    /// # Example
    ///
    /// Example with [DaitchMokotoffSoundex]
    ///
    /// ```rust
    /// # fn main() -> Result<(), bmpm::PhoneticError> {
    /// use bmpm::{DaitchMokotoffSoundexBuilder, Encoder};
    ///
    /// const RULES: &str = include_str!("../Data/dmrules.txt");
    ///
    /// let encoder = DaitchMokotoffSoundexBuilder::with_rules(RULES).build()?;
    ///
    /// assert!(encoder.is_encoded_equals("Lewinsky", "Levinski"));
    /// assert!(!encoder.is_encoded_equals("Peter", "Stevenson"));
    /// #   Ok(())
    /// # }
    /// ```
    fn is_encoded_equals(&self, first: &str, second: &str) -> bool {
        let f = self.encode(first);
        let s = self.encode(second);

        f == s
    }
}
