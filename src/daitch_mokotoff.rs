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
use std::collections::BTreeMap;

use crate::helper::is_vowel;
use crate::rules_parser::{end_of_line, folding, multiline_comment, quadruplet};
use crate::{Encoder, PhoneticError};

#[cfg(feature = "embedded_dm")]
const DEFAULT_RULES: &str = include_str!("../Data/dmrules.txt");

/// Length of a Daitch-Mokotoff code.
const CODE_LENGTH: usize = 6;

/// Sentinel code : emit nothing this step and reset the last code.
const NO_CODE: &str = "999";

/// Characters that split an input into independently encoded parts.
const PART_SEPARATORS: [char; 3] = [' ', ',', '/'];

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
struct Branch {
    code: String,
    last_code: String,
}

impl Default for Branch {
    fn default() -> Self {
        Self {
            code: String::with_capacity(CODE_LENGTH),
            last_code: String::new(),
        }
    }
}

impl Branch {
    /// Apply one step's code : [NO_CODE] emits nothing and resets the last
    /// code, a code equal to the last one is not repeated.
    fn apply(&mut self, code: &str) {
        if code == NO_CODE {
            self.last_code.clear();
            return;
        }
        if self.last_code != code {
            self.code.push_str(code);
        }
        self.last_code.clear();
        self.last_code.push_str(code);
    }

    /// Truncate or right-pad the accumulated digits to [CODE_LENGTH].
    fn finish(mut self) -> String {
        self.code.truncate(CODE_LENGTH);
        while self.code.len() < CODE_LENGTH {
            self.code.push('0');
        }
        self.code
    }
}

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
struct Rule {
    pattern: String,
    at_start: Vec<String>,
    before_vowel: Vec<String>,
    other: Vec<String>,
}

impl Rule {
    fn parse_codes(part: &str) -> Vec<String> {
        part.split('|').map(|code| code.to_string()).collect()
    }

    fn matches(&self, context: &str) -> bool {
        context.starts_with(&self.pattern)
    }

    /// Pick the code column : start of the word, before a vowel (`aeioujy`),
    /// or anywhere else.
    fn codes(&self, context: &str, at_start: bool) -> &[String] {
        if at_start {
            return &self.at_start;
        }
        let next = context[self.pattern.len()..].chars().next();
        if is_vowel(next, true) {
            &self.before_vowel
        } else {
            &self.other
        }
    }
}

impl TryFrom<(&str, &str, &str, &str)> for Rule {
    type Error = PhoneticError;

    fn try_from(
        (pattern, at_start, before_vowel, other): (&str, &str, &str, &str),
    ) -> Result<Self, Self::Error> {
        if pattern.is_empty() {
            return Err(PhoneticError::ParseRuleError(
                "Empty pattern".to_string(),
            ));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            at_start: Rule::parse_codes(at_start),
            before_vowel: Rule::parse_codes(before_vowel),
            other: Rule::parse_codes(other),
        })
    }
}

/// This is the [Daitch-Mokotoff soundex](https://en.wikipedia.org/wiki/Daitch%E2%80%93Mokotoff_Soundex) implementation.
///
/// An input is folded to unaccented lowercase letters, split into parts on
/// spaces, commas and slashes, and each part encoded into 6 digit codes by
/// a longest-match pattern table. A handful of ambiguous patterns (`rz`,
/// `ch`, `ck`, `c`, `j` in the default table) carry an alternate code and
/// double the branches, so one part can produce several codes. The result
/// is the space joined, deduplicated list of codes of every part.
///
/// A rule is either in the form of :
/// * `char`=`char` (a char is converted into another char, this is used for
///   folding accented letters)
/// * "`pattern`" "`code_at_start`" "`code_before_vowel`" "`code_elsewhere`"
///     * `pattern` : a string to match
///     * `code_at_start` : the code when `pattern` is at the start of a part.
///     * `code_before_vowel` : the code when `pattern` is followed by a vowel.
///     * `code_elsewhere` : the code for other cases.
///   A code can be `999`, meaning "emit nothing". To support branching any
///   code column can be in the form of `code|alternate`.
///
/// Rules are separated by `\n`. Parsing supports single line comments using
/// `//` and multiline comments using `/* ... */`. Note that multiline
/// comments must start at the beginning of a line.
///
/// # Example :
///
/// ```rust
/// # fn main() -> Result<(), bmpm::PhoneticError> {
/// use bmpm::DaitchMokotoffSoundexBuilder;
///
/// let rules = "à=a // folding
/// \"sh\" \"4\" \"4\" \"4\"
/// \"s\" \"4\" \"4\" \"4\"
/// \"a\" \"0\" \"999\" \"999\"";
///
/// let encoder = DaitchMokotoffSoundexBuilder::with_rules(rules).build()?;
///
/// assert_eq!(encoder.soundex("Sasha"), "440000");
/// #   Ok(())
/// # }
/// ```
///
/// A [Default] implementation with the rules of `Data/dmrules.txt` is
/// provided when the feature `embedded_dm` is enabled.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct DaitchMokotoffSoundex {
    rules: BTreeMap<char, Vec<Rule>>,
    folding: BTreeMap<char, char>,
}

#[cfg(feature = "embedded_dm")]
impl Default for DaitchMokotoffSoundex {
    fn default() -> Self {
        // The embedded rules are known to parse.
        DaitchMokotoffSoundexBuilder::default().build().unwrap()
    }
}

impl DaitchMokotoffSoundex {
    /// Encode a string. Every part of the input produces one or more 6
    /// digit codes ; the codes are deduplicated preserving order and joined
    /// with a space. An input without any encodable letter yields `""`.
    ///
    /// # Example :
    ///
    /// ```rust
    /// # fn main() -> Result<(), bmpm::PhoneticError> {
    /// use bmpm::DaitchMokotoffSoundexBuilder;
    ///
    /// const RULES: &str = include_str!("../Data/dmrules.txt");
    ///
    /// let encoder = DaitchMokotoffSoundexBuilder::with_rules(RULES).build()?;
    ///
    /// assert_eq!(encoder.soundex("Cohen"), "556000 456000");
    /// #   Ok(())
    /// # }
    /// ```
    pub fn soundex(&self, value: &str) -> String {
        let mut codes: Vec<String> = Vec::new();
        for part in self.split_parts(value) {
            for code in self.encode_part(&part) {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }
        codes.join(" ")
    }

    /// Fold to lowercase letters and cut on the part separators.
    fn split_parts(&self, value: &str) -> Vec<String> {
        let cleaned: String = value
            .chars()
            .filter_map(|ch| {
                if PART_SEPARATORS.contains(&ch) || ch.is_whitespace() {
                    return Some(' ');
                }
                let lower = ch.to_lowercase().next().unwrap_or(ch);
                let folded = *self.folding.get(&lower).unwrap_or(&lower);
                folded.is_alphabetic().then_some(folded)
            })
            .collect();

        cleaned
            .split(' ')
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect()
    }

    fn encode_part(&self, part: &str) -> Vec<String> {
        let mut branches = vec![Branch::default()];
        let mut position = 0;

        while position < part.len() {
            let Some(ch) = part[position..].chars().next() else {
                break;
            };
            let context = &part[position..];
            // Rules of a bucket are sorted by decreasing pattern length :
            // the first match is the longest.
            let rule = self
                .rules
                .get(&ch)
                .and_then(|rules| rules.iter().find(|rule| rule.matches(context)));

            match rule {
                Some(rule) => {
                    let codes = rule.codes(context, position == 0);
                    let mut next_branches: Vec<Branch> = Vec::new();
                    for branch in &branches {
                        for code in codes {
                            let mut next_branch = branch.clone();
                            next_branch.apply(code);
                            if !next_branches.contains(&next_branch) {
                                next_branches.push(next_branch);
                            }
                        }
                    }
                    branches = next_branches;
                    position += rule.pattern.len();
                }
                None => position += ch.len_utf8(),
            }
        }

        let mut codes: Vec<String> = Vec::with_capacity(branches.len());
        for branch in branches {
            let code = branch.finish();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }
}

impl Encoder for DaitchMokotoffSoundex {
    /// Delegate to [DaitchMokotoffSoundex::soundex].
    fn encode(&self, s: &str) -> String {
        self.soundex(s)
    }
}

/// This is a builder for [DaitchMokotoffSoundex].
#[derive(Clone, Copy, Debug)]
pub struct DaitchMokotoffSoundexBuilder<'a> {
    rules: &'a str,
}

/// Create a [DaitchMokotoffSoundexBuilder] with the rules of
/// `Data/dmrules.txt`.
#[cfg(feature = "embedded_dm")]
impl<'a> Default for DaitchMokotoffSoundexBuilder<'a> {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl<'a> DaitchMokotoffSoundexBuilder<'a> {
    /// Create a [DaitchMokotoffSoundexBuilder] with custom rules.
    pub fn with_rules(rules: &'a str) -> Self {
        Self { rules }
    }

    /// Construct a new [DaitchMokotoffSoundex] encoder.
    ///
    /// # Error
    ///
    /// This method returns an error in case it can't parse the rules.
    pub fn build(self) -> Result<DaitchMokotoffSoundex, PhoneticError> {
        let mut rules: BTreeMap<char, Vec<Rule>> = BTreeMap::new();
        let mut folding_rules: BTreeMap<char, char> = BTreeMap::new();
        let mut remains = self.rules;
        let mut line_number: usize = 0;

        while !remains.is_empty() {
            line_number += 1;

            // Parsing tests from more probable to less probable.

            // Try quadruplet rule
            if let Ok((rm, parts)) = quadruplet()(remains) {
                let rule = Rule::try_from(parts)?;
                // There's always at least one char, TryFrom ensures that.
                let ch = rule.pattern.chars().next().unwrap();
                rules.entry(ch).or_default().push(rule);
                remains = rm;
                continue;
            }

            // Try folding rule
            if let Ok((rm, (pattern, replacement))) = folding()(remains) {
                folding_rules.insert(pattern, replacement);
                remains = rm;
                continue;
            }

            // Try single line comment
            if let Ok((rm, _)) = end_of_line()(remains) {
                remains = rm;
                continue;
            }

            // Try multiline comment
            if let Ok((rm, lines)) = multiline_comment()(remains) {
                line_number += lines;
                remains = rm;
                continue;
            }

            // Everything fails, then return an error...
            let line = remains.split('\n').next().unwrap_or(remains);
            return Err(PhoneticError::ParseRuleError(format!(
                "Can't recognize line {} : {}",
                line_number, line
            )));
        }

        // Ordering by pattern length decreasing.
        rules
            .values_mut()
            .for_each(|bucket| bucket.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len())));

        Ok(DaitchMokotoffSoundex {
            rules,
            folding: folding_rules,
        })
    }
}
