use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

use enum_iterator::all;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::beider_morse::{LanguageMask, NameType, RuleLoadError};
use crate::rules_parser::delimited_pattern;

const LANGUAGE_RULES_FILE: &str = "language_rules.json";

/// One language detection rule : when `pattern` matches the input, the set
/// of candidate languages is narrowed, either by intersecting with
/// `languages` (accept) or by removing `languages` (reject).
#[derive(Clone, Debug)]
struct DetectRule {
    pattern: Regex,
    languages: LanguageMask,
    accept: bool,
}

impl DetectRule {
    fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

impl Display for DetectRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" {} {}",
            self.pattern, self.languages, self.accept
        )
    }
}

#[derive(Deserialize)]
struct DetectRuleJson {
    pattern: String,
    languages: u64,
    accept: bool,
}

#[derive(Deserialize)]
struct DetectFileJson {
    rules: Vec<DetectRuleJson>,
}

/// Language detector for one name type.
#[derive(Clone, Debug)]
pub(crate) struct Lang {
    name_type: NameType,
    rules: Vec<DetectRule>,
}

impl Lang {
    /// Narrow the universe of the name type with every matching rule and
    /// return the remaining mask. When every candidate has been cleared,
    /// the result is [LanguageMask::ANY].
    pub fn detect(&self, input: &str) -> LanguageMask {
        let mut remaining = self.name_type.universe();
        for rule in &self.rules {
            if rule.matches(input) {
                remaining = if rule.accept {
                    remaining & rule.languages
                } else {
                    remaining & rule.languages.complement(self.name_type)
                };
            }
        }

        if remaining.is_empty() {
            LanguageMask::ANY
        } else {
            remaining
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, RuleLoadError> {
    let (inner, flags) = match delimited_pattern()(pattern) {
        Ok(("", parts)) => parts,
        _ => {
            return Err(RuleLoadError::InvalidFormat(format!(
                "language rule pattern {pattern} is not of the form /regex/flags"
            )))
        }
    };
    // The unicode flag is always on, `u` is accepted and ignored.
    let regex = RegexBuilder::new(inner)
        .case_insensitive(flags.contains('i'))
        .build()?;
    Ok(regex)
}

fn parse_lang(
    name_type: NameType,
    content: &str,
    filename: &str,
) -> Result<Lang, RuleLoadError> {
    let file: DetectFileJson = serde_json::from_str(content)
        .map_err(|error| RuleLoadError::InvalidFormat(format!("{filename} : {error}")))?;

    let mut rules: Vec<DetectRule> = Vec::with_capacity(file.rules.len());
    for rule in file.rules {
        rules.push(DetectRule {
            pattern: compile_pattern(&rule.pattern)?,
            languages: LanguageMask::new(rule.languages),
            accept: rule.accept,
        });
    }

    Ok(Lang { name_type, rules })
}

/// The [Lang] of every name type.
#[derive(Clone, Debug)]
pub(crate) struct Langs {
    langs: BTreeMap<NameType, Lang>,
}

impl Langs {
    pub fn new(directory: &Path) -> Result<Self, RuleLoadError> {
        let mut langs: BTreeMap<NameType, Lang> = BTreeMap::new();

        for name_type in all::<NameType>() {
            let filename = directory
                .join(name_type.directory())
                .join(LANGUAGE_RULES_FILE);
            let content = std::fs::read_to_string(&filename).map_err(|error| {
                if error.kind() == std::io::ErrorKind::NotFound {
                    RuleLoadError::FileNotFound(filename.to_string_lossy().to_string())
                } else {
                    RuleLoadError::ParseConfiguration(error)
                }
            })?;
            let lang = parse_lang(name_type, &content, &filename.to_string_lossy())?;
            langs.insert(name_type, lang);
        }

        Ok(Self { langs })
    }

    pub fn get(&self, name_type: &NameType) -> Option<&Lang> {
        self.langs.get(name_type)
    }
}

#[cfg(feature = "embedded_bm")]
impl Default for Langs {
    fn default() -> Self {
        let mut langs: BTreeMap<NameType, Lang> = BTreeMap::new();
        for name_type in all::<NameType>() {
            let content = match name_type {
                NameType::Generic => include_str!("../../Data/Generic/language_rules.json"),
                NameType::Ashkenazic => include_str!("../../Data/Ashkenazic/language_rules.json"),
                NameType::Sephardic => include_str!("../../Data/Sephardic/language_rules.json"),
            };
            // The embedded files are known to parse.
            let lang = parse_lang(name_type, content, LANGUAGE_RULES_FILE).unwrap();
            langs.insert(name_type, lang);
        }

        Self { langs }
    }
}
