use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use enum_iterator::{all, Sequence};
use serde::Deserialize;

use crate::beider_morse::context::{ContextMatcher, ContextSide};
use crate::beider_morse::{Accuracy, Language, LanguageMask, NameType, RuleLoadError};

/// Which table family a rule file belongs to. [TableKind::Main] holds the
/// main rewrite rules, the other two the final rules of each accuracy.
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Sequence,
)]
pub(crate) enum TableKind {
    Main,
    Approx,
    Exact,
}

impl From<Accuracy> for TableKind {
    fn from(accuracy: Accuracy) -> Self {
        match accuracy {
            Accuracy::Approx => Self::Approx,
            Accuracy::Exact => Self::Exact,
        }
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // File name prefixes.
        let prefix = match self {
            Self::Main => "rules",
            Self::Approx => "approx",
            Self::Exact => "exact",
        };
        write!(f, "{}", prefix)
    }
}

/// How an optional per rule language mask is tested against the context
/// mask of the running encode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum LogicalOp {
    /// At least one common language.
    #[default]
    Any,
    /// Every language of the rule mask.
    All,
}

/// A rewrite rule. The pattern is a literal codepoint sequence, contexts are
/// compiled once at load time.
#[derive(Clone, Debug)]
pub(crate) struct Rule {
    pattern: String,
    left_context: ContextMatcher,
    right_context: ContextMatcher,
    phonetic: String,
    languages: Option<LanguageMask>,
    logical_op: LogicalOp,
}

impl Rule {
    /// Pattern and both contexts hold at byte position `index` of `input`.
    pub fn matches_at(&self, input: &str, index: usize) -> bool {
        let remainder = &input[index..];
        if !remainder.starts_with(self.pattern.as_str()) {
            return false;
        }
        let end = index + self.pattern.len();
        self.right_context.is_match(&input[end..]) && self.left_context.is_match(&input[..index])
    }

    /// Language predicate against the context mask.
    pub fn applies_to(&self, mask: LanguageMask) -> bool {
        match self.languages {
            None => true,
            Some(languages) => match self.logical_op {
                LogicalOp::Any => mask.intersects(languages),
                LogicalOp::All => mask.contains(languages),
            },
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn phonetic(&self) -> &str {
        &self.phonetic
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "left context = {}, pattern = {}, right context = {} - phonetic : {}",
            self.left_context, self.pattern, self.right_context, self.phonetic
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleJson {
    pattern: String,
    phonetic: String,
    #[serde(default)]
    left_context: String,
    #[serde(default)]
    right_context: String,
    #[serde(default)]
    language_mask: Option<u64>,
    #[serde(default)]
    logical_op: LogicalOp,
}

/// An ordered rule table, bucketed by the first char of each pattern. A rule
/// can only fire where the input carries its first char, so bucketing keeps
/// the first match semantics of the flat ordering.
#[derive(Clone, Debug, Default)]
pub(crate) struct RuleTable {
    name: Option<String>,
    buckets: BTreeMap<char, Vec<Rule>>,
    len: usize,
}

impl RuleTable {
    pub fn rules_for(&self, ch: char) -> Option<&[Rule]> {
        self.buckets.get(&ch).map(|rules| rules.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Display for RuleTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} rules)",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.len
        )
    }
}

/// Parse a rule file of the JSON format described in the crate
/// documentation : an object with an optional `name` and a mandatory
/// `rules` array.
pub(crate) fn parse_table(content: &str, filename: &str) -> Result<RuleTable, RuleLoadError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|error| RuleLoadError::InvalidFormat(format!("{filename} : {error}")))?;

    let name = value
        .get("name")
        .and_then(|name| name.as_str())
        .map(|name| name.to_string());
    let rules = value
        .get("rules")
        .ok_or_else(|| RuleLoadError::MissingField(format!("{filename} : rules")))?;
    let rules: Vec<RuleJson> = serde_json::from_value(rules.clone())
        .map_err(|error| RuleLoadError::InvalidFormat(format!("{filename} : {error}")))?;

    let mut buckets: BTreeMap<char, Vec<Rule>> = BTreeMap::new();
    let mut len = 0usize;
    for rule in rules {
        let first = rule.pattern.chars().next().ok_or_else(|| {
            RuleLoadError::InvalidFormat(format!("{filename} : empty pattern"))
        })?;
        let rule = Rule {
            left_context: ContextMatcher::compile(&rule.left_context, ContextSide::Left)?,
            right_context: ContextMatcher::compile(&rule.right_context, ContextSide::Right)?,
            pattern: rule.pattern,
            phonetic: rule.phonetic,
            languages: rule.language_mask.map(LanguageMask::new),
            logical_op: rule.logical_op,
        };
        buckets.entry(first).or_default().push(rule);
        len += 1;
    }

    Ok(RuleTable { name, buckets, len })
}

struct Resolver {
    path: Option<PathBuf>,
}

impl Resolver {
    /// Content of `<NameTypeDir>/<filename>`, [None](Option::None) when the
    /// file doesn't exist (most rule files are optional).
    fn resolve(
        &self,
        name_type: NameType,
        filename: &str,
    ) -> Result<Option<String>, RuleLoadError> {
        match &self.path {
            Some(folder) => {
                let path = folder.join(name_type.directory()).join(filename);
                match std::fs::read_to_string(path) {
                    Ok(content) => Ok(Some(content)),
                    Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(error) => Err(RuleLoadError::ParseConfiguration(error)),
                }
            }
            #[cfg(feature = "embedded_bm")]
            None => Ok(embedded::RULES
                .get(format!("{}/{}", name_type.directory(), filename).as_str())
                .map(|content| content.to_string())),
            #[cfg(not(feature = "embedded_bm"))]
            None => Err(RuleLoadError::FileNotFound(
                "Missing embedded configuration. Use corresponding feature".to_string(),
            )),
        }
    }
}

/// Every rule table of every name type, keyed by
/// `(name type, table kind, language)` where the language `None` designates
/// the common final table of the kind.
#[derive(Debug)]
#[cfg_attr(not(feature = "embedded_bm"), derive(Default))]
pub(crate) struct Rules {
    rules: BTreeMap<(NameType, TableKind, Option<Language>), RuleTable>,
}

impl Rules {
    pub fn new(directory: &Path) -> Result<Self, RuleLoadError> {
        let resolver = Resolver {
            path: Some(directory.to_path_buf()),
        };
        build_rules(&resolver)
    }

    pub fn table(
        &self,
        name_type: NameType,
        kind: TableKind,
        language: Option<Language>,
    ) -> Option<&RuleTable> {
        self.rules.get(&(name_type, kind, language))
    }

    /// The main table of `language`, falling back to the `any` table when
    /// the language has no dedicated file.
    pub fn main_table(&self, name_type: NameType, language: Language) -> Option<&RuleTable> {
        self.table(name_type, TableKind::Main, Some(language))
            .or_else(|| self.table(name_type, TableKind::Main, Some(Language::Any)))
    }
}

fn build_rules(resolver: &Resolver) -> Result<Rules, RuleLoadError> {
    let mut rules: BTreeMap<(NameType, TableKind, Option<Language>), RuleTable> = BTreeMap::new();

    for name_type in all::<NameType>() {
        for kind in all::<TableKind>() {
            for language in name_type.languages() {
                let filename = format!("{}_{}.json", kind, language);
                match resolver.resolve(name_type, &filename)? {
                    Some(content) => {
                        let table = parse_table(&content, &filename)?;
                        rules.insert((name_type, kind, Some(*language)), table);
                    }
                    // The `any` main table is the one file a name type can't
                    // work without.
                    None if kind == TableKind::Main && *language == Language::Any => {
                        return Err(RuleLoadError::FileNotFound(format!(
                            "{}/{}",
                            name_type.directory(),
                            filename
                        )));
                    }
                    None => {}
                }
            }
            if kind != TableKind::Main {
                let filename = format!("{}_common.json", kind);
                if let Some(content) = resolver.resolve(name_type, &filename)? {
                    let table = parse_table(&content, &filename)?;
                    rules.insert((name_type, kind, None), table);
                }
            }
        }
    }

    Ok(Rules { rules })
}

/// Embedded copies of the `Data` directory and a [Default] implementation
/// for [Rules].
#[cfg(feature = "embedded_bm")]
mod embedded {
    use std::collections::BTreeMap;

    use super::*;

    lazy_static! {
        pub static ref RULES: BTreeMap<&'static str, &'static str> = BTreeMap::from([
            (
                "Generic/rules_any.json",
                include_str!("../../Data/Generic/rules_any.json")
            ),
            (
                "Generic/approx_common.json",
                include_str!("../../Data/Generic/approx_common.json")
            ),
            (
                "Generic/approx_any.json",
                include_str!("../../Data/Generic/approx_any.json")
            ),
            (
                "Generic/approx_german.json",
                include_str!("../../Data/Generic/approx_german.json")
            ),
            (
                "Generic/exact_common.json",
                include_str!("../../Data/Generic/exact_common.json")
            ),
            (
                "Generic/exact_any.json",
                include_str!("../../Data/Generic/exact_any.json")
            ),
            (
                "Ashkenazic/rules_any.json",
                include_str!("../../Data/Ashkenazic/rules_any.json")
            ),
            (
                "Ashkenazic/approx_common.json",
                include_str!("../../Data/Ashkenazic/approx_common.json")
            ),
            (
                "Ashkenazic/approx_any.json",
                include_str!("../../Data/Ashkenazic/approx_any.json")
            ),
            (
                "Ashkenazic/exact_common.json",
                include_str!("../../Data/Ashkenazic/exact_common.json")
            ),
            (
                "Ashkenazic/exact_any.json",
                include_str!("../../Data/Ashkenazic/exact_any.json")
            ),
            (
                "Sephardic/rules_any.json",
                include_str!("../../Data/Sephardic/rules_any.json")
            ),
            (
                "Sephardic/approx_common.json",
                include_str!("../../Data/Sephardic/approx_common.json")
            ),
            (
                "Sephardic/approx_any.json",
                include_str!("../../Data/Sephardic/approx_any.json")
            ),
            (
                "Sephardic/exact_common.json",
                include_str!("../../Data/Sephardic/exact_common.json")
            ),
            (
                "Sephardic/exact_any.json",
                include_str!("../../Data/Sephardic/exact_any.json")
            ),
        ]);
    }

    impl Default for Rules {
        fn default() -> Self {
            let resolver = Resolver { path: None };
            // The embedded files are known to parse.
            build_rules(&resolver).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_table_defaults() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "name": "test", "rules": [ { "pattern": "sch", "phonetic": "s" } ] }"#,
            "test.json",
        )?;

        assert!(!table.is_empty());
        assert_eq!(table.to_string(), "test (1 rules)");
        let rules = table.rules_for('s').unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern(), "sch");
        assert_eq!(rules[0].phonetic(), "s");
        assert!(rules[0].applies_to(LanguageMask::ANY));

        Ok(())
    }

    #[test]
    fn test_parse_table_missing_rules_field() {
        let result = parse_table(r#"{ "name": "test" }"#, "test.json");

        assert!(matches!(result, Err(RuleLoadError::MissingField(_))));
    }

    #[test]
    fn test_parse_table_invalid_json() {
        let result = parse_table("not json", "test.json");

        assert!(matches!(result, Err(RuleLoadError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_table_empty_pattern() {
        let result = parse_table(
            r#"{ "rules": [ { "pattern": "", "phonetic": "s" } ] }"#,
            "test.json",
        );

        assert!(matches!(result, Err(RuleLoadError::InvalidFormat(_))));
    }

    #[test]
    fn test_language_predicate() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [
                { "pattern": "sz", "phonetic": "s", "languageMask": 10240 },
                { "pattern": "cs", "phonetic": "ts", "languageMask": 10240, "logicalOp": "ALL" }
            ] }"#,
            "test.json",
        )?;

        let any_rule = &table.rules_for('s').unwrap()[0];
        let all_rule = &table.rules_for('c').unwrap()[0];

        // 8192 = polish alone, 10240 = polish|hungarian.
        assert!(any_rule.applies_to(LanguageMask::new(8192)));
        assert!(!any_rule.applies_to(LanguageMask::new(128)));
        assert!(!all_rule.applies_to(LanguageMask::new(8192)));
        assert!(all_rule.applies_to(LanguageMask::new(10240)));

        Ok(())
    }

    #[test]
    fn test_matches_at_with_contexts() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [
                { "pattern": "c", "rightContext": "[ei]", "phonetic": "s" },
                { "pattern": "h", "leftContext": "[aeiou]", "phonetic": "" }
            ] }"#,
            "test.json",
        )?;

        let c_rule = &table.rules_for('c').unwrap()[0];
        assert!(c_rule.matches_at("ce", 0));
        assert!(!c_rule.matches_at("co", 0));

        let h_rule = &table.rules_for('h').unwrap()[0];
        assert!(h_rule.matches_at("ohe", 1));
        assert!(!h_rule.matches_at("he", 0));

        Ok(())
    }

    #[test]
    fn test_matches_at_multibyte_pattern() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [ { "pattern": "ü", "phonetic": "u" } ] }"#,
            "test.json",
        )?;

        let rule = &table.rules_for('ü').unwrap()[0];
        assert!(rule.matches_at("müller", 1));
        assert!(!rule.matches_at("muller", 1));

        Ok(())
    }

    #[test]
    fn test_rules_from_path() -> Result<(), RuleLoadError> {
        let path = PathBuf::from("./Data");
        let rules = Rules::new(&path)?;

        for name_type in all::<NameType>() {
            assert!(
                rules
                    .table(name_type, TableKind::Main, Some(Language::Any))
                    .is_some(),
                "Error for {name_type}"
            );
            assert!(rules.table(name_type, TableKind::Approx, None).is_some());
            assert!(rules.table(name_type, TableKind::Exact, None).is_some());
        }

        // No dedicated english main table : fall back to any.
        let fallback = rules.main_table(NameType::Generic, Language::English);
        assert!(fallback.is_some());

        // approx_german.json is shipped for generic.
        assert!(rules
            .table(NameType::Generic, TableKind::Approx, Some(Language::German))
            .is_some());

        Ok(())
    }

    #[test]
    fn test_rules_missing_directory() {
        let path = PathBuf::from("./does-not-exist");
        let result = Rules::new(&path);

        assert!(matches!(result, Err(RuleLoadError::FileNotFound(_))));
    }
}
