use crate::beider_morse::lang::Langs;
use crate::beider_morse::phoneme::{
    concat_compatible, expand, is_dead, merge, normalize_attrs, squash, strip_attrs,
};
use crate::beider_morse::rule::{RuleTable, Rules, TableKind};
use crate::beider_morse::{Accuracy, Language, LanguageMask, NameType};

/// The rewrite engine : one instance per `(name type, accuracy)` pair,
/// borrowing the loaded rule data.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PhoneticEngine<'a> {
    pub langs: &'a Langs,
    pub rules: &'a Rules,
    pub name_type: NameType,
    pub accuracy: Accuracy,
}

/// Scan `input` left to right. At each position the first rule whose
/// pattern, contexts and language predicate hold is fired, and its phonetic
/// is appended under attribute compatibility ; a rule whose concatenation
/// kills every branch is treated as a non match. When nothing fires the
/// position advances one codepoint and emits nothing, which is how residual
/// spaces disappear.
fn apply_rules(input: &str, table: &RuleTable, mask: LanguageMask) -> String {
    let mut phonetic = String::new();
    let mut index = 0;

    while index < input.len() {
        let Some(ch) = input[index..].chars().next() else {
            break;
        };
        let mut pattern_length = 0;
        if let Some(rules) = table.rules_for(ch) {
            for rule in rules {
                if !rule.applies_to(mask) || !rule.matches_at(input, index) {
                    continue;
                }
                match concat_compatible(&phonetic, rule.phonetic(), mask) {
                    Some(next) => {
                        phonetic = next;
                        pattern_length = rule.pattern().len();
                        break;
                    }
                    // Every branch died : try the next rule.
                    None => continue,
                }
            }
        }
        index += if pattern_length > 0 {
            pattern_length
        } else {
            ch.len_utf8()
        };
    }

    phonetic
}

/// One final rules pass. Attributes are first folded into a single trailing
/// `[mask]` per alternative, each alternative is rescanned with `table`
/// (the trailing attribute rides along untouched), and the surviving
/// alternatives are reassembled. With `strip`, attributes are removed from
/// the result, which is what the last pass of the pipeline does.
fn apply_final_rules(
    phonetic: &str,
    table: Option<&RuleTable>,
    mask: LanguageMask,
    strip: bool,
) -> String {
    let table = match table {
        Some(table) if !table.is_empty() => table,
        _ => return phonetic.to_string(),
    };

    let normalized = normalize_attrs(phonetic, false);
    let alternatives: Vec<String> = if normalized.contains('(') {
        expand(&normalized)
    } else {
        normalized.split('|').map(|part| part.to_string()).collect()
    };

    let mut results: Vec<String> = Vec::new();
    for alternative in &alternatives {
        // After normalization the only bracket is a trailing attribute.
        let (text, attribute) = match alternative.find('[') {
            Some(position) => (&alternative[..position], Some(&alternative[position..])),
            None => (alternative.as_str(), None),
        };

        let mut result = apply_rules(text, table, mask);
        if let Some(attribute) = attribute {
            match concat_compatible(&result, attribute, mask) {
                Some(next) => result = next,
                None => continue,
            }
        }

        if strip_attrs(&result).is_empty() || is_dead(&normalize_attrs(&result, false)) {
            continue;
        }
        let key = strip_attrs(&result);
        if !results.iter().any(|existing| strip_attrs(existing) == key) {
            results.push(result);
        }
    }

    let mut joined = results.join("|");
    if strip {
        joined = normalize_attrs(&joined, true);
    }
    if results.len() > 1 {
        format!("({})", joined)
    } else {
        joined
    }
}

impl PhoneticEngine<'_> {
    /// Detected language mask of `input` for this engine's name type.
    pub fn detect(&self, input: &str) -> LanguageMask {
        self.langs
            .get(&self.name_type)
            .map(|lang| lang.detect(input))
            .unwrap_or_else(|| self.name_type.universe())
    }

    /// Encode a single word : main pass with the table of the detected
    /// language, common final pass, language specific final pass, cleanup.
    pub fn encode_word(&self, word: &str, mask: LanguageMask) -> String {
        let mask = if mask.is_empty() {
            LanguageMask::ANY
        } else {
            mask
        };
        let language = mask.single(self.name_type).unwrap_or(Language::Any);
        let kind = TableKind::from(self.accuracy);

        let phonetic = match self.rules.main_table(self.name_type, language) {
            Some(table) => apply_rules(word, table, mask),
            None => String::new(),
        };
        let phonetic = apply_final_rules(
            &phonetic,
            self.rules.table(self.name_type, kind, None),
            mask,
            false,
        );
        let phonetic = apply_final_rules(
            &phonetic,
            self.rules.table(self.name_type, kind, Some(language)),
            mask,
            true,
        );

        squash(&phonetic)
    }

    /// Encode a prepared input, composing multi word names.
    ///
    /// A name with a space is split at the first one. Under
    /// [Accuracy::Exact] the words are simply concatenated. Otherwise the
    /// encodings of the second word alone and of the concatenation are
    /// merged, with the first word's own encoding added in front unless it
    /// is a recognized prefix of the name type.
    pub fn encode(&self, input: &str) -> String {
        let (word1, word2) = match input.split_once(' ') {
            None => {
                return self.encode_word(input, self.detect(input));
            }
            Some(parts) => parts,
        };

        let combined = format!("{}{}", word1, word2);
        if self.accuracy == Accuracy::Exact {
            return self.encode_word(&combined, self.detect(&combined));
        }

        let second = self.encode_word(word2, self.detect(word2));
        let whole = self.encode_word(&combined, self.detect(&combined));
        if self.name_type.prefixes().contains(&word1) {
            merge(&second, &whole)
        } else {
            let first = self.encode_word(word1, self.detect(word1));
            merge(&merge(&first, &second), &whole)
        }
    }

    /// [PhoneticEngine::encode] with a caller supplied language mask instead
    /// of detection.
    pub fn encode_with_mask(&self, input: &str, mask: LanguageMask) -> String {
        let (word1, word2) = match input.split_once(' ') {
            None => return self.encode_word(input, mask),
            Some(parts) => parts,
        };

        let combined = format!("{}{}", word1, word2);
        if self.accuracy == Accuracy::Exact {
            return self.encode_word(&combined, mask);
        }

        let second = self.encode_word(word2, mask);
        let whole = self.encode_word(&combined, mask);
        if self.name_type.prefixes().contains(&word1) {
            merge(&second, &whole)
        } else {
            let first = self.encode_word(word1, mask);
            merge(&merge(&first, &second), &whole)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beider_morse::rule::parse_table;
    use crate::beider_morse::RuleLoadError;

    fn table(json: &str) -> RuleTable {
        parse_table(json, "test.json").unwrap()
    }

    #[test]
    fn test_apply_rules_first_match_wins() {
        let table = table(
            r#"{ "rules": [
                { "pattern": "sch", "phonetic": "s" },
                { "pattern": "s", "phonetic": "z" }
            ] }"#,
        );

        assert_eq!(apply_rules("sch", &table, LanguageMask::ANY), "s");
        assert_eq!(apply_rules("ss", &table, LanguageMask::ANY), "zz");
    }

    #[test]
    fn test_apply_rules_silent_skip() {
        let table = table(r#"{ "rules": [ { "pattern": "a", "phonetic": "a" } ] }"#);

        // Unmatched codepoints, spaces included, emit nothing.
        assert_eq!(apply_rules("a a", &table, LanguageMask::ANY), "aa");
        assert_eq!(apply_rules("axa", &table, LanguageMask::ANY), "aa");
        assert_eq!(apply_rules("aüa", &table, LanguageMask::ANY), "aa");
    }

    #[test]
    fn test_apply_rules_branching() {
        let table = table(
            r#"{ "rules": [
                { "pattern": "s", "phonetic": "(s|z)" },
                { "pattern": "m", "phonetic": "m" }
            ] }"#,
        );

        assert_eq!(apply_rules("sm", &table, LanguageMask::ANY), "(s|z)m");
    }

    #[test]
    fn test_apply_rules_attribute_pruning() {
        let table = table(
            r#"{ "rules": [
                { "pattern": "w", "phonetic": "(v|w[48])" },
                { "pattern": "a", "phonetic": "a" }
            ] }"#,
        );

        // german (128) kills the w branch.
        assert_eq!(
            apply_rules("wa", &table, LanguageMask::new(128)),
            "va[128]"
        );
        // dutch (16) keeps both.
        assert_eq!(
            apply_rules("wa", &table, LanguageMask::new(16)),
            "(va[16]|wa[16])"
        );
    }

    #[test]
    fn test_apply_rules_incompatible_rule_tries_next() {
        let table = table(
            r#"{ "rules": [
                { "pattern": "w", "phonetic": "w[48]" },
                { "pattern": "w", "phonetic": "v" }
            ] }"#,
        );

        // The first w rule dies under german, the second fires.
        assert_eq!(apply_rules("w", &table, LanguageMask::new(128)), "v");
    }

    #[test]
    fn test_final_rules_empty_table_is_noop() {
        let phonetic = apply_final_rules("(s|z)mit", None, LanguageMask::ANY, true);

        assert_eq!(phonetic, "(s|z)mit");
    }

    #[test]
    fn test_final_rules_expand_and_rescan() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [
                { "pattern": "s", "phonetic": "s" },
                { "pattern": "z", "phonetic": "z" },
                { "pattern": "m", "phonetic": "m" },
                { "pattern": "i", "phonetic": "i" },
                { "pattern": "t", "phonetic": "t" }
            ] }"#,
            "test.json",
        )?;

        let phonetic = apply_final_rules("(s|z)mit", Some(&table), LanguageMask::ANY, true);

        assert_eq!(phonetic, "(smit|zmit)");

        Ok(())
    }

    #[test]
    fn test_final_rules_dead_alternative_yields_empty() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [ { "pattern": "a", "phonetic": "a" } ] }"#,
            "test.json",
        )?;

        // 48 & 128 = 0 : the only alternative dies, the pass yields "".
        let phonetic = apply_final_rules("a[48]", Some(&table), LanguageMask::new(128), true);

        assert_eq!(phonetic, "");

        Ok(())
    }

    #[test]
    fn test_final_rules_attribute_rides_along() -> Result<(), RuleLoadError> {
        let table = parse_table(
            r#"{ "rules": [
                { "pattern": "a", "phonetic": "a" },
                { "pattern": "b", "phonetic": "p" }
            ] }"#,
            "test.json",
        )?;

        let kept = apply_final_rules("ab[48]", Some(&table), LanguageMask::new(48), false);
        assert_eq!(kept, "ap[48]");

        let stripped = apply_final_rules("ab[48]", Some(&table), LanguageMask::new(48), true);
        assert_eq!(stripped, "ap");

        Ok(())
    }
}
