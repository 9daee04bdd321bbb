use std::fmt::{Display, Formatter};

use regex::Regex;

/// Which side of a rule a context constrains. A left context is applied as
/// `pattern$` against the input before the match position, a right context
/// as `^pattern` against the input after the matched pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ContextSide {
    Left,
    Right,
}

/// A compiled rule context.
///
/// Most contexts in rule data are of a handful of shapes (empty, a literal
/// at the word boundary, a single character class) that can be matched
/// without running a regex. Anything else falls back to a [Regex] compiled
/// once at load time, with the anchor of the side baked in.
#[derive(Clone, Debug)]
pub(crate) enum ContextMatcher {
    /// Empty context, matches everything.
    Always,
    /// Context that only matches the empty string (word boundary).
    IsEmpty,
    /// The whole string must equal the literal.
    Equals(String),
    /// The string must start with the literal (right contexts).
    StartsWith(String),
    /// The string must end with the literal (left contexts).
    EndsWith(String),
    /// The whole string must be one char (not) in the list.
    EqualsChar(String, bool),
    /// The first char must (not) be in the list.
    StartsWithChar(String, bool),
    /// The last char must (not) be in the list.
    EndsWithChar(String, bool),
    /// Anything else.
    Pattern(Box<Regex>),
}

fn is_literal(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_alphanumeric())
}

/// Try to recognize `[...]` or `[^...]` with a literal char list inside.
fn char_class(value: &str) -> Option<(String, bool)> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    let (inner, should_match) = match inner.strip_prefix('^') {
        Some(negated) => (negated, false),
        None => (inner, true),
    };
    if is_literal(inner) {
        Some((inner.to_string(), should_match))
    } else {
        None
    }
}

impl ContextMatcher {
    pub fn compile(context: &str, side: ContextSide) -> Result<Self, regex::Error> {
        if context.is_empty() {
            return Ok(Self::Always);
        }

        let anchored_start = context.starts_with('^');
        let anchored_end = context.ends_with('$');
        let inner = match (anchored_start, anchored_end) {
            (false, false) => context,
            (true, false) => &context[1..],
            (false, true) => &context[..context.len() - 1],
            (true, true) => &context[1..context.len() - 1],
        };

        // A left context is implicitly anchored at the end, a right context
        // at the start.
        let (anchored_start, anchored_end) = match side {
            ContextSide::Left => (anchored_start, true),
            ContextSide::Right => (true, anchored_end),
        };

        if inner.is_empty() {
            // "^" as a left context or "$" as a right context : the word
            // boundary. A dangling anchor on its own side matches anything.
            return match (side, anchored_start, anchored_end) {
                (ContextSide::Left, true, _) => Ok(Self::IsEmpty),
                (ContextSide::Right, _, true) => Ok(Self::IsEmpty),
                _ => Ok(Self::Always),
            };
        }

        if is_literal(inner) {
            return Ok(match (anchored_start, anchored_end) {
                (true, true) => Self::Equals(inner.to_string()),
                (true, false) => Self::StartsWith(inner.to_string()),
                (false, true) => Self::EndsWith(inner.to_string()),
                (false, false) => unreachable!("one side is always anchored"),
            });
        }

        if let Some((chars, should_match)) = char_class(inner) {
            return Ok(match (anchored_start, anchored_end) {
                (true, true) => Self::EqualsChar(chars, should_match),
                (true, false) => Self::StartsWithChar(chars, should_match),
                (false, true) => Self::EndsWithChar(chars, should_match),
                (false, false) => unreachable!("one side is always anchored"),
            });
        }

        let pattern = match side {
            ContextSide::Left => format!("{}$", context),
            ContextSide::Right => format!("^{}", context),
        };
        Ok(Self::Pattern(Box::new(Regex::new(&pattern)?)))
    }

    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Self::Always => true,
            Self::IsEmpty => input.is_empty(),
            Self::Equals(literal) => input == literal,
            Self::StartsWith(literal) => input.starts_with(literal),
            Self::EndsWith(literal) => input.ends_with(literal),
            Self::EqualsChar(chars, should_match) => {
                let mut iterator = input.chars();
                let first = iterator.next();
                let second = iterator.next();
                match (first, second) {
                    (Some(ch), None) => chars.contains(ch) == *should_match,
                    _ => false,
                }
            }
            Self::StartsWithChar(chars, should_match) => input
                .chars()
                .next()
                .map(|ch| chars.contains(ch) == *should_match)
                .unwrap_or(false),
            Self::EndsWithChar(chars, should_match) => input
                .chars()
                .next_back()
                .map(|ch| chars.contains(ch) == *should_match)
                .unwrap_or(false),
            Self::Pattern(regex) => regex.is_match(input),
        }
    }
}

impl Display for ContextMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "\"\""),
            Self::IsEmpty => write!(f, "\"^$\""),
            Self::Equals(literal) => write!(f, "\"^{literal}$\""),
            Self::StartsWith(literal) => write!(f, "\"^{literal}\""),
            Self::EndsWith(literal) => write!(f, "\"{literal}$\""),
            Self::EqualsChar(chars, should_match) => {
                write!(f, "\"^[{}{chars}]$\"", negate(*should_match))
            }
            Self::StartsWithChar(chars, should_match) => {
                write!(f, "\"^[{}{chars}]\"", negate(*should_match))
            }
            Self::EndsWithChar(chars, should_match) => {
                write!(f, "\"[{}{chars}]$\"", negate(*should_match))
            }
            Self::Pattern(regex) => write!(f, "\"{regex}\""),
        }
    }
}

fn negate(should_match: bool) -> &'static str {
    if should_match {
        ""
    } else {
        "^"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_matches_everything() -> Result<(), regex::Error> {
        let left = ContextMatcher::compile("", ContextSide::Left)?;
        let right = ContextMatcher::compile("", ContextSide::Right)?;

        for input in ["", "a", "abc"] {
            assert!(left.is_match(input), "Error for {input}");
            assert!(right.is_match(input), "Error for {input}");
        }
        Ok(())
    }

    #[test]
    fn test_word_boundaries() -> Result<(), regex::Error> {
        // "^" as a left context : only fires at the start of the word.
        let start = ContextMatcher::compile("^", ContextSide::Left)?;
        assert!(start.is_match(""));
        assert!(!start.is_match("a"));

        // "$" as a right context : only fires at the end of the word.
        let end = ContextMatcher::compile("$", ContextSide::Right)?;
        assert!(end.is_match(""));
        assert!(!end.is_match("x"));

        Ok(())
    }

    #[test]
    fn test_literals() -> Result<(), regex::Error> {
        let left = ContextMatcher::compile("sch", ContextSide::Left)?;
        assert!(matches!(left, ContextMatcher::EndsWith(_)));
        assert!(left.is_match("busch"));
        assert!(!left.is_match("bus"));

        let right = ContextMatcher::compile("sch", ContextSide::Right)?;
        assert!(matches!(right, ContextMatcher::StartsWith(_)));
        assert!(right.is_match("schmidt"));
        assert!(!right.is_match("mschmidt"));

        let exact = ContextMatcher::compile("^abc$", ContextSide::Right)?;
        assert!(matches!(exact, ContextMatcher::Equals(_)));
        assert!(exact.is_match("abc"));
        assert!(!exact.is_match("abcd"));

        Ok(())
    }

    #[test]
    fn test_char_classes() -> Result<(), regex::Error> {
        let vowel = ContextMatcher::compile("[aeiou]", ContextSide::Left)?;
        assert!(matches!(vowel, ContextMatcher::EndsWithChar(_, true)));
        assert!(vowel.is_match("ba"));
        assert!(!vowel.is_match("ab"));
        assert!(!vowel.is_match(""));

        let not_vowel = ContextMatcher::compile("[^aeiou]", ContextSide::Right)?;
        assert!(matches!(not_vowel, ContextMatcher::StartsWithChar(_, false)));
        assert!(not_vowel.is_match("br"));
        assert!(!not_vowel.is_match("ar"));

        let single = ContextMatcher::compile("^[ei]$", ContextSide::Right)?;
        assert!(matches!(single, ContextMatcher::EqualsChar(_, true)));
        assert!(single.is_match("e"));
        assert!(!single.is_match("ei"));

        Ok(())
    }

    #[test]
    fn test_unicode_char_class() -> Result<(), regex::Error> {
        let matcher = ContextMatcher::compile("[äöü]", ContextSide::Left)?;
        assert!(matcher.is_match("grü"));
        assert!(!matcher.is_match("gru"));

        Ok(())
    }

    #[test]
    fn test_regex_fallback() -> Result<(), regex::Error> {
        let matcher = ContextMatcher::compile("[aeiou]n", ContextSide::Right)?;
        assert!(matches!(matcher, ContextMatcher::Pattern(_)));
        assert!(matcher.is_match("ens"));
        assert!(!matcher.is_match("nes"));

        Ok(())
    }

    #[test]
    fn test_bad_regex_is_a_load_error() {
        let result = ContextMatcher::compile("[aeiou", ContextSide::Left);

        assert!(result.is_err());
    }
}
