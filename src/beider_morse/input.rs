use std::borrow::Cow;
use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::beider_morse::NameType;
use crate::PhoneticError;

/// Maximum length, in codepoints, of a normalized input.
pub const MAX_INPUT_LENGTH: usize = 1000;

/// Leading phrases collapsed before word splitting, so that `de la Cruz`
/// becomes the two words `dela` and `cruz`.
const LEADING_PHRASES: [&str; 3] = ["de la", "van der", "van den"];

/// Delimiters canonicalized into a single space, in this order.
const DELIMITERS: [char; 3] = ['\'', '-', ' '];

lazy_static! {
    static ref ENTITY: Regex = Regex::new(r"&#?[0-9a-zA-Z]+;").unwrap();
    static ref NAMED_ENTITIES: BTreeMap<&'static str, &'static str> = BTreeMap::from([
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", " "),
        ("agrave", "à"),
        ("aacute", "á"),
        ("acirc", "â"),
        ("auml", "ä"),
        ("ccedil", "ç"),
        ("egrave", "è"),
        ("eacute", "é"),
        ("ecirc", "ê"),
        ("iacute", "í"),
        ("iuml", "ï"),
        ("ntilde", "ñ"),
        ("ograve", "ò"),
        ("oacute", "ó"),
        ("ocirc", "ô"),
        ("ouml", "ö"),
        ("szlig", "ß"),
        ("uacute", "ú"),
        ("uuml", "ü"),
    ]);
}

fn decode_entity(entity: &str) -> Option<String> {
    let inner = entity.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(numeric) = inner.strip_prefix('#') {
        let codepoint = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hexadecimal) => u32::from_str_radix(hexadecimal, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(codepoint).map(String::from);
    }
    NAMED_ENTITIES.get(inner).map(|text| text.to_string())
}

fn decode_entities(value: &str) -> String {
    ENTITY
        .replace_all(value, |captures: &Captures<'_>| {
            let entity = &captures[0];
            // Unknown entities are kept as is.
            decode_entity(entity).unwrap_or_else(|| entity.to_string())
        })
        .to_string()
}

/// Trim, decode HTML/XML entities, enforce the length cap and lowercase.
///
/// # Errors
///
/// [PhoneticError::EmptyInput] when nothing but whitespace remains,
/// [PhoneticError::InputTooLong] past [MAX_INPUT_LENGTH] codepoints.
pub(crate) fn normalize(value: &str) -> Result<String, PhoneticError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PhoneticError::EmptyInput);
    }

    let decoded: Cow<'_, str> = if trimmed.contains('&') {
        Cow::Owned(decode_entities(trimmed))
    } else {
        Cow::Borrowed(trimmed)
    };

    let length = decoded.chars().count();
    if length > MAX_INPUT_LENGTH {
        return Err(PhoneticError::InputTooLong(length));
    }

    Ok(decoded.to_lowercase())
}

// Windows-1252 printable C1 range. A `None` marks the five undefined bytes.
const WINDOWS_1252_C1: [Option<char>; 32] = [
    Some('€'),
    None,
    Some('‚'),
    Some('ƒ'),
    Some('„'),
    Some('…'),
    Some('†'),
    Some('‡'),
    Some('ˆ'),
    Some('‰'),
    Some('Š'),
    Some('‹'),
    Some('Œ'),
    None,
    Some('Ž'),
    None,
    None,
    Some('‘'),
    Some('’'),
    Some('“'),
    Some('”'),
    Some('•'),
    Some('–'),
    Some('—'),
    Some('˜'),
    Some('™'),
    Some('š'),
    Some('›'),
    Some('œ'),
    None,
    Some('ž'),
    Some('Ÿ'),
];

/// [normalize] for raw bytes : UTF-8 first, then Windows-1252/ISO-8859-1
/// (which also covers plain ASCII).
///
/// # Errors
///
/// [PhoneticError::InvalidEncoding] when a byte maps to none of the
/// candidate encodings, plus everything [normalize] can raise.
pub(crate) fn normalize_bytes(value: &[u8]) -> Result<String, PhoneticError> {
    match std::str::from_utf8(value) {
        Ok(text) => normalize(text),
        Err(_) => {
            let mut decoded = String::with_capacity(value.len());
            for &byte in value {
                let ch = match byte {
                    0x80..=0x9F => WINDOWS_1252_C1[(byte - 0x80) as usize].ok_or_else(|| {
                        PhoneticError::InvalidEncoding(format!("byte 0x{byte:02x}"))
                    })?,
                    _ => byte as char,
                };
                decoded.push(ch);
            }
            normalize(&decoded)
        }
    }
}

/// Collapse a recognized leading phrase : `de la cruz` becomes `dela cruz`.
/// The input is already lowercase.
pub(crate) fn remove_leading_phrases(value: String) -> String {
    for phrase in LEADING_PHRASES {
        let prefix = format!("{} ", phrase);
        if let Some(rest) = value.strip_prefix(&prefix) {
            return format!("{} {}", phrase.replace(' ', ""), rest);
        }
    }
    value
}

/// For each delimiter in order : find its first occurrence, remove every
/// occurrence, reinsert a single space at the first site. Apostrophes are a
/// phonetic marker in Sephardic names and take part in the delimiter pass ;
/// for the other name types they are stripped outright.
pub(crate) fn canonicalize_delimiters(mut value: String, name_type: NameType) -> String {
    if name_type != NameType::Sephardic {
        value = value.replace('\'', "");
    }
    for delimiter in DELIMITERS {
        if let Some(position) = value.find(delimiter) {
            value = value.replace(delimiter, "");
            value.insert(position, ' ');
        }
    }
    value
}

/// The full input pipeline of an encode call.
pub(crate) fn prepare(value: &str, name_type: NameType) -> Result<String, PhoneticError> {
    let normalized = normalize(value)?;
    let normalized = remove_leading_phrases(normalized);
    Ok(canonicalize_delimiters(normalized, name_type))
}

/// [prepare] for raw bytes.
pub(crate) fn prepare_bytes(value: &[u8], name_type: NameType) -> Result<String, PhoneticError> {
    let normalized = normalize_bytes(value)?;
    let normalized = remove_leading_phrases(normalized);
    Ok(canonicalize_delimiters(normalized, name_type))
}
