use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr};

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

use crate::beider_morse::NameType;

/// Languages known to at least one [NameType].
///
/// Within a given name type, each listed language is assigned a distinct
/// power-of-two value by its position in the name type's language list, with
/// [Language::Any] always holding bit 0 (value 1). The same language can
/// therefore have different values across name types.
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, Sequence,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// The unspecified language.
    Any,
    /// Arabic.
    Arabic,
    /// Cyrillic script languages.
    Cyrillic,
    /// Czech.
    Czech,
    /// Dutch.
    Dutch,
    /// English.
    English,
    /// French.
    French,
    /// German.
    German,
    /// Greek (Greek script).
    Greek,
    /// Greek written in latin script.
    GreekLatin,
    /// Hebrew.
    Hebrew,
    /// Hungarian.
    Hungarian,
    /// Italian.
    Italian,
    /// Polish.
    Polish,
    /// Portuguese.
    Portuguese,
    /// Romanian.
    Romanian,
    /// Russian.
    Russian,
    /// Spanish.
    Spanish,
    /// Turkish.
    Turkish,
}

const GENERIC_LANGUAGES: [Language; 19] = [
    Language::Any,
    Language::Arabic,
    Language::Cyrillic,
    Language::Czech,
    Language::Dutch,
    Language::English,
    Language::French,
    Language::German,
    Language::Greek,
    Language::GreekLatin,
    Language::Hebrew,
    Language::Hungarian,
    Language::Italian,
    Language::Polish,
    Language::Portuguese,
    Language::Romanian,
    Language::Russian,
    Language::Spanish,
    Language::Turkish,
];

const ASHKENAZIC_LANGUAGES: [Language; 11] = [
    Language::Any,
    Language::Cyrillic,
    Language::English,
    Language::French,
    Language::German,
    Language::Hebrew,
    Language::Hungarian,
    Language::Polish,
    Language::Romanian,
    Language::Russian,
    Language::Spanish,
];

const SEPHARDIC_LANGUAGES: [Language; 6] = [
    Language::Any,
    Language::French,
    Language::Hebrew,
    Language::Italian,
    Language::Portuguese,
    Language::Spanish,
];

impl Language {
    /// Lowercase name, as used in rule file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Arabic => "arabic",
            Self::Cyrillic => "cyrillic",
            Self::Czech => "czech",
            Self::Dutch => "dutch",
            Self::English => "english",
            Self::French => "french",
            Self::German => "german",
            Self::Greek => "greek",
            Self::GreekLatin => "greeklatin",
            Self::Hebrew => "hebrew",
            Self::Hungarian => "hungarian",
            Self::Italian => "italian",
            Self::Polish => "polish",
            Self::Portuguese => "portuguese",
            Self::Romanian => "romanian",
            Self::Russian => "russian",
            Self::Spanish => "spanish",
            Self::Turkish => "turkish",
        }
    }

    /// Bit value of this language for `name_type`, or [None](Option::None)
    /// if the name type doesn't list it.
    pub fn value(&self, name_type: NameType) -> Option<LanguageMask> {
        name_type
            .languages()
            .iter()
            .position(|language| language == self)
            .map(|position| LanguageMask(1 << position))
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl NameType {
    /// Languages listed for this name type, in bit order.
    pub fn languages(&self) -> &'static [Language] {
        match self {
            Self::Generic => &GENERIC_LANGUAGES,
            Self::Ashkenazic => &ASHKENAZIC_LANGUAGES,
            Self::Sephardic => &SEPHARDIC_LANGUAGES,
        }
    }

    /// The mask with every bit of this name type's languages set.
    pub fn universe(&self) -> LanguageMask {
        LanguageMask((1 << self.languages().len()) - 1)
    }
}

/// An unsigned integer whose set bits designate a union of languages of a
/// given [NameType]. The zero mask means "no language".
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct LanguageMask(u64);

impl LanguageMask {
    /// The empty mask.
    pub const NO_LANGUAGES: LanguageMask = LanguageMask(0);
    /// The mask of [Language::Any] alone. Bit 0 in every name type.
    pub const ANY: LanguageMask = LanguageMask(1);

    /// Build a mask from its raw bits.
    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// OR of the values of `languages` for `name_type`. Languages the name
    /// type doesn't list contribute nothing.
    pub fn combine(languages: &[Language], name_type: NameType) -> Self {
        languages
            .iter()
            .filter_map(|language| language.value(name_type))
            .fold(Self::NO_LANGUAGES, |mask, value| mask | value)
    }

    /// `true` if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// `true` if `self` and `other` share at least one bit.
    pub fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` if every bit of `other` is set in `self`.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if every language listed for `name_type` contributes its bit.
    pub fn is_universal(&self, name_type: NameType) -> bool {
        *self == name_type.universe()
    }

    /// The complement of `self`, masked to the universe of `name_type`.
    pub fn complement(&self, name_type: NameType) -> Self {
        Self(!self.0 & name_type.universe().0)
    }

    /// The languages whose bit is set in `self`, in bit order.
    pub fn decode(&self, name_type: NameType) -> Vec<Language> {
        name_type
            .languages()
            .iter()
            .enumerate()
            .filter(|(position, _)| self.0 & (1 << position) != 0)
            .map(|(_, language)| *language)
            .collect()
    }

    /// The single concrete language designated by `self`, if exactly one bit
    /// is set and that bit is not [Language::Any].
    pub fn single(&self, name_type: NameType) -> Option<Language> {
        if self.0 == 0 || self.0 & (self.0 - 1) != 0 || *self == Self::ANY {
            return None;
        }
        let position = self.0.trailing_zeros() as usize;
        name_type.languages().get(position).copied()
    }
}

impl BitOr for LanguageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for LanguageMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Display for LanguageMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_bit_zero_everywhere() {
        for name_type in enum_iterator::all::<NameType>() {
            assert_eq!(
                Language::Any.value(name_type),
                Some(LanguageMask::ANY),
                "Error for {}",
                name_type
            );
        }
    }

    #[test]
    fn test_values_are_single_bits() {
        for name_type in enum_iterator::all::<NameType>() {
            for language in name_type.languages() {
                let value = language.value(name_type).unwrap().bits();
                assert_eq!(value.count_ones(), 1, "Error for {}", language);
            }
        }
    }

    #[test]
    fn test_same_language_differs_across_name_types() {
        let generic = Language::German.value(NameType::Generic).unwrap();
        let ashkenazic = Language::German.value(NameType::Ashkenazic).unwrap();

        assert_eq!(generic.bits(), 128);
        assert_eq!(ashkenazic.bits(), 16);
    }

    #[test]
    fn test_universe() {
        assert_eq!(NameType::Generic.universe().bits(), 524287);
        assert_eq!(NameType::Ashkenazic.universe().bits(), 2047);
        assert_eq!(NameType::Sephardic.universe().bits(), 63);

        assert!(NameType::Generic.universe().is_universal(NameType::Generic));
        assert!(!NameType::Sephardic
            .universe()
            .is_universal(NameType::Generic));
    }

    #[test]
    fn test_combine_and_decode() {
        let mask = LanguageMask::combine(
            &[Language::German, Language::Dutch],
            NameType::Generic,
        );

        assert_eq!(mask.bits(), 144);
        assert_eq!(
            mask.decode(NameType::Generic),
            vec![Language::Dutch, Language::German]
        );
    }

    #[test]
    fn test_combine_skips_unlisted_language() {
        let mask = LanguageMask::combine(&[Language::Turkish], NameType::Sephardic);

        assert!(mask.is_empty());
    }

    #[test]
    fn test_single() {
        let german = Language::German.value(NameType::Generic).unwrap();
        let dutch = Language::Dutch.value(NameType::Generic).unwrap();

        assert_eq!(german.single(NameType::Generic), Some(Language::German));
        assert_eq!((german | dutch).single(NameType::Generic), None);
        assert_eq!(LanguageMask::ANY.single(NameType::Generic), None);
        assert_eq!(LanguageMask::NO_LANGUAGES.single(NameType::Generic), None);
    }

    #[test]
    fn test_complement_is_masked_to_universe() {
        let mask = Language::French.value(NameType::Sephardic).unwrap();
        let complement = mask.complement(NameType::Sephardic);

        assert_eq!(complement.bits(), 61);
        assert!(NameType::Sephardic.universe().contains(complement));
    }
}
