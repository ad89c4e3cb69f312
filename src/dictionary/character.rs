use std::io::{prelude::*, BufReader, Read};
use std::str::FromStr;

use bitflags::bitflags;

use crate::errors::{Result, StaccatoError};
use crate::utils;

bitflags! {
    /// A set of categories for a character.
    ///
    /// Implemented as a bitset with fixed size.
    #[repr(transparent)]
    #[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
    pub struct CategorySet: u32 {
        /** The fall back category. */
        const DEFAULT = 1;
        /** White spaces. */
        const SPACE = 1 << 1;
        /** CJKV ideographic characters. */
        const KANJI = 1 << 2;
        /** Symbols. */
        const SYMBOL = 1 << 3;
        /** Numerical characters. */
        const NUMERIC = 1 << 4;
        /** Latin alphabets. */
        const ALPHA = 1 << 5;
        /** Hiragana characters. */
        const HIRAGANA = 1 << 6;
        /** Katakana characters. */
        const KATAKANA = 1 << 7;
        /** Kanji numeric characters. */
        const KANJINUMERIC = 1 << 8;
        /** Greek alphabets. */
        const GREEK = 1 << 9;
        /** Cyrillic alphabets. */
        const CYRILLIC = 1 << 10;
        /** User defined category. */
        const USER1 = 1 << 11;
        /** User defined category. */
        const USER2 = 1 << 12;
        /** User defined category. */
        const USER3 = 1 << 13;
        /** User defined category. */
        const USER4 = 1 << 14;
        /** Characters that cannot be the beginning of an OOV word. */
        const NOOOVBOW = 1 << 15;
    }
}

impl FromStr for CategorySet {
    type Err = StaccatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DEFAULT" => Ok(Self::DEFAULT),
            "SPACE" => Ok(Self::SPACE),
            "KANJI" => Ok(Self::KANJI),
            "SYMBOL" => Ok(Self::SYMBOL),
            "NUMERIC" => Ok(Self::NUMERIC),
            "ALPHA" => Ok(Self::ALPHA),
            "HIRAGANA" => Ok(Self::HIRAGANA),
            "KATAKANA" => Ok(Self::KATAKANA),
            "KANJINUMERIC" => Ok(Self::KANJINUMERIC),
            "GREEK" => Ok(Self::GREEK),
            "CYRILLIC" => Ok(Self::CYRILLIC),
            "USER1" => Ok(Self::USER1),
            "USER2" => Ok(Self::USER2),
            "USER3" => Ok(Self::USER3),
            "USER4" => Ok(Self::USER4),
            "NOOOVBOW" => Ok(Self::NOOOVBOW),
            _ => Err(StaccatoError::invalid_format(
                "char.def",
                format!("{s} is an invalid category"),
            )),
        }
    }
}

impl CategorySet {
    /// Iterates over the single-bit members of the set.
    pub fn members(self) -> impl Iterator<Item = CategorySet> {
        let mut values = self.bits();
        std::iter::from_fn(move || {
            if values == 0 {
                return None;
            }
            let mask = 1 << values.trailing_zeros();
            values ^= mask;
            CategorySet::from_bits(mask)
        })
    }
}

struct CategoryRange {
    low: u32,
    high: u32,
    categories: CategorySet,
}

impl CategoryRange {
    #[inline(always)]
    fn contains(&self, c: char) -> bool {
        let cp = u32::from(c);
        self.low <= cp && cp <= self.high
    }
}

/// Ordered list of codepoint ranges mapping characters to category sets.
///
/// The default instance has no ranges, so every character falls back to
/// DEFAULT.
#[derive(Default)]
pub struct CharacterCategory {
    ranges: Vec<CategoryRange>,
}

impl CharacterCategory {
    /// Category set of `c`: the union over all containing ranges, or
    /// DEFAULT when no range matches.
    pub fn get_category_types(&self, c: char) -> CategorySet {
        let mut categories = CategorySet::empty();
        for range in &self.ranges {
            if range.contains(c) {
                categories |= range.categories;
            }
        }
        if categories.is_empty() {
            categories = CategorySet::DEFAULT;
        }
        categories
    }

    /// Reads the range lines of `char.def`.
    ///
    /// Lines are `0xHHHH[..0xHHHH] CAT1 CAT2 …`; category-parameter lines
    /// (no `0x` prefix) belong to the OOV provider and are skipped here.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut ranges = vec![];

        for line in reader.lines() {
            let line = line?;
            if utils::is_skip_line(&line) {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            if cols.len() < 2 {
                return Err(StaccatoError::invalid_format(
                    "char.def",
                    format!("too short fields: {line}"),
                ));
            }
            if !cols[0].starts_with("0x") {
                continue;
            }

            let bounds: Vec<_> = cols[0].split("..").collect();
            let low = parse_hex_codepoint(bounds[0])?;
            let high = if bounds.len() > 1 {
                parse_hex_codepoint(bounds[1])?
            } else {
                low
            };
            if low > high {
                return Err(StaccatoError::invalid_format(
                    "char.def",
                    format!("the lower bound is greater than the upper bound: {line}"),
                ));
            }

            let mut categories = CategorySet::empty();
            for col in &cols[1..] {
                if col.starts_with('#') {
                    break;
                }
                let category: CategorySet = col.parse()?;
                categories |= category;
            }
            ranges.push(CategoryRange {
                low,
                high,
                categories,
            });
        }

        Ok(Self { ranges })
    }
}

fn parse_hex_codepoint(s: &str) -> Result<u32> {
    let digits = s.strip_prefix("0x").ok_or_else(|| {
        StaccatoError::invalid_format("char.def", format!("{s} is an invalid code point"))
    })?;
    let cp = u32::from_str_radix(digits, 16)
        .map_err(|_| StaccatoError::invalid_format("char.def", format!("{s} is an invalid hex")))?;
    if cp > 0x10FFFF {
        return Err(StaccatoError::invalid_format(
            "char.def",
            format!("{s} is outside the code point range"),
        ));
    }
    Ok(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAR_DEF: &str = "\
#
# This is a comment.
#
0x0020 SPACE
0x0030..0x0039 NUMERIC
0x0041..0x005A ALPHA #UPPER
0x3041..0x309F HIRAGANA
0x30A1..0x30FF KATAKANA
0x4E00..0x9FFF KANJI
0x4E00 KANJI KANJINUMERIC
";

    #[test]
    fn test_basic_ranges() {
        let cat = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
        assert_eq!(cat.get_category_types(' '), CategorySet::SPACE);
        assert_eq!(cat.get_category_types('5'), CategorySet::NUMERIC);
        assert_eq!(cat.get_category_types('A'), CategorySet::ALPHA);
        assert_eq!(cat.get_category_types('あ'), CategorySet::HIRAGANA);
        assert_eq!(cat.get_category_types('ア'), CategorySet::KATAKANA);
    }

    #[test]
    fn test_union_over_ranges() {
        let cat = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
        assert_eq!(
            cat.get_category_types('一'),
            CategorySet::KANJI | CategorySet::KANJINUMERIC
        );
    }

    #[test]
    fn test_default_fallback() {
        let cat = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
        assert_eq!(cat.get_category_types('!'), CategorySet::DEFAULT);
    }

    #[test]
    fn test_parameter_lines_skipped() {
        let data = "DEFAULT 0 1 0\n0x0030..0x0039 NUMERIC";
        let cat = CharacterCategory::from_reader(data.as_bytes()).unwrap();
        assert_eq!(cat.get_category_types('0'), CategorySet::NUMERIC);
    }

    #[test]
    fn test_invalid_category() {
        let data = "0x0030..0x0039 INVALID";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_inverted_range() {
        let data = "0x0039..0x0030 NUMERIC";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_members_iteration() {
        let set = CategorySet::KANJI | CategorySet::KANJINUMERIC;
        let members: Vec<_> = set.members().collect();
        assert_eq!(members, vec![CategorySet::KANJI, CategorySet::KANJINUMERIC]);
    }
}
