//! Character rewriters applied before lattice construction.

use std::io::{prelude::*, BufReader, Read};

use hashbrown::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

use crate::errors::{Result, StaccatoError};
use crate::input::InputTextBuilder;
use crate::utils;

/// Default normalizer: per-character replacements from `rewrite.def`,
/// lowercasing, and NFKC for everything not in the ignore list.
///
/// NFKC tables come from the normalization library; only their application
/// lives here.
pub struct DefaultInputTextPlugin {
    ignore_normalize: HashSet<char>,
    key_lengths: HashMap<char, usize>,
    replace_char_map: HashMap<String, String>,
}

impl DefaultInputTextPlugin {
    /// Reads `rewrite.def`: one field per line adds to the ignore-normalize
    /// set, two fields define a replacement.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut ignore_normalize = HashSet::new();
        let mut key_lengths = HashMap::new();
        let mut replace_char_map: HashMap<String, String> = HashMap::new();

        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if utils::is_skip_line(&line) {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            match cols.len() {
                1 => {
                    let key: Vec<char> = cols[0].chars().collect();
                    if key.len() != 1 {
                        return Err(StaccatoError::invalid_format(
                            "rewrite.def",
                            format!("{} is not a single character at line {}", cols[0], i + 1),
                        ));
                    }
                    ignore_normalize.insert(key[0]);
                }
                2 => {
                    if replace_char_map.contains_key(cols[0]) {
                        return Err(StaccatoError::invalid_format(
                            "rewrite.def",
                            format!("{} is already defined at line {}", cols[0], i + 1),
                        ));
                    }
                    let key: Vec<char> = cols[0].chars().collect();
                    let longest = key_lengths.get(&key[0]).copied().unwrap_or(0);
                    if longest < key.len() {
                        key_lengths.insert(key[0], key.len());
                    }
                    replace_char_map.insert(cols[0].to_string(), cols[1].to_string());
                }
                _ => {
                    return Err(StaccatoError::invalid_format(
                        "rewrite.def",
                        format!("invalid format at line {}", i + 1),
                    ));
                }
            }
        }

        Ok(Self {
            ignore_normalize,
            key_lengths,
            replace_char_map,
        })
    }

    fn key_length(&self, key: char) -> usize {
        self.key_lengths.get(&key).copied().unwrap_or(0)
    }

    pub fn rewrite(&self, builder: &mut InputTextBuilder) {
        let chars = builder.text();
        let char_count = chars.len();

        let mut offset: isize = 0;
        let mut next_offset: isize = 0;
        let mut i = 0;
        'text: while i < char_count {
            offset += next_offset;
            next_offset = 0;

            // 1. Replacements from the table, longest key first.
            let max_len = self.key_length(chars[i]).min(char_count - i);
            for l in (1..=max_len).rev() {
                let key: String = chars[i..i + l].iter().collect();
                if let Some(replacement) = self.replace_char_map.get(&key) {
                    let begin = (i as isize + offset) as usize;
                    builder.replace(begin, begin + l, replacement);
                    next_offset += replacement.chars().count() as isize - l as isize;
                    i += l;
                    continue 'text;
                }
            }

            // 2. Normalization.
            let original = chars[i];

            // 2-1. Capital alphabets (Latin, Greek, Cyrillic, ...) to small.
            let lower = single_lowercase(original);
            let replacement: String = if self.ignore_normalize.contains(&lower) {
                if original == lower {
                    i += 1;
                    continue;
                }
                lower.to_string()
            } else {
                // 2-2. Everything else through NFKC,
                //      e.g. full-width alphabet to half-width.
                lower.to_string().nfkc().collect()
            };
            next_offset = replacement.chars().count() as isize - 1;
            let mut it = replacement.chars();
            let first = it.next();
            if it.next().is_some() || first != Some(original) {
                let begin = (i as isize + offset) as usize;
                builder.replace(begin, begin + 1, &replacement);
            }
            i += 1;
        }
    }
}

/// Lowercase mapping restricted to single-character results; characters
/// with expanding case mappings are kept as they are.
fn single_lowercase(c: char) -> char {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Squeezes runs of prolonged sound marks (ー and its lookalikes) into a
/// single replacement symbol.
pub struct ProlongedSoundMarkPlugin {
    prolonged_sound_marks: HashSet<char>,
    replacement_symbol: String,
}

impl ProlongedSoundMarkPlugin {
    pub fn new(prolonged_sound_marks: &[char], replacement_symbol: &str) -> Result<Self> {
        if prolonged_sound_marks.is_empty() {
            return Err(StaccatoError::config(
                "prolongedSoundMarks is not specified",
            ));
        }
        if replacement_symbol.is_empty() {
            return Err(StaccatoError::config("replacementSymbol is not specified"));
        }
        Ok(Self {
            prolonged_sound_marks: prolonged_sound_marks.iter().copied().collect(),
            replacement_symbol: replacement_symbol.to_string(),
        })
    }

    pub fn rewrite(&self, builder: &mut InputTextBuilder) {
        let chars = builder.text();
        let char_count = chars.len();
        let mut offset = 0;
        let mut mark_start = char_count;
        let mut in_run = false;
        for i in 0..char_count {
            let is_mark = self.prolonged_sound_marks.contains(&chars[i]);
            if !in_run && is_mark {
                in_run = true;
                mark_start = i;
            } else if in_run && !is_mark {
                if i - mark_start > 1 {
                    builder.replace(mark_start - offset, i - offset, &self.replacement_symbol);
                    offset += i - mark_start - 1;
                }
                in_run = false;
            }
        }
        if in_run && char_count - mark_start > 1 {
            builder.replace(
                mark_start - offset,
                char_count - offset,
                &self.replacement_symbol,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::character::CharacterCategory;

    fn build_text(plugin: &DefaultInputTextPlugin, text: &str) -> String {
        let mut builder = InputTextBuilder::new(text);
        plugin.rewrite(&mut builder);
        builder.build(&CharacterCategory::default()).modified().to_string()
    }

    #[test]
    fn test_nfkc_and_lowercase() {
        let plugin = DefaultInputTextPlugin::from_reader("".as_bytes()).unwrap();
        assert_eq!(build_text(&plugin, "ＡＢＣ"), "abc");
        assert_eq!(build_text(&plugin, "ABC"), "abc");
        assert_eq!(build_text(&plugin, "①"), "1");
    }

    #[test]
    fn test_ignore_normalize_list() {
        let plugin = DefaultInputTextPlugin::from_reader("ｷ".as_bytes()).unwrap();
        // The half-width katakana stays because it is in the ignore list.
        assert_eq!(build_text(&plugin, "ｷｬ"), "ｷャ");
    }

    #[test]
    fn test_replacement_table() {
        let plugin = DefaultInputTextPlugin::from_reader("か゛ が".as_bytes()).unwrap();
        assert_eq!(build_text(&plugin, "か゛き"), "がき");
    }

    #[test]
    fn test_longest_replacement_wins() {
        let def = "あいう X\nあい Y";
        let plugin = DefaultInputTextPlugin::from_reader(def.as_bytes()).unwrap();
        assert_eq!(build_text(&plugin, "あいう"), "X");
        assert_eq!(build_text(&plugin, "あいえ"), "Yえ");
    }

    #[test]
    fn test_duplicate_replacement_rejected() {
        let def = "あ X\nあ Y";
        assert!(DefaultInputTextPlugin::from_reader(def.as_bytes()).is_err());
    }

    #[test]
    fn test_prolonged_sound_mark_squeeze() {
        let plugin = ProlongedSoundMarkPlugin::new(&['ー', '〜'], "ー").unwrap();
        let mut builder = InputTextBuilder::new("うわーーーい");
        plugin.rewrite(&mut builder);
        let input = builder.build(&CharacterCategory::default());
        assert_eq!(input.modified(), "うわーい");

        let mut builder = InputTextBuilder::new("わーい");
        let plugin = ProlongedSoundMarkPlugin::new(&['ー'], "ー").unwrap();
        plugin.rewrite(&mut builder);
        let input = builder.build(&CharacterCategory::default());
        assert_eq!(input.modified(), "わーい");
    }

    #[test]
    fn test_prolonged_sound_mark_at_end() {
        let plugin = ProlongedSoundMarkPlugin::new(&['ー', '〰'], "ー").unwrap();
        let mut builder = InputTextBuilder::new("わー〰");
        plugin.rewrite(&mut builder);
        let input = builder.build(&CharacterCategory::default());
        assert_eq!(input.modified(), "わー");
    }

    #[test]
    fn test_missing_config() {
        assert!(ProlongedSoundMarkPlugin::new(&[], "ー").is_err());
        assert!(ProlongedSoundMarkPlugin::new(&['ー'], "").is_err());
    }
}
