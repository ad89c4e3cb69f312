use std::borrow::Cow;

use crate::common::POS_DEPTH;
use crate::dictionary::character::CharacterCategory;
use crate::dictionary::read::{self, TextEncoding};
use crate::errors::{Result, StaccatoError};

/// Grammar block of a dictionary: the part-of-speech table, the bigram
/// connection-cost matrix, and the attached character categories.
///
/// The matrix is served from the dictionary mapping until the first
/// [`set_connect_cost`](Grammar::set_connect_cost), which promotes it to a
/// private heap copy and leaves the mapping untouched.
pub struct Grammar<'a> {
    pos_list: Vec<Vec<String>>,
    connect_table: Cow<'a, [u8]>,
    left_id_size: i16,
    right_id_size: i16,
    char_category: CharacterCategory,
    storage_size: usize,
}

impl<'a> Grammar<'a> {
    /// Parses a grammar block at `offset`.
    pub fn parse(buf: &'a [u8], offset: usize, encoding: TextEncoding) -> Result<Self> {
        let original_offset = offset;
        let (mut offset, pos_len) = read::u16_at(buf, offset)?;
        let mut pos_list = Vec::with_capacity(usize::from(pos_len));
        for _ in 0..pos_len {
            let mut pos = Vec::with_capacity(POS_DEPTH);
            for _ in 0..POS_DEPTH {
                let (next, s) = encoding.string_at(buf, offset)?;
                pos.push(s);
                offset = next;
            }
            pos_list.push(pos);
        }
        let (offset, left_id_size) = read::i16_at(buf, offset)?;
        let (offset, right_id_size) = read::i16_at(buf, offset)?;

        let table_len = 2 * usize::try_from(left_id_size)
            .map_err(|_| StaccatoError::corrupt_dictionary("negative left-id size"))?
            * usize::try_from(right_id_size)
                .map_err(|_| StaccatoError::corrupt_dictionary("negative right-id size"))?;
        let (end, table) = read::bytes_at(buf, offset, table_len)?;

        Ok(Self {
            pos_list,
            connect_table: Cow::Borrowed(table),
            left_id_size,
            right_id_size,
            char_category: CharacterCategory::default(),
            storage_size: end - original_offset,
        })
    }

    /// Bytes consumed by this block, header of the next region starts here.
    #[inline(always)]
    pub const fn storage_size(&self) -> usize {
        self.storage_size
    }

    #[inline(always)]
    pub fn pos_size(&self) -> usize {
        self.pos_list.len()
    }

    pub fn pos_string(&self, pos_id: i16) -> Option<&[String]> {
        self.pos_list
            .get(usize::try_from(pos_id).ok()?)
            .map(Vec::as_slice)
    }

    pub fn pos_id<S>(&self, pos: &[S]) -> Option<i16>
    where
        S: AsRef<str>,
    {
        if pos.len() != POS_DEPTH {
            return None;
        }
        self.pos_list
            .iter()
            .position(|p| p.iter().zip(pos).all(|(a, b)| a.as_str() == b.as_ref()))
            .map(|i| i as i16)
    }

    /// Extends the POS table with entries from a user dictionary's grammar.
    pub fn add_pos_list(&mut self, other: &Grammar) {
        self.pos_list.extend(other.pos_list.iter().cloned());
    }

    #[inline(always)]
    pub const fn left_id_size(&self) -> i16 {
        self.left_id_size
    }

    #[inline(always)]
    pub const fn right_id_size(&self) -> i16 {
        self.right_id_size
    }

    #[inline(always)]
    fn table_index(&self, left_id: i16, right_id: i16) -> usize {
        debug_assert!(left_id < self.left_id_size);
        debug_assert!(right_id < self.right_id_size);
        2 * (left_id as usize + self.left_id_size as usize * right_id as usize)
    }

    /// Connection cost of the bigram `(left_id, right_id)`.
    #[inline(always)]
    pub fn connect_cost(&self, left_id: i16, right_id: i16) -> i16 {
        let i = self.table_index(left_id, right_id);
        let table = self.connect_table.as_ref();
        i16::from_le_bytes([table[i], table[i + 1]])
    }

    /// Overwrites a connection cost.
    ///
    /// The first call copies the matrix out of the mapping; later reads see
    /// the private copy.
    pub fn set_connect_cost(&mut self, left_id: i16, right_id: i16, cost: i16) {
        let i = self.table_index(left_id, right_id);
        let table = self.connect_table.to_mut();
        table[i..i + 2].copy_from_slice(&cost.to_le_bytes());
    }

    #[inline(always)]
    pub fn character_category(&self) -> &CharacterCategory {
        &self.char_category
    }

    pub fn set_character_category(&mut self, char_category: CharacterCategory) {
        self.char_category = char_category;
    }

    /// Raw matrix region, reused when rewriting a dictionary.
    pub(crate) fn connect_table_bytes(&self) -> &[u8] {
        self.connect_table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::INHIBITED_CONNECTION;

    fn grammar_bytes() -> Vec<u8> {
        let mut buf = vec![];
        // Two POS entries.
        buf.extend_from_slice(&2u16.to_le_bytes());
        for pos in [
            ["名詞", "一般", "*", "*", "*", "*"],
            ["動詞", "一般", "*", "*", "*", "*"],
        ] {
            for e in pos {
                buf.push(e.len() as u8);
                buf.extend_from_slice(e.as_bytes());
            }
        }
        // A 2x2 matrix.
        buf.extend_from_slice(&2i16.to_le_bytes());
        buf.extend_from_slice(&2i16.to_le_bytes());
        for cost in [0i16, 10, -20, INHIBITED_CONNECTION] {
            buf.extend_from_slice(&cost.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_parse() {
        let bytes = grammar_bytes();
        let grammar = Grammar::parse(&bytes, 0, TextEncoding::Utf8).unwrap();
        assert_eq!(grammar.storage_size(), bytes.len());
        assert_eq!(grammar.pos_size(), 2);
        assert_eq!(
            grammar.pos_string(0).unwrap(),
            ["名詞", "一般", "*", "*", "*", "*"]
        );
        assert_eq!(grammar.pos_id(&["動詞", "一般", "*", "*", "*", "*"]), Some(1));
        assert_eq!(grammar.pos_id(&["形容詞", "一般", "*", "*", "*", "*"]), None);
    }

    #[test]
    fn test_connect_cost_layout() {
        // cost(left, right) = matrix[right * left_size + left]
        let bytes = grammar_bytes();
        let grammar = Grammar::parse(&bytes, 0, TextEncoding::Utf8).unwrap();
        assert_eq!(grammar.connect_cost(0, 0), 0);
        assert_eq!(grammar.connect_cost(1, 0), 10);
        assert_eq!(grammar.connect_cost(0, 1), -20);
        assert_eq!(grammar.connect_cost(1, 1), INHIBITED_CONNECTION);
    }

    #[test]
    fn test_set_connect_cost_copies() {
        let bytes = grammar_bytes();
        let mut grammar = Grammar::parse(&bytes, 0, TextEncoding::Utf8).unwrap();
        grammar.set_connect_cost(0, 0, 77);
        assert_eq!(grammar.connect_cost(0, 0), 77);
        assert_eq!(grammar.connect_cost(1, 0), 10);
        // The original buffer is untouched.
        let reparsed = Grammar::parse(&bytes, 0, TextEncoding::Utf8).unwrap();
        assert_eq!(reparsed.connect_cost(0, 0), 0);
    }

    #[test]
    fn test_add_pos_list() {
        let bytes = grammar_bytes();
        let mut grammar = Grammar::parse(&bytes, 0, TextEncoding::Utf8).unwrap();
        let other = Grammar {
            pos_list: vec![vec!["記号".into(), "*".into(), "*".into(), "*".into(),
                "*".into(), "*".into()]],
            connect_table: Cow::Owned(vec![]),
            left_id_size: 0,
            right_id_size: 0,
            char_category: CharacterCategory::default(),
            storage_size: 0,
        };
        grammar.add_pos_list(&other);
        assert_eq!(grammar.pos_size(), 3);
        assert_eq!(grammar.pos_id(&["記号", "*", "*", "*", "*", "*"]), Some(2));
    }

    #[test]
    fn test_truncated_matrix() {
        let mut bytes = grammar_bytes();
        bytes.truncate(bytes.len() - 2);
        assert!(Grammar::parse(&bytes, 0, TextEncoding::Utf8).is_err());
    }
}
