use std::borrow::Cow;

use crate::dictionary::read;
use crate::errors::Result;

const ELEMENT_SIZE: usize = 2 * 3;

/// Fixed 6-byte parameter entries `(left_id, right_id, cost)` per word.
///
/// A cost of `i16::MIN` marks a user-dictionary placeholder computed on
/// first use; writing it promotes the region to a private heap copy.
pub struct WordParams<'a> {
    data: Cow<'a, [u8]>,
    size: u32,
}

impl<'a> WordParams<'a> {
    /// Parses the region at `offset` (a `u32` word count, then the entries).
    pub fn parse(buf: &'a [u8], offset: usize) -> Result<Self> {
        let (offset, size) = read::u32_at(buf, offset)?;
        let (_, data) = read::bytes_at(buf, offset, size as usize * ELEMENT_SIZE)?;
        Ok(Self {
            data: Cow::Borrowed(data),
            size,
        })
    }

    /// Bytes consumed by this region including the size prefix.
    #[inline(always)]
    pub const fn storage_size(&self) -> usize {
        4 + self.size as usize * ELEMENT_SIZE
    }

    /// Number of words in the owning lexicon.
    #[inline(always)]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[inline(always)]
    fn i16_field(&self, word_id: u32, field: usize) -> i16 {
        let i = word_id as usize * ELEMENT_SIZE + field * 2;
        let data = self.data.as_ref();
        i16::from_le_bytes([data[i], data[i + 1]])
    }

    #[inline(always)]
    pub fn left_id(&self, word_id: u32) -> i16 {
        self.i16_field(word_id, 0)
    }

    #[inline(always)]
    pub fn right_id(&self, word_id: u32) -> i16 {
        self.i16_field(word_id, 1)
    }

    #[inline(always)]
    pub fn cost(&self, word_id: u32) -> i16 {
        self.i16_field(word_id, 2)
    }

    /// Stores a computed cost, copying the region out of the mapping on the
    /// first write.
    pub fn set_cost(&mut self, word_id: u32, cost: i16) {
        let i = word_id as usize * ELEMENT_SIZE + 4;
        let data = self.data.to_mut();
        data[i..i + 2].copy_from_slice(&cost.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_bytes(entries: &[(i16, i16, i16)]) -> Vec<u8> {
        let mut buf = vec![];
        buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for &(left, right, cost) in entries {
            buf.extend_from_slice(&left.to_le_bytes());
            buf.extend_from_slice(&right.to_le_bytes());
            buf.extend_from_slice(&cost.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_fields() {
        let buf = params_bytes(&[(1, 2, 3), (-4, -5, i16::MIN)]);
        let params = WordParams::parse(&buf, 0).unwrap();
        assert_eq!(params.size(), 2);
        assert_eq!(params.storage_size(), buf.len());
        assert_eq!(params.left_id(0), 1);
        assert_eq!(params.right_id(0), 2);
        assert_eq!(params.cost(0), 3);
        assert_eq!(params.left_id(1), -4);
        assert_eq!(params.right_id(1), -5);
        assert_eq!(params.cost(1), i16::MIN);
    }

    #[test]
    fn test_set_cost_copies() {
        let buf = params_bytes(&[(0, 0, i16::MIN)]);
        let mut params = WordParams::parse(&buf, 0).unwrap();
        params.set_cost(0, -321);
        assert_eq!(params.cost(0), -321);
        // The mapping is untouched.
        let reparsed = WordParams::parse(&buf, 0).unwrap();
        assert_eq!(reparsed.cost(0), i16::MIN);
    }

    #[test]
    fn test_truncated() {
        let mut buf = params_bytes(&[(1, 2, 3)]);
        buf.truncate(buf.len() - 1);
        assert!(WordParams::parse(&buf, 0).is_err());
    }
}
