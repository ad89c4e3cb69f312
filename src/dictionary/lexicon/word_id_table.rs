use crate::dictionary::read;
use crate::errors::Result;

/// Region mapping a trie payload to the word IDs sharing that surface.
///
/// Each entry is a count byte followed by that many little-endian `u32`
/// IDs; trie values are byte offsets into this region.
#[derive(Clone, Copy)]
pub struct WordIdTable<'a> {
    data: &'a [u8],
    size: u32,
}

impl<'a> WordIdTable<'a> {
    /// Parses the region at `offset` (a `u32` byte count, then the table).
    pub fn parse(buf: &'a [u8], offset: usize) -> Result<Self> {
        let (offset, size) = read::u32_at(buf, offset)?;
        let (_, data) = read::bytes_at(buf, offset, size as usize)?;
        Ok(Self { data, size })
    }

    /// Bytes consumed by this region including the size prefix.
    #[inline(always)]
    pub const fn storage_size(&self) -> usize {
        4 + self.size as usize
    }

    /// Word IDs stored at byte `index` of the table.
    pub fn get(&self, index: usize) -> Result<WordIdTableIter<'a>> {
        let (offset, count) = read::u8_at(self.data, index)?;
        Ok(WordIdTableIter {
            data: self.data,
            offset,
            remaining: usize::from(count),
        })
    }
}

pub struct WordIdTableIter<'a> {
    data: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> Iterator for WordIdTableIter<'a> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match read::u32_at(self.data, self.offset) {
            Ok((next, id)) => {
                self.offset = next;
                Some(Ok(id))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}
