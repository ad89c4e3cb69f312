pub mod word_id_table;
pub mod word_infos;
pub mod word_params;

use crate::dictionary::read::{self, TextEncoding};
use crate::errors::{Result, StaccatoError};
use crate::trie::{CommonPrefixIter, DoubleArray};
use word_id_table::{WordIdTable, WordIdTableIter};
use word_infos::{WordInfo, WordInfos};
use word_params::WordParams;

/// Lexicon of a single dictionary: the trie, the word-ID table, the
/// word parameters, and the word-info records, all referencing the
/// dictionary buffer.
pub struct Lexicon<'a> {
    trie: DoubleArray<'a>,
    word_id_table: WordIdTable<'a>,
    word_params: WordParams<'a>,
    word_infos: WordInfos<'a>,
}

impl<'a> Lexicon<'a> {
    /// Parses the four lexicon regions starting at `offset`.
    ///
    /// `buf` is the whole dictionary buffer: word-info offsets are absolute
    /// file positions.
    pub fn parse(buf: &'a [u8], offset: usize, encoding: TextEncoding) -> Result<Self> {
        let (offset, trie_size) = read::u32_at(buf, offset)?;
        let (offset, trie_bytes) = read::bytes_at(buf, offset, trie_size as usize * 4)?;
        let trie = DoubleArray::new(trie_bytes)?;

        let word_id_table = WordIdTable::parse(buf, offset)?;
        let offset = offset + word_id_table.storage_size();

        let word_params = WordParams::parse(buf, offset)?;
        let offset = offset + word_params.storage_size();

        let word_infos = WordInfos::new(buf, offset, word_params.size(), encoding);

        Ok(Self {
            trie,
            word_id_table,
            word_params,
            word_infos,
        })
    }

    /// Number of words.
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.word_params.size()
    }

    /// All `(word_id, end_byte)` pairs whose surface is a prefix of
    /// `input[offset..]`, lazily.
    pub fn lookup<'k>(&self, input: &'k [u8], offset: usize) -> LexiconIter<'a, 'k> {
        LexiconIter {
            trie_iter: self.trie.common_prefix_iter(input, offset),
            word_id_table: self.word_id_table,
            ids: None,
            end: 0,
            err: None,
        }
    }

    #[inline(always)]
    pub fn left_id(&self, word_id: u32) -> i16 {
        self.word_params.left_id(word_id)
    }

    #[inline(always)]
    pub fn right_id(&self, word_id: u32) -> i16 {
        self.word_params.right_id(word_id)
    }

    #[inline(always)]
    pub fn cost(&self, word_id: u32) -> i16 {
        self.word_params.cost(word_id)
    }

    pub fn word_info(&self, word_id: u32) -> Result<WordInfo> {
        self.word_infos.get(word_id)
    }

    /// Fills in every placeholder cost (`i16::MIN`) by evaluating `f` on
    /// the word surface. The parameter region is copied on the first write.
    pub fn calculate_cost<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<i16>,
    {
        for word_id in 0..self.size() {
            if self.word_params.cost(word_id) != i16::MIN {
                continue;
            }
            let surface = self.word_infos.get(word_id)?.surface;
            let cost = f(&surface)?;
            self.word_params.set_cost(word_id, cost);
        }
        Ok(())
    }
}

/// Lazy producer of lexicon matches.
///
/// Expands each trie payload into its word-ID list; a corruption during
/// the walk ends the iteration and is reported by [`err`](Self::err).
pub struct LexiconIter<'a, 'k> {
    trie_iter: CommonPrefixIter<'a, 'k>,
    word_id_table: WordIdTable<'a>,
    ids: Option<WordIdTableIter<'a>>,
    end: usize,
    err: Option<StaccatoError>,
}

impl<'a, 'k> LexiconIter<'a, 'k> {
    /// Terminal error of the walk, if any.
    pub fn err(&self) -> Option<&StaccatoError> {
        self.err.as_ref()
    }

    pub(crate) fn take_err(&mut self) -> Option<StaccatoError> {
        self.err.take()
    }
}

impl<'a, 'k> Iterator for LexiconIter<'a, 'k> {
    type Item = (u32, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.err.is_some() {
            return None;
        }
        loop {
            if let Some(ids) = self.ids.as_mut() {
                match ids.next() {
                    Some(Ok(word_id)) => return Some((word_id, self.end)),
                    Some(Err(e)) => {
                        self.err = Some(e);
                        return None;
                    }
                    None => self.ids = None,
                }
            }
            match self.trie_iter.next() {
                Some((value, end)) => {
                    match self.word_id_table.get(value as usize) {
                        Ok(ids) => {
                            self.ids = Some(ids);
                            self.end = end;
                        }
                        Err(e) => {
                            self.err = Some(e);
                            return None;
                        }
                    }
                }
                None => {
                    if let Some(e) = self.trie_iter.take_err() {
                        self.err = Some(e);
                    }
                    return None;
                }
            }
        }
    }
}
