use crate::common::MAX_DICTIONARIES;
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::dictionary::lexicon::{Lexicon, LexiconIter};
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, StaccatoError};

/// Composition of one system lexicon and up to fifteen user lexicons into
/// a single word-ID space.
///
/// Word IDs handed out carry the dictionary index in their high 4 bits;
/// every parameter or metadata access decodes that index first.
pub struct LexiconSet<'a> {
    lexicons: Vec<Lexicon<'a>>,
    pos_offsets: Vec<i16>,
}

impl<'a> LexiconSet<'a> {
    pub fn new(system: Lexicon<'a>) -> Self {
        Self {
            lexicons: vec![system],
            pos_offsets: vec![0],
        }
    }

    /// Appends a user lexicon. `pos_offset` is the size of the combined POS
    /// table before this dictionary's own entries were added.
    pub fn add(&mut self, lexicon: Lexicon<'a>, pos_offset: i16) -> Result<()> {
        if self.is_full() {
            return Err(StaccatoError::TooManyDictionaries);
        }
        self.lexicons.push(lexicon);
        self.pos_offsets.push(pos_offset);
        Ok(())
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.lexicons.len() >= MAX_DICTIONARIES
    }

    #[inline(always)]
    pub fn num_dictionaries(&self) -> usize {
        self.lexicons.len()
    }

    /// All composite matches at `offset`, user dictionaries first in load
    /// order, the system dictionary last.
    pub fn lookup<'s, 'k>(&'s self, input: &'k [u8], offset: usize) -> LexiconSetIter<'s, 'a, 'k> {
        let order: Vec<u8> = (1..self.lexicons.len() as u8).chain([0]).collect();
        LexiconSetIter {
            set: self,
            input,
            offset,
            order,
            position: 0,
            current: None,
            err: None,
        }
    }

    pub fn left_id(&self, word_id: WordId) -> i16 {
        self.lexicons[usize::from(word_id.dic_id())].left_id(word_id.word_id())
    }

    pub fn right_id(&self, word_id: WordId) -> i16 {
        self.lexicons[usize::from(word_id.dic_id())].right_id(word_id.word_id())
    }

    pub fn cost(&self, word_id: WordId) -> i16 {
        self.lexicons[usize::from(word_id.dic_id())].cost(word_id.word_id())
    }

    /// Decodes the owning dictionary, then remaps user-defined POS ids and
    /// foreign split references into the composite space.
    pub fn word_info(&self, word_id: WordId) -> Result<WordInfo> {
        let dic_id = usize::from(word_id.dic_id());
        let mut info = self.lexicons[dic_id].word_info(word_id.word_id())?;
        if dic_id > 0 && info.pos_id >= self.pos_offsets[1] {
            // A part-of-speech defined by the user dictionary itself.
            info.pos_id = info.pos_id - self.pos_offsets[1] + self.pos_offsets[dic_id];
        }
        convert_split(&mut info.a_unit_split, word_id.dic_id());
        convert_split(&mut info.b_unit_split, word_id.dic_id());
        convert_split(&mut info.word_structure, word_id.dic_id());
        Ok(info)
    }

    pub fn size(&self) -> u32 {
        self.lexicons.iter().map(Lexicon::size).sum()
    }
}

/// Split entries carrying a nonzero dictionary index refer to the
/// dictionary that contains them; rewrite them to its composite index.
fn convert_split(split: &mut [u32], dic_id: u8) {
    for id in split.iter_mut() {
        let word_id = WordId::from_raw(*id);
        if word_id.dic_id() > 0 {
            *id = WordId::compose(dic_id, word_id.word_id()).raw();
        }
    }
}

/// Lazy producer of composite lexicon matches.
pub struct LexiconSetIter<'s, 'a, 'k> {
    set: &'s LexiconSet<'a>,
    input: &'k [u8],
    offset: usize,
    order: Vec<u8>,
    position: usize,
    current: Option<(u8, LexiconIter<'a, 'k>)>,
    err: Option<StaccatoError>,
}

impl<'s, 'a, 'k> LexiconSetIter<'s, 'a, 'k> {
    /// Terminal error of the walk, if any.
    pub fn err(&self) -> Option<&StaccatoError> {
        self.err.as_ref()
    }

    pub(crate) fn take_err(&mut self) -> Option<StaccatoError> {
        self.err.take()
    }
}

impl<'s, 'a, 'k> Iterator for LexiconSetIter<'s, 'a, 'k> {
    type Item = (WordId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.err.is_some() {
            return None;
        }
        loop {
            if let Some((dic_id, it)) = self.current.as_mut() {
                match it.next() {
                    Some((word_id, end)) => {
                        return Some((WordId::compose(*dic_id, word_id), end));
                    }
                    None => {
                        if let Some(e) = it.take_err() {
                            self.err = Some(e);
                            return None;
                        }
                        self.current = None;
                    }
                }
            }
            let dic_id = *self.order.get(self.position)?;
            self.position += 1;
            let it = self.set.lexicons[usize::from(dic_id)].lookup(self.input, self.offset);
            self.current = Some((dic_id, it));
        }
    }
}
