//! Morphemes, the analysis result handed to callers.

use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::dictionary::lexicon_set::LexiconSet;
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, StaccatoError};
use crate::input::InputText;
use crate::lattice::Node;
use crate::tokenizer::Mode;

/// Sequence of morphemes over one analyzed input.
pub struct MorphemeList<'d, 'a> {
    input: InputText,
    grammar: &'d Grammar<'a>,
    lexicon: &'d LexiconSet<'a>,
    path: Vec<Node>,
}

impl<'d, 'a> MorphemeList<'d, 'a> {
    pub(crate) fn new(
        input: InputText,
        grammar: &'d Grammar<'a>,
        lexicon: &'d LexiconSet<'a>,
        path: Vec<Node>,
    ) -> Self {
        Self {
            input,
            grammar,
            lexicon,
            path,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn get(&self, index: usize) -> Morpheme<'_, 'd, 'a> {
        Morpheme { list: self, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = Morpheme<'_, 'd, 'a>> {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Cost of the best path between the first and the last morpheme,
    /// the word cost of the first one included.
    pub fn internal_cost(&self) -> i32 {
        match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => {
                last.total_cost() - first.total_cost() + i32::from(first.path_cost())
            }
            _ => 0,
        }
    }

    fn split(&self, mode: Mode, index: usize, info: &WordInfo) -> Result<MorphemeList<'d, 'a>> {
        let word_ids = match mode {
            Mode::A => &info.a_unit_split,
            Mode::B => &info.b_unit_split,
            Mode::C => {
                return Ok(self.single(index));
            }
        };
        if word_ids.len() <= 1 {
            return Ok(self.single(index));
        }

        let mut offset = self.path[index].begin;
        let mut nodes = Vec::with_capacity(word_ids.len());
        for &raw in word_ids {
            let mut node = Node::new(0, 0, 0, WordId::from_raw(raw));
            node.begin = offset;
            let sub_info = node.word_info(self.lexicon)?;
            offset += usize::from(sub_info.headword_length);
            node.end = offset;
            nodes.push(node);
        }
        Ok(MorphemeList::new(
            self.input.clone(),
            self.grammar,
            self.lexicon,
            nodes,
        ))
    }

    fn single(&self, index: usize) -> MorphemeList<'d, 'a> {
        MorphemeList::new(
            self.input.clone(),
            self.grammar,
            self.lexicon,
            vec![self.path[index].clone()],
        )
    }
}

/// One morpheme of a [`MorphemeList`].
pub struct Morpheme<'m, 'd, 'a> {
    list: &'m MorphemeList<'d, 'a>,
    index: usize,
}

impl<'m, 'd, 'a> Morpheme<'m, 'd, 'a> {
    /// Begin byte position in the modified text.
    pub fn begin(&self) -> usize {
        self.node().begin
    }

    /// End byte position in the modified text.
    pub fn end(&self) -> usize {
        self.node().end
    }

    /// Surface, sliced out of the original (unrewritten) text.
    pub fn surface(&self) -> &str {
        self.list
            .input
            .original_substring(self.node().begin, self.node().end)
    }

    pub fn part_of_speech(&self) -> Result<&[String]> {
        let info = self.word_info()?;
        self.list.grammar.pos_string(info.pos_id).ok_or_else(|| {
            StaccatoError::corrupt_dictionary(format!("unknown POS id {}", info.pos_id))
        })
    }

    pub fn dictionary_form(&self) -> Result<String> {
        Ok(self.word_info()?.dictionary_form)
    }

    pub fn normalized_form(&self) -> Result<String> {
        Ok(self.word_info()?.normalized_form)
    }

    pub fn reading_form(&self) -> Result<String> {
        Ok(self.word_info()?.reading_form)
    }

    /// Re-splits this morpheme at a finer granularity.
    pub fn split(&self, mode: Mode) -> Result<MorphemeList<'d, 'a>> {
        let info = self.word_info()?;
        self.list.split(mode, self.index, &info)
    }

    pub fn is_oov(&self) -> bool {
        self.node().is_oov()
    }

    pub fn word_id(&self) -> WordId {
        self.node().word_id()
    }

    /// Index of the owning dictionary, `None` for synthesized morphemes.
    pub fn dictionary_id(&self) -> Option<u8> {
        self.node().dictionary_id()
    }

    pub fn word_info(&self) -> Result<WordInfo> {
        self.node().word_info(self.list.lexicon)
    }

    fn node(&self) -> &Node {
        &self.list.path[self.index]
    }
}

impl<'m, 'd, 'a> std::fmt::Debug for Morpheme<'m, 'd, 'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Morpheme")
            .field("surface", &self.surface())
            .field("begin", &self.begin())
            .field("end", &self.end())
            .field("is_oov", &self.is_oov())
            .finish()
    }
}
