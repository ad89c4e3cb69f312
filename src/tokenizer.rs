//! Viterbi-based tokenizer.

use crate::dictionary::character::CategorySet;
use crate::dictionary::word_id::WordId;
use crate::dictionary::LoadedDictionary;
use crate::errors::{Result, StaccatoError};
use crate::input::{InputText, InputTextBuilder};
use crate::lattice::{Lattice, Node};
use crate::morpheme::MorphemeList;

/// Granularity of the returned morphemes.
///
/// A is the finest unit, B an intermediate one, and C the coarsest
/// (named-entity scale); A and B are produced by expanding the split
/// arrays of the C-unit words on the best path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    A,
    B,
    C,
}

impl std::str::FromStr for Mode {
    type Err = StaccatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            _ => Err(StaccatoError::invalid_argument(
                "mode",
                format!("{s} is not one of A, B, C"),
            )),
        }
    }
}

/// Tokenizer over a loaded dictionary.
///
/// One instance serves one thread; the lattice inside is reused across
/// calls. Any number of tokenizers may share the same dictionary.
pub struct Tokenizer<'d, 'a> {
    dict: &'d LoadedDictionary<'a>,
    lattice: Lattice,
}

impl<'d, 'a> Tokenizer<'d, 'a> {
    pub fn new(dict: &'d LoadedDictionary<'a>) -> Self {
        Self {
            dict,
            lattice: Lattice::new(),
        }
    }

    /// Analyzes `text` and returns its morphemes at the requested
    /// granularity.
    pub fn tokenize(&mut self, mode: Mode, text: &str) -> Result<MorphemeList<'d, 'a>> {
        self.tokenize_inner(mode, text, true)
    }

    pub(crate) fn tokenize_inner(
        &mut self,
        mode: Mode,
        text: &str,
        enable_path_rewrite: bool,
    ) -> Result<MorphemeList<'d, 'a>> {
        let dict = self.dict;
        let mut builder = InputTextBuilder::new(text);

        if text.is_empty() {
            let input = builder.build(dict.grammar.character_category());
            return Ok(MorphemeList::new(
                input,
                &dict.grammar,
                &dict.lexicon_set,
                vec![],
            ));
        }

        for plugin in &dict.input_text_plugins {
            plugin.rewrite(&mut builder);
        }
        let input = builder.build(dict.grammar.character_category());

        self.build_lattice(&input)?;
        let mut path = self.lattice.best_path()?;

        if enable_path_rewrite {
            for plugin in &dict.path_rewrite_plugins {
                plugin.rewrite(&input, &mut path, &self.lattice, &dict.lexicon_set)?;
            }
        }
        self.lattice.clear();

        if mode != Mode::C {
            path = self.split_path(path, mode)?;
        }

        Ok(MorphemeList::new(
            input,
            &dict.grammar,
            &dict.lexicon_set,
            path,
        ))
    }

    /// Populates the lattice: lexicon matches and OOV candidates at every
    /// byte where a word may begin and a predecessor ends.
    fn build_lattice(&mut self, input: &InputText) -> Result<()> {
        let dict = self.dict;
        let bytes = input.bytes();
        self.lattice.resize(bytes.len());

        for i in 0..bytes.len() {
            if !input.can_bow(i) || !self.lattice.has_previous_node(i) {
                continue;
            }

            let mut has_words = false;
            let mut iterator = dict.lexicon_set.lookup(bytes, i);
            for (word_id, end) in &mut iterator {
                has_words = true;
                let node = Node::new(
                    dict.lexicon_set.left_id(word_id),
                    dict.lexicon_set.right_id(word_id),
                    dict.lexicon_set.cost(word_id),
                    word_id,
                );
                self.lattice.insert(i, end, node, &dict.grammar);
            }
            if let Some(e) = iterator.take_err() {
                return Err(e);
            }

            // OOV
            if !input.char_category_types(i).contains(CategorySet::NOOOVBOW) {
                for plugin in &dict.oov_provider_plugins {
                    for node in plugin.get_oov(input, i, has_words, &dict.lexicon_set)? {
                        has_words = true;
                        let (begin, end) = (node.begin, node.end);
                        self.lattice.insert(begin, end, node, &dict.grammar);
                    }
                }
            }
            if !has_words {
                if let Some(default_oov) = dict.oov_provider_plugins.first() {
                    for node in default_oov.get_oov(input, i, has_words, &dict.lexicon_set)? {
                        has_words = true;
                        let (begin, end) = (node.begin, node.end);
                        self.lattice.insert(begin, end, node, &dict.grammar);
                    }
                }
            }
            if !has_words {
                return Err(StaccatoError::NoMorpheme(i));
            }
        }
        self.lattice.connect_eos_node(&dict.grammar);
        Ok(())
    }

    /// Expands each path node by its A- or B-unit split array; spans of
    /// the sub-words follow their headword lengths.
    fn split_path(&self, path: Vec<Node>, mode: Mode) -> Result<Vec<Node>> {
        let dict = self.dict;
        let mut new_path = Vec::with_capacity(path.len());
        for node in path {
            let info = node.word_info(&dict.lexicon_set)?;
            let word_ids = match mode {
                Mode::A => &info.a_unit_split,
                _ => &info.b_unit_split,
            };
            if word_ids.len() <= 1 {
                new_path.push(node);
            } else {
                let mut offset = node.begin;
                for &raw in word_ids {
                    let mut sub = Node::new(0, 0, 0, WordId::from_raw(raw));
                    sub.begin = offset;
                    let sub_info = sub.word_info(&dict.lexicon_set)?;
                    offset += usize::from(sub_info.headword_length);
                    sub.end = offset;
                    new_path.push(sub);
                }
            }
        }
        Ok(new_path)
    }
}
