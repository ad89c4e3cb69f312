//! Plugins rewriting the best path before morphemes are handed out.

use crate::dictionary::character::CategorySet;
use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::dictionary::lexicon_set::LexiconSet;
use crate::errors::{Result, StaccatoError};
use crate::input::InputText;
use crate::lattice::{Lattice, Node};
use crate::plugin::numeric::{ErrorState, NumericParser};

/// Category intersection over the byte span of a node.
fn char_category_types(input: &InputText, node: &Node) -> CategorySet {
    input.char_category_types_range(node.begin, node.end)
}

/// Replaces `path[begin..end]` with a single synthetic node carrying the
/// concatenated surfaces and forms. The POS is taken from the first node.
pub(crate) fn concatenate_nodes(
    path: &mut Vec<Node>,
    begin: usize,
    end: usize,
    lexicon: &LexiconSet,
    normalized_form: Option<String>,
) -> Result<()> {
    if begin >= end {
        return Err(StaccatoError::invalid_argument(
            "path",
            "the range to concatenate is empty",
        ));
    }
    let b = path[begin].begin;
    let e = path[end - 1].end;

    let infos: Vec<WordInfo> = path[begin..end]
        .iter()
        .map(|n| n.word_info(lexicon))
        .collect::<Result<_>>()?;

    let mut surface = String::new();
    let mut headword_length = 0;
    let mut concat_normalized = String::new();
    let mut dictionary_form = String::new();
    let mut reading_form = String::new();
    for info in &infos {
        surface.push_str(&info.surface);
        headword_length += info.headword_length;
        concat_normalized.push_str(&info.normalized_form);
        dictionary_form.push_str(&info.dictionary_form);
        reading_form.push_str(&info.reading_form);
    }

    let mut node = Node::default();
    node.set_range(b, e);
    node.set_word_info(WordInfo {
        surface,
        headword_length,
        pos_id: infos[0].pos_id,
        normalized_form: normalized_form.unwrap_or(concat_normalized),
        dictionary_form_word_id: -1,
        dictionary_form,
        reading_form,
        a_unit_split: vec![],
        b_unit_split: vec![],
        word_structure: vec![],
    });
    path.splice(begin..end, [node]);
    Ok(())
}

/// Replaces `path[begin..end]` with the cheapest lattice node spanning the
/// same bytes, or with a synthetic OOV node when none exists.
pub(crate) fn concatenate_oov(
    path: &mut Vec<Node>,
    begin: usize,
    end: usize,
    pos_id: i16,
    lattice: &Lattice,
    lexicon: &LexiconSet,
) -> Result<()> {
    if begin >= end {
        return Err(StaccatoError::invalid_argument(
            "path",
            "the range to concatenate is empty",
        ));
    }
    let b = path[begin].begin;
    let e = path[end - 1].end;

    if let Some(existing) = lattice.minimum_node(b, e) {
        let node = existing.clone();
        path.splice(begin..end, [node]);
        return Ok(());
    }

    let infos: Vec<WordInfo> = path[begin..end]
        .iter()
        .map(|n| n.word_info(lexicon))
        .collect::<Result<_>>()?;
    let mut surface = String::new();
    let mut headword_length = 0;
    for info in &infos {
        surface.push_str(&info.surface);
        headword_length += info.headword_length;
    }

    let mut node = Node::new_oov();
    node.set_range(b, e);
    node.set_word_info(WordInfo {
        surface: surface.clone(),
        headword_length,
        pos_id,
        normalized_form: surface.clone(),
        dictionary_form_word_id: -1,
        dictionary_form: surface,
        reading_form: String::new(),
        a_unit_split: vec![],
        b_unit_split: vec![],
        word_structure: vec![],
    });
    path.splice(begin..end, [node]);
    Ok(())
}

/// Joins runs of numeric morphemes into one, optionally replacing the
/// normalized form with the parsed decimal value.
pub struct JoinNumericPlugin {
    numeric_pos_id: i16,
    enable_normalize: bool,
}

impl JoinNumericPlugin {
    pub const NUMERIC_POS: [&'static str; 6] = ["名詞", "数詞", "*", "*", "*", "*"];

    pub fn new(grammar: &Grammar, enable_normalize: Option<bool>) -> Self {
        Self {
            numeric_pos_id: grammar.pos_id(&Self::NUMERIC_POS).unwrap_or(-1),
            enable_normalize: enable_normalize.unwrap_or(true),
        }
    }

    fn concat(
        &self,
        path: &mut Vec<Node>,
        begin: usize,
        end: usize,
        lexicon: &LexiconSet,
        parser: &mut NumericParser,
    ) -> Result<()> {
        let info = path[begin].word_info(lexicon)?;
        if info.pos_id != self.numeric_pos_id {
            return Ok(());
        }
        if self.enable_normalize {
            let normalized = parser.normalized();
            if end - begin > 1 || normalized != info.normalized_form {
                concatenate_nodes(path, begin, end, lexicon, Some(normalized))?;
            }
        } else if end - begin > 1 {
            concatenate_nodes(path, begin, end, lexicon, None)?;
        }
        Ok(())
    }

    pub fn rewrite(
        &self,
        input: &InputText,
        path: &mut Vec<Node>,
        _lattice: &Lattice,
        lexicon: &LexiconSet,
    ) -> Result<()> {
        let mut begin_index: i64 = -1;
        let mut comma_as_digit = true;
        let mut period_as_digit = true;
        let mut parser = NumericParser::new();

        let mut i: i64 = 0;
        while i < path.len() as i64 {
            let node = &path[i as usize];
            let types = char_category_types(input, node);
            let info = node.word_info(lexicon)?;
            let s = info.normalized_form.clone();
            if types.intersects(CategorySet::NUMERIC)
                || types.intersects(CategorySet::KANJINUMERIC)
                || (period_as_digit && s == ".")
                || (comma_as_digit && s == ",")
            {
                if begin_index < 0 {
                    parser.clear();
                    begin_index = i;
                }

                for c in s.chars() {
                    if !parser.append(c) {
                        if begin_index >= 0 {
                            match parser.error_state {
                                ErrorState::Comma => {
                                    comma_as_digit = false;
                                    i = begin_index - 1;
                                }
                                ErrorState::Point => {
                                    period_as_digit = false;
                                    i = begin_index - 1;
                                }
                                ErrorState::None => {}
                            }
                            begin_index = -1;
                        }
                        break;
                    }
                }
            } else {
                if begin_index >= 0 {
                    if parser.done() {
                        self.concat(path, begin_index as usize, i as usize, lexicon, &mut parser)?;
                        i = begin_index + 1;
                    } else {
                        let prev_info = path[(i - 1) as usize].word_info(lexicon)?;
                        let ss = prev_info.normalized_form;
                        if (parser.error_state == ErrorState::Comma && ss == ",")
                            || (parser.error_state == ErrorState::Point && ss == ".")
                        {
                            self.concat(
                                path,
                                begin_index as usize,
                                (i - 1) as usize,
                                lexicon,
                                &mut parser,
                            )?;
                            i = begin_index + 2;
                        }
                    }
                }
                begin_index = -1;
                if !comma_as_digit && s != "," {
                    comma_as_digit = true;
                }
                if !period_as_digit && s != "." {
                    period_as_digit = true;
                }
            }
            i += 1;
        }

        if begin_index >= 0 {
            let len = path.len();
            if parser.done() {
                self.concat(path, begin_index as usize, len, lexicon, &mut parser)?;
            } else {
                let last_info = path[len - 1].word_info(lexicon)?;
                let ss = last_info.normalized_form;
                if (parser.error_state == ErrorState::Comma && ss == ",")
                    || (parser.error_state == ErrorState::Point && ss == ".")
                {
                    self.concat(path, begin_index as usize, len - 1, lexicon, &mut parser)?;
                }
            }
        }
        Ok(())
    }
}

/// Extends katakana runs around OOV or too-short morphemes into one OOV
/// morpheme of the configured part of speech.
pub struct JoinKatakanaOovPlugin {
    oov_pos_id: i16,
    min_length: usize,
}

impl JoinKatakanaOovPlugin {
    pub fn new<S>(grammar: &Grammar, oov_pos: &[S], min_length: Option<usize>) -> Result<Self>
    where
        S: AsRef<str>,
    {
        if oov_pos.is_empty() {
            return Err(StaccatoError::config("oovPOS is not specified"));
        }
        let oov_pos_id = grammar
            .pos_id(oov_pos)
            .ok_or_else(|| StaccatoError::config("oovPOS is invalid"))?;
        Ok(Self {
            oov_pos_id,
            min_length: min_length.unwrap_or(1),
        })
    }

    fn is_shorter(&self, input: &InputText, node: &Node) -> bool {
        input.code_point_count(node.begin, node.end) < self.min_length
    }

    pub fn rewrite(
        &self,
        input: &InputText,
        path: &mut Vec<Node>,
        lattice: &Lattice,
        lexicon: &LexiconSet,
    ) -> Result<()> {
        let is_katakana =
            |node: &Node| char_category_types(input, node).intersects(CategorySet::KATAKANA);
        let can_oov_bow = |node: &Node| {
            !char_category_types(input, node).intersects(CategorySet::NOOOVBOW)
        };

        let mut i = 0;
        while i < path.len() {
            let node = &path[i];
            if (node.is_oov() || self.is_shorter(input, node)) && is_katakana(node) {
                let mut begin = i as i64 - 1;
                while begin >= 0 {
                    if !is_katakana(&path[begin as usize]) {
                        begin += 1;
                        break;
                    }
                    begin -= 1;
                }
                let mut begin = begin.max(0) as usize;
                let mut end = i + 1;
                while end < path.len() {
                    if !is_katakana(&path[end]) {
                        break;
                    }
                    end += 1;
                }
                while begin != end && !can_oov_bow(&path[begin]) {
                    begin += 1;
                }
                if end - begin > 1 {
                    concatenate_oov(path, begin, end, self.oov_pos_id, lattice, lexicon)?;
                    i = begin + 2;
                    continue;
                }
            }
            i += 1;
        }
        Ok(())
    }
}
