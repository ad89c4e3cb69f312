//! Providers of out-of-vocabulary candidate nodes.

use std::io::{prelude::*, BufReader, Read};

use hashbrown::HashMap;

use crate::dictionary::character::CategorySet;
use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::errors::{Result, StaccatoError};
use crate::input::InputText;
use crate::lattice::Node;
use crate::utils;

#[derive(Clone, Copy)]
struct CategoryInfo {
    is_invoke: bool,
    is_group: bool,
    length: usize,
}

#[derive(Clone, Copy)]
struct OovEntry {
    left_id: i16,
    right_id: i16,
    cost: i16,
    pos_id: i16,
}

/// MeCab-style provider driven by `char.def` category parameters and
/// `unk.def` per-category templates.
pub struct MecabOovPlugin {
    categories: HashMap<u32, CategoryInfo>,
    oov_list: HashMap<u32, Vec<OovEntry>>,
}

impl MecabOovPlugin {
    pub fn from_readers<C, U>(char_def: C, unk_def: U, grammar: &Grammar) -> Result<Self>
    where
        C: Read,
        U: Read,
    {
        let categories = Self::read_category_parameters(char_def)?;
        let oov_list = Self::read_oov_entries(unk_def, &categories, grammar)?;
        Ok(Self {
            categories,
            oov_list,
        })
    }

    /// Parses the non-range lines of `char.def`:
    /// `CATEGORY INVOKE GROUP LENGTH`.
    fn read_category_parameters<R>(rdr: R) -> Result<HashMap<u32, CategoryInfo>>
    where
        R: Read,
    {
        let mut categories = HashMap::new();
        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if utils::is_skip_line(&line) {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            if cols.len() < 2 {
                return Err(StaccatoError::invalid_format(
                    "char.def",
                    format!("invalid format at line {}", i + 1),
                ));
            }
            if cols[0].starts_with("0x") {
                continue;
            }
            if cols.len() < 4 {
                return Err(StaccatoError::invalid_format(
                    "char.def",
                    format!("invalid format at line {}", i + 1),
                ));
            }
            let category: CategorySet = cols[0].parse()?;
            if categories.contains_key(&category.bits()) {
                return Err(StaccatoError::invalid_format(
                    "char.def",
                    format!("{} is already defined at line {}", cols[0], i + 1),
                ));
            }
            let length = cols[3].parse().map_err(|_| {
                StaccatoError::invalid_format(
                    "char.def",
                    format!("{} is an invalid number at line {}", cols[3], i + 1),
                )
            })?;
            categories.insert(
                category.bits(),
                CategoryInfo {
                    is_invoke: cols[1] != "0",
                    is_group: cols[2] != "0",
                    length,
                },
            );
        }
        Ok(categories)
    }

    /// Parses `unk.def`: CSV rows of
    /// `category,left_id,right_id,cost,pos1,…,pos6`.
    fn read_oov_entries<R>(
        rdr: R,
        categories: &HashMap<u32, CategoryInfo>,
        grammar: &Grammar,
    ) -> Result<HashMap<u32, Vec<OovEntry>>>
    where
        R: Read,
    {
        let mut oov_list: HashMap<u32, Vec<OovEntry>> = HashMap::new();
        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let cols = utils::parse_csv_row(&line);
            if cols.len() < 10 {
                return Err(StaccatoError::invalid_format(
                    "unk.def",
                    format!("invalid format at line {}", i + 1),
                ));
            }
            let category: CategorySet = cols[0].parse().map_err(|_| {
                StaccatoError::invalid_format(
                    "unk.def",
                    format!("{} is an invalid type at line {}", cols[0], i + 1),
                )
            })?;
            if !categories.contains_key(&category.bits()) {
                return Err(StaccatoError::invalid_format(
                    "unk.def",
                    format!("{} is undefined at line {}", cols[0], i + 1),
                ));
            }

            let left_id = cols[1].parse()?;
            let right_id = cols[2].parse()?;
            let cost = cols[3].parse()?;
            let pos_id = grammar.pos_id(&cols[4..10]).ok_or_else(|| {
                StaccatoError::invalid_format(
                    "unk.def",
                    format!("unknown part of speech at line {}", i + 1),
                )
            })?;

            oov_list.entry(category.bits()).or_default().push(OovEntry {
                left_id,
                right_id,
                cost,
                pos_id,
            });
        }
        Ok(oov_list)
    }

    pub fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
    ) -> Result<Vec<Node>> {
        let mut nodes = vec![];
        let length = input.char_category_continuous_length(offset);
        if length == 0 {
            return Ok(nodes);
        }
        let category_types = input.char_category_types(offset);
        for t in category_types.members() {
            let Some(cinfo) = self.categories.get(&t.bits()) else {
                continue;
            };
            let Some(oovs) = self.oov_list.get(&t.bits()) else {
                continue;
            };
            let mut rest_length = length;
            if cinfo.is_group && (cinfo.is_invoke || !has_other_words) {
                let surface = input.substring(offset, offset + length);
                for oov in oovs {
                    nodes.push(oov_node(&surface, oov, length));
                }
                rest_length -= 1;
            }
            if cinfo.is_invoke || !has_other_words {
                for i in 1..=cinfo.length {
                    let sublength = input.code_points_offset_length(offset, i);
                    if sublength > rest_length {
                        break;
                    }
                    let surface = input.substring(offset, offset + sublength);
                    for oov in oovs {
                        nodes.push(oov_node(&surface, oov, sublength));
                    }
                }
            }
        }
        Ok(nodes)
    }
}

/// Minimal provider: a single one-character node whenever the lexicon had
/// no candidate.
pub struct SimpleOovPlugin {
    left_id: i16,
    right_id: i16,
    cost: i16,
    oov_pos_id: i16,
}

impl SimpleOovPlugin {
    pub fn new<S>(
        grammar: &Grammar,
        oov_pos: &[S],
        left_id: i16,
        right_id: i16,
        cost: i16,
    ) -> Result<Self>
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
            left_id,
            right_id,
            cost,
            oov_pos_id,
        })
    }

    pub fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
    ) -> Result<Vec<Node>> {
        if has_other_words {
            return Ok(vec![]);
        }
        let length = input.code_points_offset_length(offset, 1);
        let surface = input.substring(offset, offset + length);
        let entry = OovEntry {
            left_id: self.left_id,
            right_id: self.right_id,
            cost: self.cost,
            pos_id: self.oov_pos_id,
        };
        Ok(vec![oov_node(&surface, &entry, length)])
    }
}

fn oov_node(surface: &str, oov: &OovEntry, byte_length: usize) -> Node {
    let mut node = Node::new_oov();
    node.set_parameter(oov.left_id, oov.right_id, oov.cost);
    node.set_word_info(WordInfo {
        surface: surface.to_string(),
        headword_length: byte_length as u16,
        pos_id: oov.pos_id,
        normalized_form: surface.to_string(),
        dictionary_form_word_id: -1,
        dictionary_form: surface.to_string(),
        reading_form: String::new(),
        a_unit_split: vec![],
        b_unit_split: vec![],
        word_structure: vec![],
    });
    node
}
