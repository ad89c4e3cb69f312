//! Lattice of morpheme candidates and its minimum-cost path search.

use crate::common::{BOS_PARAMETER, EOS_PARAMETER, INHIBITED_CONNECTION};
use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::dictionary::lexicon_set::LexiconSet;
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, StaccatoError};

const MAX_COST: i32 = i32::MAX;

/// Candidate node spanning a byte range of the input.
#[derive(Default, Clone)]
pub struct Node {
    pub begin: usize,
    pub end: usize,
    left_id: i16,
    right_id: i16,
    cost: i16,
    word_id: WordId,
    total_cost: i32,
    best_prev: Option<usize>,
    is_connected_to_bos: bool,
    is_defined: bool,
    is_oov: bool,
    extra_word_info: Option<WordInfo>,
}

impl Node {
    /// A node backed by a dictionary word.
    pub fn new(left_id: i16, right_id: i16, cost: i16, word_id: WordId) -> Self {
        Self {
            left_id,
            right_id,
            cost,
            word_id,
            is_defined: true,
            ..Default::default()
        }
    }

    /// An OOV node; its metadata is attached with
    /// [`set_word_info`](Self::set_word_info).
    pub fn new_oov() -> Self {
        Self {
            is_oov: true,
            ..Default::default()
        }
    }

    pub fn set_parameter(&mut self, left_id: i16, right_id: i16, cost: i16) {
        self.left_id = left_id;
        self.right_id = right_id;
        self.cost = cost;
    }

    pub fn set_range(&mut self, begin: usize, end: usize) {
        self.begin = begin;
        self.end = end;
    }

    pub fn set_word_info(&mut self, word_info: WordInfo) {
        self.extra_word_info = Some(word_info);
        self.is_defined = true;
    }

    #[inline(always)]
    pub const fn left_id(&self) -> i16 {
        self.left_id
    }

    #[inline(always)]
    pub const fn right_id(&self) -> i16 {
        self.right_id
    }

    /// Word cost of this node alone.
    #[inline(always)]
    pub const fn path_cost(&self) -> i16 {
        self.cost
    }

    #[inline(always)]
    pub const fn total_cost(&self) -> i32 {
        self.total_cost
    }

    #[inline(always)]
    pub const fn word_id(&self) -> WordId {
        self.word_id
    }

    #[inline(always)]
    pub const fn is_oov(&self) -> bool {
        self.is_oov
    }

    #[inline(always)]
    pub const fn is_connected_to_bos(&self) -> bool {
        self.is_connected_to_bos
    }

    /// Dictionary index of the backing word, `None` for sentinels and
    /// synthesized nodes.
    pub fn dictionary_id(&self) -> Option<u8> {
        if !self.is_defined || self.extra_word_info.is_some() {
            return None;
        }
        Some(self.word_id.dic_id())
    }

    /// Metadata of this node, from the attached extra info or the lexicon.
    pub fn word_info(&self, lexicon: &LexiconSet) -> Result<WordInfo> {
        if !self.is_defined {
            return Err(StaccatoError::invalid_argument(
                "node",
                "this node has no word info",
            ));
        }
        if let Some(info) = &self.extra_word_info {
            return Ok(info.clone());
        }
        lexicon.word_info(self.word_id)
    }
}

/// Array of candidate-node lists indexed by end byte position.
///
/// A BOS sentinel occupies position 0; the EOS sentinel is created at
/// resize time. The structure is reused across tokenize calls.
pub struct Lattice {
    end_lists: Vec<Vec<Node>>,
    eos_node: Option<Node>,
    size: usize,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new()
    }
}

impl Lattice {
    pub fn new() -> Self {
        let mut bos_node = Node::default();
        let (left, right, cost) = BOS_PARAMETER;
        bos_node.set_parameter(left, right, cost);
        bos_node.is_connected_to_bos = true;
        Self {
            end_lists: vec![vec![bos_node]],
            eos_node: None,
            size: 0,
        }
    }

    /// Prepares the lattice for an input of `size` bytes, clearing nodes of
    /// the previous call and creating a fresh EOS sentinel.
    pub fn resize(&mut self, size: usize) {
        self.clear();
        if size + 1 > self.end_lists.len() {
            self.end_lists.resize_with(size + 1, Vec::new);
        }
        self.size = size;
        let mut eos_node = Node::default();
        let (left, right, cost) = EOS_PARAMETER;
        eos_node.set_parameter(left, right, cost);
        eos_node.set_range(size, size);
        self.eos_node = Some(eos_node);
    }

    /// Drops every node but the BOS sentinel.
    pub fn clear(&mut self) {
        for list in self.end_lists.iter_mut().skip(1) {
            list.clear();
        }
        self.eos_node = None;
    }

    /// Checks whether at least one node ends at `index`.
    #[inline(always)]
    pub fn has_previous_node(&self, index: usize) -> bool {
        self.end_lists.get(index).map_or(false, |l| !l.is_empty())
    }

    pub fn nodes_with_end(&self, end: usize) -> &[Node] {
        &self.end_lists[end]
    }

    /// Minimum-word-cost node spanning exactly `begin..end`, if any.
    pub fn minimum_node(&self, begin: usize, end: usize) -> Option<&Node> {
        self.end_lists[end]
            .iter()
            .filter(|n| n.begin == begin)
            .min_by_key(|n| n.cost)
    }

    /// Inserts a node spanning `begin..end` and links it to its cheapest
    /// predecessor.
    pub fn insert(&mut self, begin: usize, end: usize, mut node: Node, grammar: &Grammar) {
        node.set_range(begin, end);
        self.connect_node(&mut node, grammar);
        self.end_lists[end].push(node);
    }

    /// Computes `node.total_cost` over predecessors ending at `node.begin`.
    ///
    /// Inhibited connections are excluded; ties keep the earliest inserted
    /// predecessor because the comparison is strict.
    fn connect_node(&self, node: &mut Node, grammar: &Grammar) {
        node.total_cost = MAX_COST;
        node.best_prev = None;
        for (i, left_node) in self.end_lists[node.begin].iter().enumerate() {
            if !left_node.is_connected_to_bos {
                continue;
            }
            let connect_cost = grammar.connect_cost(left_node.right_id, node.left_id);
            if connect_cost == INHIBITED_CONNECTION {
                continue; // this connection is not allowed
            }
            let cost = left_node.total_cost + i32::from(connect_cost);
            if cost < node.total_cost {
                node.total_cost = cost;
                node.best_prev = Some(i);
            }
        }
        node.is_connected_to_bos = node.best_prev.is_some();
        node.total_cost = node.total_cost.saturating_add(i32::from(node.cost));
    }

    /// Connects the EOS sentinel to the nodes ending at the input end.
    pub fn connect_eos_node(&mut self, grammar: &Grammar) {
        let mut eos_node = self.eos_node.take().unwrap();
        self.connect_node(&mut eos_node, grammar);
        self.eos_node = Some(eos_node);
    }

    /// Backtracks the cheapest path from EOS to BOS, exclusive, and returns
    /// it in forward order.
    pub fn best_path(&self) -> Result<Vec<Node>> {
        let eos_node = self.eos_node.as_ref().unwrap();
        if !eos_node.is_connected_to_bos {
            return Err(StaccatoError::invalid_argument(
                "lattice",
                "EOS is not connected to BOS",
            ));
        }
        let mut path = vec![];
        let mut list_pos = eos_node.begin;
        let mut index = eos_node.best_prev.unwrap();
        loop {
            if list_pos == 0 {
                break;
            }
            let node = &self.end_lists[list_pos][index];
            path.push(node.clone());
            list_pos = node.begin;
            index = node.best_prev.unwrap();
        }
        path.reverse();
        Ok(path)
    }
}
