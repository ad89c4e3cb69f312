//! Editors of the connection matrix, run once during dictionary init.

use crate::common::INHIBITED_CONNECTION;
use crate::dictionary::grammar::Grammar;

/// Marks configured `(left_id, right_id)` pairs as impossible bigrams.
pub struct InhibitConnectionPlugin {
    inhibited_pairs: Vec<(i16, i16)>,
}

impl InhibitConnectionPlugin {
    pub fn new(inhibited_pairs: Vec<(i16, i16)>) -> Self {
        Self { inhibited_pairs }
    }

    pub fn edit(&self, grammar: &mut Grammar) {
        for &(left_id, right_id) in &self.inhibited_pairs {
            grammar.set_connect_cost(left_id, right_id, INHIBITED_CONNECTION);
        }
    }
}
