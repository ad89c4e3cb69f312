//! Common settings in Staccato.

/// Connection parameters `(left_id, right_id, cost)` of the BOS sentinel.
pub const BOS_PARAMETER: (i16, i16, i16) = (0, 0, 0);

/// Connection parameters `(left_id, right_id, cost)` of the EOS sentinel.
pub const EOS_PARAMETER: (i16, i16, i16) = (0, 0, 0);

/// Sentinel cost denoting an impossible bigram in the connection matrix.
pub const INHIBITED_CONNECTION: i16 = i16::MAX;

/// Additional cost charged per morpheme when estimating the cost of a user
/// dictionary entry from the tokenization of its surface.
pub const USER_DICT_COST_PER_MORPH: i32 = -20;

/// Maximum number of composable dictionaries, the system one included.
pub const MAX_DICTIONARIES: usize = 16;

/// Depth of a part-of-speech entry.
pub const POS_DEPTH: usize = 6;
