//! # Staccato
//!
//! Staccato is a Viterbi-based Japanese morphological analyzer working
//! over memory-mapped binary dictionaries with double-array tries.
//!
//! ## Examples
//!
//! ```no_run
//! use staccato::dictionary::character::CharacterCategory;
//! use staccato::dictionary::read::TextEncoding;
//! use staccato::{Dictionary, LoadedDictionary, Mode, Tokenizer};
//!
//! let storage = Dictionary::open("system.dic", &[]).unwrap();
//! let char_def = std::fs::File::open("char.def").unwrap();
//! let category = CharacterCategory::from_reader(char_def).unwrap();
//! let dict = LoadedDictionary::from_system_dictionary(
//!     storage.system(),
//!     category,
//!     TextEncoding::Utf8,
//! )
//! .unwrap();
//!
//! let mut tokenizer = Tokenizer::new(&dict);
//! let morphemes = tokenizer.tokenize(Mode::C, "京都東京都").unwrap();
//! for m in morphemes.iter() {
//!     println!("{}", m.surface());
//! }
//! ```
#[cfg(target_pointer_width = "16")]
compile_error!("`target_pointer_width` must be larger than or equal to 32");

pub mod common;
pub mod dictionary;
pub mod errors;
pub mod input;
pub mod lattice;
pub mod morpheme;
pub mod plugin;
pub mod tokenizer;
pub mod trie;
mod utils;

#[cfg(test)]
mod tests;

pub use dictionary::{Dictionary, LoadedDictionary};
pub use morpheme::{Morpheme, MorphemeList};
pub use tokenizer::{Mode, Tokenizer};
