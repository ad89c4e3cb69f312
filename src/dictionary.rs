//! Dictionaries: memory-mapped storage and the parsed runtime view.

pub mod build;
pub mod character;
pub mod grammar;
pub mod header;
pub mod lexicon;
pub mod lexicon_set;
pub mod read;
pub mod word_id;

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::common::USER_DICT_COST_PER_MORPH;
use crate::errors::{Result, StaccatoError};
use crate::plugin::{
    EditConnectionCostPlugin, InputTextPlugin, OovProviderPlugin, PathRewritePlugin,
};
use crate::tokenizer::{Mode, Tokenizer};
use character::CharacterCategory;
use grammar::Grammar;
use header::{DictionaryHeader, HEADER_STORAGE_SIZE};
use lexicon::Lexicon;
use lexicon_set::LexiconSet;
use read::TextEncoding;

/// Owner of the memory-mapped dictionary files.
///
/// Every runtime structure borrows from these mappings, so the borrow
/// checker makes dropping the storage while a [`LoadedDictionary`] or a
/// tokenizer exists a hard error.
pub struct Dictionary {
    system: Mmap,
    users: Vec<Mmap>,
}

impl Dictionary {
    /// Maps the system dictionary and zero or more user dictionaries
    /// read-only.
    pub fn open<P>(system_path: P, user_paths: &[P]) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let system = Self::map_file(system_path.as_ref())?;
        let mut users = Vec::with_capacity(user_paths.len());
        for path in user_paths {
            users.push(Self::map_file(path.as_ref())?);
        }
        Ok(Self { system, users })
    }

    fn map_file(path: &Path) -> Result<Mmap> {
        let file = File::open(path)?;
        // Safety: the mapping is read-only and dictionary files are not
        // modified while in use.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), bytes = mmap.len(), "mapped a dictionary file");
        Ok(mmap)
    }

    #[inline(always)]
    pub fn system(&self) -> &[u8] {
        &self.system
    }

    pub fn users(&self) -> impl Iterator<Item = &[u8]> {
        self.users.iter().map(|m| &m[..])
    }
}

/// Parsed dictionary: the grammar, the composed lexicons, and the plugin
/// sets driving tokenization.
///
/// Borrowed views reference the dictionary buffers; mutations of the
/// connection matrix and of user-dictionary costs happen here, during
/// initialization, before any tokenizer is handed out.
pub struct LoadedDictionary<'a> {
    pub(crate) grammar: Grammar<'a>,
    pub(crate) lexicon_set: LexiconSet<'a>,
    pub(crate) input_text_plugins: Vec<InputTextPlugin>,
    pub(crate) oov_provider_plugins: Vec<OovProviderPlugin>,
    pub(crate) path_rewrite_plugins: Vec<PathRewritePlugin>,
}

impl<'a> LoadedDictionary<'a> {
    /// Parses a system dictionary and attaches the character categories.
    pub fn from_system_dictionary(
        bytes: &'a [u8],
        char_category: CharacterCategory,
        encoding: TextEncoding,
    ) -> Result<Self> {
        let header = DictionaryHeader::parse(bytes)?;
        if header.version != header::DictionaryVersion::System {
            return Err(StaccatoError::corrupt_dictionary(
                "not a system dictionary",
            ));
        }
        let mut grammar = Grammar::parse(bytes, HEADER_STORAGE_SIZE, encoding)?;
        grammar.set_character_category(char_category);
        let lexicon = Lexicon::parse(
            bytes,
            HEADER_STORAGE_SIZE + grammar.storage_size(),
            encoding,
        )?;
        debug!(words = lexicon.size(), "loaded the system dictionary");
        Ok(Self {
            grammar,
            lexicon_set: LexiconSet::new(lexicon),
            input_text_plugins: vec![],
            oov_provider_plugins: vec![],
            path_rewrite_plugins: vec![],
        })
    }

    /// Applies connection-cost edits. Must run before tokenizers are
    /// created; the first edit copies the matrix out of the mapping.
    pub fn edit_connection_costs(&mut self, plugins: &[EditConnectionCostPlugin]) {
        for plugin in plugins {
            plugin.edit(&mut self.grammar);
        }
    }

    pub fn add_input_text_plugin(&mut self, plugin: InputTextPlugin) {
        self.input_text_plugins.push(plugin);
    }

    /// The first registered provider doubles as the fallback emitting a
    /// candidate when nothing else matched.
    pub fn add_oov_provider_plugin(&mut self, plugin: OovProviderPlugin) {
        self.oov_provider_plugins.push(plugin);
    }

    pub fn add_path_rewrite_plugin(&mut self, plugin: PathRewritePlugin) {
        self.path_rewrite_plugins.push(plugin);
    }

    /// Attaches a user dictionary.
    ///
    /// A v2 dictionary extends the POS table with its own entries. Words
    /// with a placeholder cost are priced by tokenizing their surface at
    /// the coarsest granularity with the dictionaries loaded so far.
    pub fn add_user_dictionary(&mut self, bytes: &'a [u8], encoding: TextEncoding) -> Result<()> {
        if self.lexicon_set.is_full() {
            return Err(StaccatoError::TooManyDictionaries);
        }
        let header = DictionaryHeader::parse(bytes)?;
        if !header.version.is_user() {
            return Err(StaccatoError::corrupt_dictionary("not a user dictionary"));
        }
        let mut offset = HEADER_STORAGE_SIZE;
        let pos_offset = self.grammar.pos_size() as i16;
        if header.version.has_grammar() {
            let user_grammar = Grammar::parse(bytes, offset, encoding)?;
            offset += user_grammar.storage_size();
            self.grammar.add_pos_list(&user_grammar);
        }
        let mut user_lexicon = Lexicon::parse(bytes, offset, encoding)?;

        {
            let mut tokenizer = Tokenizer::new(self);
            user_lexicon.calculate_cost(|surface| {
                let morphemes = tokenizer.tokenize_inner(Mode::C, surface, false)?;
                let cost = morphemes.internal_cost()
                    + USER_DICT_COST_PER_MORPH * morphemes.len() as i32;
                Ok(cost.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
            })?;
        }

        debug!(words = user_lexicon.size(), "loaded a user dictionary");
        self.lexicon_set.add(user_lexicon, pos_offset)
    }

    #[inline(always)]
    pub fn grammar(&self) -> &Grammar<'a> {
        &self.grammar
    }

    #[inline(always)]
    pub fn lexicon(&self) -> &LexiconSet<'a> {
        &self.lexicon_set
    }
}
