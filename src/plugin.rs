//! Plugin points of the analyzer.
//!
//! The original system registers plugins dynamically by class name; here
//! each extension point is a closed enum of the known kinds, and the
//! registry maps the accepted names onto constructors of those variants.

pub mod connect_cost;
pub mod input_text;
pub mod numeric;
pub mod oov;
pub mod path_rewrite;

use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon_set::LexiconSet;
use crate::errors::{Result, StaccatoError};
use crate::input::{InputText, InputTextBuilder};
use crate::lattice::{Lattice, Node};
use connect_cost::InhibitConnectionPlugin;
use input_text::{DefaultInputTextPlugin, ProlongedSoundMarkPlugin};
use oov::{MecabOovPlugin, SimpleOovPlugin};
use path_rewrite::{JoinKatakanaOovPlugin, JoinNumericPlugin};

/// Character rewriters applied to the input-text builder.
pub enum InputTextPlugin {
    Default(DefaultInputTextPlugin),
    ProlongedSoundMark(ProlongedSoundMarkPlugin),
}

impl InputTextPlugin {
    pub fn rewrite(&self, builder: &mut InputTextBuilder) {
        match self {
            Self::Default(p) => p.rewrite(builder),
            Self::ProlongedSoundMark(p) => p.rewrite(builder),
        }
    }
}

/// One-shot editors of the connection matrix.
pub enum EditConnectionCostPlugin {
    InhibitConnection(InhibitConnectionPlugin),
}

impl EditConnectionCostPlugin {
    pub fn edit(&self, grammar: &mut Grammar) {
        match self {
            Self::InhibitConnection(p) => p.edit(grammar),
        }
    }
}

/// Providers of unknown-word candidates.
pub enum OovProviderPlugin {
    Mecab(MecabOovPlugin),
    Simple(SimpleOovPlugin),
}

impl OovProviderPlugin {
    pub fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
    ) -> Result<Vec<Node>> {
        match self {
            Self::Mecab(p) => p.provide_oov(input, offset, has_other_words),
            Self::Simple(p) => p.provide_oov(input, offset, has_other_words),
        }
    }

    /// Runs the provider and stamps each node's byte range from its
    /// headword length.
    pub fn get_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
        lexicon: &LexiconSet,
    ) -> Result<Vec<Node>> {
        let mut nodes = self.provide_oov(input, offset, has_other_words)?;
        for node in &mut nodes {
            let length = node.word_info(lexicon)?.headword_length;
            node.set_range(offset, offset + usize::from(length));
        }
        Ok(nodes)
    }
}

/// Rewriters of the extracted best path.
pub enum PathRewritePlugin {
    JoinNumeric(JoinNumericPlugin),
    JoinKatakanaOov(JoinKatakanaOovPlugin),
}

impl PathRewritePlugin {
    pub fn rewrite(
        &self,
        input: &InputText,
        path: &mut Vec<Node>,
        lattice: &Lattice,
        lexicon: &LexiconSet,
    ) -> Result<()> {
        match self {
            Self::JoinNumeric(p) => p.rewrite(input, path, lattice, lexicon),
            Self::JoinKatakanaOov(p) => p.rewrite(input, path, lattice, lexicon),
        }
    }
}

/// Settings consumed by the plugin constructors.
///
/// This mirrors the flat key set of the original JSON configuration;
/// parsing that JSON is the front-end's concern, not the core's.
#[derive(Default)]
pub struct PluginSetting<'a> {
    pub rewrite_def: Option<&'a str>,
    pub prolonged_sound_marks: Vec<char>,
    pub replacement_symbol: Option<String>,
    pub char_def: Option<&'a str>,
    pub unk_def: Option<&'a str>,
    pub oov_pos: Vec<String>,
    pub left_id: Option<i16>,
    pub right_id: Option<i16>,
    pub cost: Option<i16>,
    pub enable_normalize: Option<bool>,
    pub min_length: Option<usize>,
    pub inhibited_pairs: Vec<(i16, i16)>,
}

pub fn make_input_text_plugin(name: &str, setting: &PluginSetting) -> Result<InputTextPlugin> {
    match name {
        "DefaultInputTextPlugin" | "com.worksap.nlp.sudachi.DefaultInputTextPlugin" => {
            let rewrite_def = setting.rewrite_def.unwrap_or("");
            Ok(InputTextPlugin::Default(DefaultInputTextPlugin::from_reader(
                rewrite_def.as_bytes(),
            )?))
        }
        "ProlongedSoundMarkInputTextPlugin"
        | "com.worksap.nlp.sudachi.ProlongedSoundMarkInputTextPlugin" => {
            let symbol = setting
                .replacement_symbol
                .as_deref()
                .ok_or_else(|| StaccatoError::config("replacementSymbol is not specified"))?;
            Ok(InputTextPlugin::ProlongedSoundMark(
                ProlongedSoundMarkPlugin::new(&setting.prolonged_sound_marks, symbol)?,
            ))
        }
        _ => Err(StaccatoError::config(format!(
            "{name} is an unknown input text plugin"
        ))),
    }
}

pub fn make_edit_connection_cost_plugin(
    name: &str,
    setting: &PluginSetting,
) -> Result<EditConnectionCostPlugin> {
    match name {
        "InhibitConnectionPlugin" | "com.worksap.nlp.sudachi.InhibitConnectionPlugin" => {
            Ok(EditConnectionCostPlugin::InhibitConnection(
                InhibitConnectionPlugin::new(setting.inhibited_pairs.clone()),
            ))
        }
        _ => Err(StaccatoError::config(format!(
            "{name} is an unknown connection cost plugin"
        ))),
    }
}

pub fn make_oov_provider_plugin(
    name: &str,
    setting: &PluginSetting,
    grammar: &Grammar,
) -> Result<OovProviderPlugin> {
    match name {
        "MeCabOovProviderPlugin" | "com.worksap.nlp.sudachi.MeCabOovProviderPlugin" => {
            let char_def = setting
                .char_def
                .ok_or_else(|| StaccatoError::config("charDef is not specified"))?;
            let unk_def = setting
                .unk_def
                .ok_or_else(|| StaccatoError::config("unkDef is not specified"))?;
            Ok(OovProviderPlugin::Mecab(MecabOovPlugin::from_readers(
                char_def.as_bytes(),
                unk_def.as_bytes(),
                grammar,
            )?))
        }
        "SimpleOovProviderPlugin" | "com.worksap.nlp.sudachi.SimpleOovProviderPlugin" => {
            let left_id = setting
                .left_id
                .ok_or_else(|| StaccatoError::config("leftId is not specified"))?;
            let right_id = setting
                .right_id
                .ok_or_else(|| StaccatoError::config("rightId is not specified"))?;
            let cost = setting
                .cost
                .ok_or_else(|| StaccatoError::config("cost is not specified"))?;
            Ok(OovProviderPlugin::Simple(SimpleOovPlugin::new(
                grammar,
                &setting.oov_pos,
                left_id,
                right_id,
                cost,
            )?))
        }
        _ => Err(StaccatoError::config(format!(
            "{name} is an unknown OOV provider plugin"
        ))),
    }
}

pub fn make_path_rewrite_plugin(
    name: &str,
    setting: &PluginSetting,
    grammar: &Grammar,
) -> Result<PathRewritePlugin> {
    match name {
        "JoinNumericPlugin" | "com.worksap.nlp.sudachi.JoinNumericPlugin" => Ok(
            PathRewritePlugin::JoinNumeric(JoinNumericPlugin::new(grammar, setting.enable_normalize)),
        ),
        "JoinKatakanaOovPlugin" | "com.worksap.nlp.sudachi.JoinKatakanaOovPlugin" => {
            Ok(PathRewritePlugin::JoinKatakanaOov(JoinKatakanaOovPlugin::new(
                grammar,
                &setting.oov_pos,
                setting.min_length,
            )?))
        }
        _ => Err(StaccatoError::config(format!(
            "{name} is an unknown path rewrite plugin"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::read::TextEncoding;

    fn empty_grammar() -> Grammar<'static> {
        let mut buf = vec![];
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0i16.to_le_bytes());
        buf.extend_from_slice(&0i16.to_le_bytes());
        let buf: &'static [u8] = Box::leak(buf.into_boxed_slice());
        Grammar::parse(buf, 0, TextEncoding::Utf8).unwrap()
    }

    #[test]
    fn test_unknown_names() {
        let setting = PluginSetting::default();
        assert!(make_input_text_plugin("NoSuchPlugin", &setting).is_err());
        assert!(make_edit_connection_cost_plugin("NoSuchPlugin", &setting).is_err());
        let grammar = empty_grammar();
        assert!(make_oov_provider_plugin("NoSuchPlugin", &setting, &grammar).is_err());
        assert!(make_path_rewrite_plugin("NoSuchPlugin", &setting, &grammar).is_err());
    }

    #[test]
    fn test_java_style_names_accepted() {
        let setting = PluginSetting::default();
        assert!(make_input_text_plugin(
            "com.worksap.nlp.sudachi.DefaultInputTextPlugin",
            &setting
        )
        .is_ok());
    }

    #[test]
    fn test_missing_required_config() {
        let setting = PluginSetting::default();
        let grammar = empty_grammar();
        assert!(make_input_text_plugin("ProlongedSoundMarkInputTextPlugin", &setting).is_err());
        assert!(make_oov_provider_plugin("SimpleOovProviderPlugin", &setting, &grammar).is_err());
        assert!(make_oov_provider_plugin("MeCabOovProviderPlugin", &setting, &grammar).is_err());
        assert!(make_path_rewrite_plugin("JoinKatakanaOovPlugin", &setting, &grammar).is_err());
    }
}
