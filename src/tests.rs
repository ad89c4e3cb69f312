mod dictionary;
mod tokenizer;

use crate::dictionary::build::build_system_dictionary;
use crate::dictionary::character::CharacterCategory;
use crate::dictionary::read::TextEncoding;
use crate::plugin::{
    make_oov_provider_plugin, make_path_rewrite_plugin, PluginSetting,
};
use crate::LoadedDictionary;

pub(crate) const LEXICON_CSV: &str = "\
都,1,1,2000,都,名詞,普通名詞,一般,*,*,*,ト,都,*,A,*,*,*
東京,1,1,2500,東京,名詞,固有名詞,地名,一般,*,*,トウキョウ,東京,*,A,*,*,*
東京都,1,1,3000,東京都,名詞,固有名詞,地名,一般,*,*,トウキョウト,東京都,*,B,*,1/0,1/0
関西,1,1,2500,関西,名詞,固有名詞,地名,一般,*,*,カンサイ,関西,*,A,*,*,*
国際,1,1,2500,国際,名詞,普通名詞,一般,*,*,*,コクサイ,国際,*,A,*,*,*
空港,1,1,2500,空港,名詞,普通名詞,一般,*,*,*,クウコウ,空港,*,A,*,*,*
関西国際空港,1,1,2000,関西国際空港,名詞,固有名詞,地名,一般,*,*,カンサイコクサイクウコウ,関西国際空港,*,C,*,3/4/5,3/4/5
1,1,1,3000,1,名詞,数詞,*,*,*,*,イチ,1,*,A,*,*,*
2,1,1,3000,2,名詞,数詞,*,*,*,*,ニ,2,*,A,*,*,*
3,1,1,3000,3,名詞,数詞,*,*,*,*,サン,3,*,A,*,*,*
4,1,1,3000,4,名詞,数詞,*,*,*,*,ヨン,4,*,A,*,*,*
\",\",1,1,3000,\",\",補助記号,読点,*,*,*,*,\",\",\",\",*,A,*,*,*
円,1,1,2000,円,名詞,普通名詞,助数詞可能,*,*,*,エン,円,*,A,*,*,*
";

pub(crate) const MATRIX_DEF: &str = "\
2 2
0 0 0
0 1 0
1 0 0
1 1 0
";

pub(crate) const CHAR_DEF: &str = "\
DEFAULT 0 1 0
NUMERIC 1 0 0
KATAKANA 1 1 0
KANJI 0 0 0
0x0030..0x0039 NUMERIC
0x30A1..0x30FF KATAKANA
0x4E00..0x9FFF KANJI
";

pub(crate) const UNK_DEF: &str = "\
DEFAULT,1,1,5000,名詞,普通名詞,一般,*,*,*
KATAKANA,1,1,4000,名詞,普通名詞,一般,*,*,*
";

pub(crate) fn system_dict_bytes(encoding: TextEncoding) -> Vec<u8> {
    let mut bytes = vec![];
    build_system_dictionary(
        LEXICON_CSV.as_bytes(),
        MATRIX_DEF.as_bytes(),
        1_500_000_000,
        "the system dictionary for the tests",
        encoding,
        &mut bytes,
    )
    .unwrap();
    bytes
}

/// Loads the dictionary with the MeCab OOV provider and both path-rewrite
/// plugins attached.
pub(crate) fn loaded_dictionary(bytes: &[u8]) -> LoadedDictionary<'_> {
    let category = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
    let mut dict =
        LoadedDictionary::from_system_dictionary(bytes, category, TextEncoding::Utf8).unwrap();

    let oov_setting = PluginSetting {
        char_def: Some(CHAR_DEF),
        unk_def: Some(UNK_DEF),
        ..Default::default()
    };
    let oov = make_oov_provider_plugin("MeCabOovProviderPlugin", &oov_setting, dict.grammar())
        .unwrap();
    dict.add_oov_provider_plugin(oov);

    let join_numeric = make_path_rewrite_plugin(
        "JoinNumericPlugin",
        &PluginSetting::default(),
        dict.grammar(),
    )
    .unwrap();
    dict.add_path_rewrite_plugin(join_numeric);

    let katakana_setting = PluginSetting {
        oov_pos: ["名詞", "普通名詞", "一般", "*", "*", "*"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        min_length: Some(3),
        ..Default::default()
    };
    let join_katakana = make_path_rewrite_plugin(
        "JoinKatakanaOovPlugin",
        &katakana_setting,
        dict.grammar(),
    )
    .unwrap();
    dict.add_path_rewrite_plugin(join_katakana);

    dict
}
