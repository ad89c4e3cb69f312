use crate::tests::{loaded_dictionary, system_dict_bytes};
use crate::dictionary::read::TextEncoding;
use crate::errors::StaccatoError;
use crate::{Mode, Tokenizer};

#[test]
fn test_tokenize_prefers_cheapest_path() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    // 東京都 (3000) beats 東京 + 都 (2500 + 2000).
    let morphemes = tokenizer.tokenize(Mode::C, "東京都").unwrap();
    assert_eq!(morphemes.len(), 1);
    let m = morphemes.get(0);
    assert_eq!(m.surface(), "東京都");
    assert_eq!(m.reading_form().unwrap(), "トウキョウト");
    assert!(!m.is_oov());
    assert_eq!(m.dictionary_id(), Some(0));
}

#[test]
fn test_tokenize_two_words() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "国際空港").unwrap();
    assert_eq!(morphemes.len(), 2);
    assert_eq!(morphemes.get(0).surface(), "国際");
    assert_eq!(morphemes.get(1).surface(), "空港");
}

#[test]
fn test_mode_b_split_expansion() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::B, "関西国際空港").unwrap();
    assert_eq!(morphemes.len(), 3);
    let expected = [("関西", 0, 6), ("国際", 6, 12), ("空港", 12, 18)];
    for (i, &(surface, begin, end)) in expected.iter().enumerate() {
        let m = morphemes.get(i);
        assert_eq!(m.surface(), surface);
        assert_eq!(m.begin(), begin);
        assert_eq!(m.end(), end);
    }
}

#[test]
fn test_mode_b_split_of_shorter_word() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::B, "東京都").unwrap();
    assert_eq!(morphemes.len(), 2);
    assert_eq!(morphemes.get(0).surface(), "東京");
    assert_eq!(morphemes.get(1).surface(), "都");
}

#[test]
fn test_morpheme_resplit() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "関西国際空港").unwrap();
    assert_eq!(morphemes.len(), 1);
    let sub = morphemes.get(0).split(Mode::B).unwrap();
    assert_eq!(sub.len(), 3);
    assert_eq!(sub.get(0).surface(), "関西");
    assert_eq!(sub.get(2).surface(), "空港");
}

#[test]
fn test_oov_katakana_group() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "東京ペキン").unwrap();
    assert_eq!(morphemes.len(), 2);
    assert_eq!(morphemes.get(0).surface(), "東京");
    let oov = morphemes.get(1);
    assert_eq!(oov.surface(), "ペキン");
    assert!(oov.is_oov());
    assert_eq!(oov.dictionary_id(), None);
}

#[test]
fn test_numeric_join_with_normalization() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "1,234円").unwrap();
    assert_eq!(morphemes.len(), 2);
    let number = morphemes.get(0);
    assert_eq!(number.surface(), "1,234");
    assert_eq!(number.normalized_form().unwrap(), "1234");
    assert_eq!(morphemes.get(1).surface(), "円");
}

#[test]
fn test_numeric_join_plain_digits() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "1234").unwrap();
    assert_eq!(morphemes.len(), 1);
    assert_eq!(morphemes.get(0).surface(), "1234");
    assert_eq!(morphemes.get(0).normalized_form().unwrap(), "1234");
}

#[test]
fn test_tokenize_empty() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "").unwrap();
    assert_eq!(morphemes.len(), 0);
    assert!(morphemes.is_empty());
}

#[test]
fn test_part_of_speech() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let morphemes = tokenizer.tokenize(Mode::C, "円").unwrap();
    let pos = morphemes.get(0).part_of_speech().unwrap().to_vec();
    assert_eq!(pos, ["名詞", "普通名詞", "助数詞可能", "*", "*", "*"]);
}

#[test]
fn test_no_morpheme_without_any_provider() {
    use crate::dictionary::character::CharacterCategory;
    use crate::dictionary::read::TextEncoding;
    use crate::tests::CHAR_DEF;
    use crate::LoadedDictionary;

    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let category = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
    let dict =
        LoadedDictionary::from_system_dictionary(&bytes, category, TextEncoding::Utf8).unwrap();
    let mut tokenizer = Tokenizer::new(&dict);

    // "!" is in no lexicon and no OOV provider is attached.
    match tokenizer.tokenize(Mode::C, "!") {
        Err(StaccatoError::NoMorpheme(0)) => {}
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected a NoMorpheme error"),
    }
}

#[test]
fn test_lattice_reuse_across_calls() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let dict = loaded_dictionary(&bytes);
    let mut tokenizer = Tokenizer::new(&dict);

    let first = tokenizer.tokenize(Mode::C, "東京都").unwrap();
    assert_eq!(first.len(), 1);
    let second = tokenizer.tokenize(Mode::C, "空港").unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second.get(0).surface(), "空港");
    let third = tokenizer.tokenize(Mode::C, "東京国際空港").unwrap();
    assert_eq!(third.get(0).surface(), "東京");
}
