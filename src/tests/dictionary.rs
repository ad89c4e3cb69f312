use std::io::Write as _;

use crate::dictionary::build::build_user_dictionary;
use crate::dictionary::grammar::Grammar;
use crate::dictionary::header::HEADER_STORAGE_SIZE;
use crate::dictionary::read::TextEncoding;
use crate::dictionary::word_id::WordId;
use crate::tests::{loaded_dictionary, system_dict_bytes};
use crate::{Dictionary, Mode, Tokenizer};

const USER_LEXICON_CSV: &str = "\
スタッカート,1,1,-32768,スタッカート,名詞,固有名詞,音楽,*,*,*,スタッカート,スタッカート,*,A,*,*,*
レガート,1,1,2500,レガート,名詞,固有名詞,音楽,*,*,*,レガート,レガート,*,A,*,*,*
";

fn user_dict_bytes(system_bytes: &[u8]) -> Vec<u8> {
    let grammar = Grammar::parse(system_bytes, HEADER_STORAGE_SIZE, TextEncoding::Utf8).unwrap();
    let mut bytes = vec![];
    build_user_dictionary(
        &grammar,
        USER_LEXICON_CSV.as_bytes(),
        1_500_000_000,
        "the user dictionary for the tests",
        TextEncoding::Utf8,
        &mut bytes,
    )
    .unwrap();
    bytes
}

#[test]
fn test_user_dictionary_word_is_used() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let user = user_dict_bytes(&system);
    let mut dict = loaded_dictionary(&system);
    dict.add_user_dictionary(&user, TextEncoding::Utf8).unwrap();

    let mut tokenizer = Tokenizer::new(&dict);
    let morphemes = tokenizer.tokenize(Mode::C, "スタッカート").unwrap();
    assert_eq!(morphemes.len(), 1);
    let m = morphemes.get(0);
    assert_eq!(m.surface(), "スタッカート");
    assert!(!m.is_oov());
    assert_eq!(m.dictionary_id(), Some(1));
    assert_eq!(m.word_id().dic_id(), 1);
}

#[test]
fn test_user_dictionary_pos_extension() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let user = user_dict_bytes(&system);
    let mut dict = loaded_dictionary(&system);
    dict.add_user_dictionary(&user, TextEncoding::Utf8).unwrap();

    let mut tokenizer = Tokenizer::new(&dict);
    let morphemes = tokenizer.tokenize(Mode::C, "レガート").unwrap();
    let pos = morphemes.get(0).part_of_speech().unwrap().to_vec();
    assert_eq!(pos, ["名詞", "固有名詞", "音楽", "*", "*", "*"]);
}

#[test]
fn test_user_dictionary_placeholder_cost_computed() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let user = user_dict_bytes(&system);
    let mut dict = loaded_dictionary(&system);
    dict.add_user_dictionary(&user, TextEncoding::Utf8).unwrap();

    // The surface tokenizes to one OOV morpheme of word cost 4000 under
    // the system dictionary, so the estimate is 4000 - 20 * 1.
    assert_eq!(dict.lexicon().cost(WordId::compose(1, 0)), 3980);
    // Explicit costs are kept.
    assert_eq!(dict.lexicon().cost(WordId::compose(1, 1)), 2500);
}

#[test]
fn test_user_words_shadow_system_only_by_cost() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let user = user_dict_bytes(&system);
    let mut dict = loaded_dictionary(&system);
    dict.add_user_dictionary(&user, TextEncoding::Utf8).unwrap();

    // A purely system word still resolves to dictionary 0.
    let mut tokenizer = Tokenizer::new(&dict);
    let morphemes = tokenizer.tokenize(Mode::C, "東京都").unwrap();
    assert_eq!(morphemes.get(0).dictionary_id(), Some(0));
}

#[test]
fn test_mmap_roundtrip() {
    let bytes = system_dict_bytes(TextEncoding::Utf8);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let storage = Dictionary::open::<&std::path::Path>(file.path(), &[]).unwrap();
    assert_eq!(storage.system(), &bytes[..]);

    let dict = loaded_dictionary(storage.system());
    let mut tokenizer = Tokenizer::new(&dict);
    let morphemes = tokenizer.tokenize(Mode::C, "関西国際空港").unwrap();
    assert_eq!(morphemes.len(), 1);
    assert_eq!(morphemes.get(0).surface(), "関西国際空港");
}

#[test]
fn test_mmap_user_dictionary() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let user = user_dict_bytes(&system);

    let mut system_file = tempfile::NamedTempFile::new().unwrap();
    system_file.write_all(&system).unwrap();
    system_file.flush().unwrap();
    let mut user_file = tempfile::NamedTempFile::new().unwrap();
    user_file.write_all(&user).unwrap();
    user_file.flush().unwrap();

    let storage = Dictionary::open(system_file.path(), &[user_file.path()]).unwrap();
    let mut dict = loaded_dictionary(storage.system());
    for user_bytes in storage.users() {
        dict.add_user_dictionary(user_bytes, TextEncoding::Utf8).unwrap();
    }

    let mut tokenizer = Tokenizer::new(&dict);
    let morphemes = tokenizer.tokenize(Mode::C, "スタッカート").unwrap();
    assert_eq!(morphemes.get(0).dictionary_id(), Some(1));
}

#[test]
fn test_user_dictionary_rejects_system_file() {
    let system = system_dict_bytes(TextEncoding::Utf8);
    let copy = system.clone();
    let mut dict = loaded_dictionary(&system);
    assert!(dict.add_user_dictionary(&copy, TextEncoding::Utf8).is_err());
}
