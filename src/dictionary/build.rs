//! Compiler of binary dictionaries from CSV lexicons, and the converter
//! between the two string encodings.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::common::POS_DEPTH;
use crate::dictionary::grammar::Grammar;
use crate::dictionary::header::{DictionaryHeader, DictionaryVersion, HEADER_STORAGE_SIZE};
use crate::dictionary::lexicon::word_infos::WordInfo;
use crate::dictionary::lexicon::Lexicon;
use crate::dictionary::read::{self, TextEncoding};
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, StaccatoError};
use crate::trie::DoubleArrayBuilder;
use crate::utils;

const NUMBER_OF_COLUMNS: usize = 18;
const MAX_SPLIT_UNITS: usize = 255;
const MAX_UTF8_LENGTH: usize = 32767;
const MAX_UTF16_LENGTH: usize = 255;

/// Interns part-of-speech 6-tuples in first-seen order.
struct PosTable {
    table: Vec<String>,
    contains: HashMap<String, i16>,
}

impl PosTable {
    fn new() -> Self {
        Self {
            table: vec![],
            contains: HashMap::new(),
        }
    }

    fn get_id(&mut self, pos: &[String]) -> i16 {
        let joined = pos.join(",");
        if let Some(&id) = self.contains.get(&joined) {
            return id;
        }
        let id = self.table.len() as i16;
        self.contains.insert(joined.clone(), id);
        self.table.push(joined);
        id
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn entries(&self) -> impl Iterator<Item = Vec<&str>> {
        self.table.iter().map(|joined| joined.split(',').collect())
    }
}

/// Builder of the grammar and lexicon regions shared by system and user
/// dictionaries.
pub struct DictionaryBuilder<'a> {
    encoding: TextEncoding,
    system_grammar: Option<&'a Grammar<'a>>,
    pos_table: PosTable,
    trie_keys: BTreeMap<Vec<u8>, Vec<u32>>,
    params: Vec<(i16, i16, i16)>,
    word_infos: Vec<WordInfo>,
}

impl<'a> DictionaryBuilder<'a> {
    /// A builder for a system dictionary: the POS table starts empty.
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            encoding,
            system_grammar: None,
            pos_table: PosTable::new(),
            trie_keys: BTreeMap::new(),
            params: vec![],
            word_infos: vec![],
        }
    }

    /// A builder for a user dictionary: POS tuples resolve against the
    /// system grammar first and extend a private table otherwise.
    pub fn for_user_dictionary(encoding: TextEncoding, system_grammar: &'a Grammar<'a>) -> Self {
        Self {
            encoding,
            system_grammar: Some(system_grammar),
            pos_table: PosTable::new(),
            trie_keys: BTreeMap::new(),
            params: vec![],
            word_infos: vec![],
        }
    }

    const fn is_user(&self) -> bool {
        self.system_grammar.is_some()
    }

    fn pos_id(&mut self, pos: &[String]) -> i16 {
        if let Some(grammar) = self.system_grammar {
            if let Some(id) = grammar.pos_id(pos) {
                return id;
            }
            let base = grammar.pos_size() as i16;
            return base + self.pos_table.get_id(pos);
        }
        self.pos_table.get_id(pos)
    }

    fn string_too_long(&self, s: &str) -> bool {
        match self.encoding {
            TextEncoding::Utf8 => s.len() > MAX_UTF8_LENGTH,
            TextEncoding::Utf16 => s.encode_utf16().count() > MAX_UTF16_LENGTH,
        }
    }

    fn headword_length(&self, s: &str) -> usize {
        match self.encoding {
            TextEncoding::Utf8 => s.len(),
            TextEncoding::Utf16 => s.encode_utf16().count(),
        }
    }

    /// Reads a lexicon CSV: 18 columns, plus an ignored 19th
    /// (synonym-group) column in user dictionaries.
    pub fn read_lexicon<R>(&mut self, rdr: R) -> Result<()>
    where
        R: Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(rdr);

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = i + 1;
            let cols: Vec<String> = record
                .iter()
                .map(utils::decode_unicode_escapes)
                .collect();
            if cols.len() != NUMBER_OF_COLUMNS
                && !(self.is_user() && cols.len() == NUMBER_OF_COLUMNS + 1)
            {
                return Err(StaccatoError::invalid_format(
                    "lexicon",
                    format!("columns length must be {NUMBER_OF_COLUMNS} at line {line}"),
                ));
            }
            self.read_record(&cols, line)?;
        }
        debug!(words = self.params.len(), "read the lexicon source");
        Ok(())
    }

    fn read_record(&mut self, cols: &[String], line: usize) -> Result<()> {
        for &col in &[0usize, 4, 11, 12] {
            if self.string_too_long(&cols[col]) {
                return Err(StaccatoError::overflow(format!(
                    "string is too long: column {col} at line {line}"
                )));
            }
        }
        if cols[0].is_empty() {
            return Err(StaccatoError::invalid_format(
                "lexicon",
                format!("headword is empty at line {line}"),
            ));
        }

        let word_id = self.params.len() as u32;
        if cols[1] != "-1" {
            self.trie_keys
                .entry(cols[0].as_bytes().to_vec())
                .or_default()
                .push(word_id);
        }
        let left_id: i16 = cols[1].parse()?;
        let right_id: i16 = cols[2].parse()?;
        let cost: i16 = cols[3].parse()?;
        self.params.push((left_id, right_id, cost));

        let pos_cols: Vec<String> = cols[5..5 + POS_DEPTH].to_vec();
        let pos_id = self.pos_id(&pos_cols);

        let a_unit_split = self.parse_split_info(&cols[15], line)?;
        let b_unit_split = self.parse_split_info(&cols[16], line)?;
        if cols[14] == "A" && (!a_unit_split.is_empty() || !b_unit_split.is_empty()) {
            return Err(StaccatoError::invalid_format(
                "lexicon",
                format!("invalid splitting at line {line}"),
            ));
        }
        let word_structure = self.parse_split_info(&cols[17], line)?;

        let dictionary_form_word_id = if cols[13] == "*" {
            -1
        } else {
            cols[13].parse::<i32>()?
        };

        self.word_infos.push(WordInfo {
            surface: cols[4].clone(),
            headword_length: self.headword_length(&cols[0]) as u16,
            pos_id,
            normalized_form: cols[12].clone(),
            dictionary_form_word_id,
            dictionary_form: String::new(),
            reading_form: cols[11].clone(),
            a_unit_split,
            b_unit_split,
            word_structure,
        });
        Ok(())
    }

    /// `*` means no split; otherwise `/`-joined references, each a plain
    /// system word ID or, inside a user dictionary, a `U`-prefixed
    /// reference to the dictionary itself.
    fn parse_split_info(&self, info: &str, line: usize) -> Result<Vec<u32>> {
        if info == "*" {
            return Ok(vec![]);
        }
        let ids: Vec<&str> = info.split('/').collect();
        if ids.len() > MAX_SPLIT_UNITS {
            return Err(StaccatoError::invalid_format(
                "lexicon",
                format!("too many split units at line {line}"),
            ));
        }
        let mut refs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(rest) = id.strip_prefix('U') {
                if !self.is_user() {
                    return Err(StaccatoError::invalid_format(
                        "lexicon",
                        format!("user reference in a system dictionary at line {line}"),
                    ));
                }
                let word_id: u32 = rest.parse()?;
                refs.push(WordId::compose(1, word_id).raw());
            } else {
                refs.push(id.parse()?);
            }
        }
        Ok(refs)
    }

    /// Serializes the grammar block: the POS table, the connection-id
    /// sizes, and the matrix parsed from `matrix.def`.
    fn write_grammar<R>(&self, matrix_rdr: Option<R>, out: &mut Vec<u8>) -> Result<()>
    where
        R: Read,
    {
        out.extend_from_slice(&(self.pos_table.len() as u16).to_le_bytes());
        for pos in self.pos_table.entries() {
            for element in pos {
                write_string(out, element, self.encoding)?;
            }
        }

        match matrix_rdr {
            Some(rdr) => {
                let (left_size, right_size, matrix) = parse_matrix(rdr)?;
                out.extend_from_slice(&left_size.to_le_bytes());
                out.extend_from_slice(&right_size.to_le_bytes());
                out.extend_from_slice(&matrix);
            }
            None => {
                out.extend_from_slice(&0i16.to_le_bytes());
                out.extend_from_slice(&0i16.to_le_bytes());
            }
        }
        Ok(())
    }

    /// Serializes the four lexicon regions onto `out`, the dictionary body
    /// after the header. `body_position` is the absolute file offset of the
    /// body start; word-info offsets are absolute.
    fn write_lexicon(&self, body_position: usize, out: &mut Vec<u8>) -> Result<()> {
        let mut keys: Vec<&[u8]> = Vec::with_capacity(self.trie_keys.len());
        let mut values: Vec<u32> = Vec::with_capacity(self.trie_keys.len());
        let mut word_id_table = Vec::with_capacity(self.trie_keys.len() * 6);
        for (key, word_ids) in &self.trie_keys {
            keys.push(key);
            values.push(word_id_table.len() as u32);
            word_id_table.push(word_ids.len() as u8);
            for &word_id in word_ids {
                word_id_table.extend_from_slice(&word_id.to_le_bytes());
            }
        }

        debug!(keys = keys.len(), "building the trie");
        let trie_units = DoubleArrayBuilder::build(&keys, Some(&values))?;
        out.extend_from_slice(&(trie_units.len() as u32).to_le_bytes());
        out.extend_from_slice(&DoubleArrayBuilder::units_to_bytes(&trie_units));

        out.extend_from_slice(&(word_id_table.len() as u32).to_le_bytes());
        out.extend_from_slice(&word_id_table);

        out.extend_from_slice(&(self.params.len() as u32).to_le_bytes());
        for &(left_id, right_id, cost) in &self.params {
            out.extend_from_slice(&left_id.to_le_bytes());
            out.extend_from_slice(&right_id.to_le_bytes());
            out.extend_from_slice(&cost.to_le_bytes());
        }

        let mut records = Vec::with_capacity(self.word_infos.len() * 32);
        let mut offsets = Vec::with_capacity(self.word_infos.len() * 4);
        let base = body_position + out.len() + 4 * self.word_infos.len();
        for info in &self.word_infos {
            offsets.extend_from_slice(&((base + records.len()) as u32).to_le_bytes());
            write_word_info(&mut records, info, self.encoding)?;
        }
        out.extend_from_slice(&offsets);
        out.extend_from_slice(&records);
        Ok(())
    }

    /// Writes the whole dictionary: header, grammar block (when the
    /// version carries one), and the lexicon.
    ///
    /// On error the output is incomplete and must be discarded.
    pub fn build<R, W>(
        self,
        header: &DictionaryHeader,
        matrix_rdr: Option<R>,
        mut wtr: W,
    ) -> Result<()>
    where
        R: Read,
        W: Write,
    {
        let header_bytes = header.to_bytes()?;
        let mut body = vec![];
        if header.version.has_grammar() {
            self.write_grammar(matrix_rdr, &mut body)?;
        }
        self.write_lexicon(HEADER_STORAGE_SIZE, &mut body)?;
        wtr.write_all(&header_bytes)?;
        wtr.write_all(&body)?;
        debug!(
            bytes = header_bytes.len() + body.len(),
            "wrote the dictionary"
        );
        Ok(())
    }
}

/// Builds a system dictionary from a lexicon CSV and `matrix.def`.
pub fn build_system_dictionary<L, M, W>(
    lexicon_rdr: L,
    matrix_rdr: M,
    create_time: i64,
    description: &str,
    encoding: TextEncoding,
    wtr: W,
) -> Result<()>
where
    L: Read,
    M: Read,
    W: Write,
{
    let header = DictionaryHeader::new(
        DictionaryVersion::System,
        create_time,
        description.to_string(),
    );
    let mut builder = DictionaryBuilder::new(encoding);
    builder.read_lexicon(lexicon_rdr)?;
    builder.build(&header, Some(matrix_rdr), wtr)
}

/// Builds a user dictionary (v2: carries its extension POS table) against
/// the grammar of an opened system dictionary.
pub fn build_user_dictionary<L, W>(
    system_grammar: &Grammar,
    lexicon_rdr: L,
    create_time: i64,
    description: &str,
    encoding: TextEncoding,
    wtr: W,
) -> Result<()>
where
    L: Read,
    W: Write,
{
    let header = DictionaryHeader::new(
        DictionaryVersion::UserV2,
        create_time,
        description.to_string(),
    );
    let mut builder = DictionaryBuilder::for_user_dictionary(encoding, system_grammar);
    builder.read_lexicon(lexicon_rdr)?;
    builder.build(&header, None::<&[u8]>, wtr)
}

/// Rewrites a dictionary from one string encoding into the other,
/// preserving every field. The trie, the word-ID table, and the word
/// parameters are byte-identical; only the string-bearing regions change.
pub fn convert_dictionary(buf: &[u8], from: TextEncoding, to: TextEncoding) -> Result<Vec<u8>> {
    let header = DictionaryHeader::parse(buf)?;
    let mut out = header.to_bytes()?;
    let mut offset = HEADER_STORAGE_SIZE;

    if header.version.has_grammar() {
        let grammar = Grammar::parse(buf, offset, from)?;
        out.extend_from_slice(&(grammar.pos_size() as u16).to_le_bytes());
        for i in 0..grammar.pos_size() {
            for element in grammar.pos_string(i as i16).unwrap() {
                write_string(&mut out, element, to)?;
            }
        }
        out.extend_from_slice(&grammar.left_id_size().to_le_bytes());
        out.extend_from_slice(&grammar.right_id_size().to_le_bytes());
        out.extend_from_slice(grammar.connect_table_bytes());
        offset += grammar.storage_size();
    }

    // The trie and word-ID regions hold UTF-8 key bytes and IDs in both
    // encodings; copy them verbatim.
    let (after_trie, trie_size) = read::u32_at(buf, offset)?;
    let (after_trie, _) = read::bytes_at(buf, after_trie, trie_size as usize * 4)?;
    let (after_table, table_size) = read::u32_at(buf, after_trie)?;
    let (after_table, _) = read::bytes_at(buf, after_table, table_size as usize)?;
    let (_, word_count) = read::u32_at(buf, after_table)?;
    let params_end = after_table + 4 + word_count as usize * 6;
    let (_, copied) = read::bytes_at(buf, offset, params_end - offset)?;
    out.extend_from_slice(copied);

    let lexicon = Lexicon::parse(buf, offset, from)?;
    let mut records = vec![];
    let mut offsets = vec![];
    let base = out.len() + 4 * word_count as usize;
    for word_id in 0..word_count {
        let info = lexicon.word_info(word_id)?;
        offsets.extend_from_slice(&((base + records.len()) as u32).to_le_bytes());
        write_word_info(&mut records, &info, to)?;
    }
    out.extend_from_slice(&offsets);
    out.extend_from_slice(&records);
    Ok(out)
}

fn write_string(out: &mut Vec<u8>, s: &str, encoding: TextEncoding) -> Result<()> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = s.as_bytes();
            if bytes.len() > MAX_UTF8_LENGTH {
                return Err(StaccatoError::overflow("string is too long"));
            }
            if bytes.len() < 0x80 {
                out.push(bytes.len() as u8);
            } else {
                out.push(0x80 | (bytes.len() >> 8) as u8);
                out.push((bytes.len() & 0xFF) as u8);
            }
            out.extend_from_slice(bytes);
        }
        TextEncoding::Utf16 => {
            let units: Vec<u16> = s.encode_utf16().collect();
            if units.len() > MAX_UTF16_LENGTH {
                return Err(StaccatoError::overflow("string is too long"));
            }
            out.push(units.len() as u8);
            for unit in units {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }
    }
    Ok(())
}

fn write_u32_array(out: &mut Vec<u8>, values: &[u32]) {
    out.push(values.len() as u8);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn write_word_info(out: &mut Vec<u8>, info: &WordInfo, encoding: TextEncoding) -> Result<()> {
    write_string(out, &info.surface, encoding)?;
    match encoding {
        TextEncoding::Utf8 => {
            out.extend_from_slice(&info.headword_length.to_le_bytes());
        }
        TextEncoding::Utf16 => {
            if info.headword_length > 0xFF {
                return Err(StaccatoError::overflow("headword is too long"));
            }
            out.push(info.headword_length as u8);
        }
    }
    out.extend_from_slice(&info.pos_id.to_le_bytes());
    let normalized = if info.normalized_form == info.surface {
        ""
    } else {
        info.normalized_form.as_str()
    };
    write_string(out, normalized, encoding)?;
    out.extend_from_slice(&info.dictionary_form_word_id.to_le_bytes());
    let reading = if info.reading_form == info.surface {
        ""
    } else {
        info.reading_form.as_str()
    };
    write_string(out, reading, encoding)?;
    write_u32_array(out, &info.a_unit_split);
    write_u32_array(out, &info.b_unit_split);
    write_u32_array(out, &info.word_structure);
    Ok(())
}

/// Parses `matrix.def`: a `left right` header line, then `left right cost`
/// rows in row-major order with the left id as the fast index.
fn parse_matrix<R>(rdr: R) -> Result<(i16, i16, Vec<u8>)>
where
    R: Read,
{
    use std::io::{prelude::*, BufReader};

    let reader = BufReader::new(rdr);
    let mut lines = reader.lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !utils::is_skip_line(&line) {
                    break line;
                }
            }
            None => {
                return Err(StaccatoError::invalid_format(
                    "matrix.def",
                    "the header is missing",
                ));
            }
        }
    };
    let sizes: Vec<&str> = header.split_whitespace().collect();
    if sizes.len() < 2 {
        return Err(StaccatoError::invalid_format(
            "matrix.def",
            format!("invalid header: {header}"),
        ));
    }
    let left_size: i16 = sizes[0].parse()?;
    let right_size: i16 = sizes[1].parse()?;

    let mut matrix = vec![0u8; 2 * left_size as usize * right_size as usize];
    for (i, line) in lines.enumerate() {
        let line = line?;
        if utils::is_skip_line(&line) {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            warn!(line = i + 2, "invalid format in matrix.def");
            continue;
        }
        let left: i16 = cols[0].parse()?;
        let right: i16 = cols[1].parse()?;
        let cost: i16 = cols[2].parse()?;
        if left >= left_size || right >= right_size {
            return Err(StaccatoError::invalid_format(
                "matrix.def",
                format!("connection id is out of range at line {}", i + 2),
            ));
        }
        let index = 2 * (left as usize + left_size as usize * right as usize);
        matrix[index..index + 2].copy_from_slice(&cost.to_le_bytes());
    }
    Ok((left_size, right_size, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON_CSV: &str = "\
東京,1,1,2000,東京,名詞,固有名詞,地名,一般,*,*,トウキョウ,東京,*,A,*,*,*
京都,1,1,2100,京都,名詞,固有名詞,地名,一般,*,*,キョウト,京都,*,A,*,*,*
東,1,1,2500,東,名詞,普通名詞,一般,*,*,*,ヒガシ,東,*,A,*,*,*
";
    const MATRIX_DEF: &str = "2 2\n0 0 0\n0 1 100\n1 0 -200\n1 1 -300\n";

    fn build_bytes(encoding: TextEncoding) -> Vec<u8> {
        let mut out = vec![];
        build_system_dictionary(
            LEXICON_CSV.as_bytes(),
            MATRIX_DEF.as_bytes(),
            1_500_000_000,
            "test",
            encoding,
            &mut out,
        )
        .unwrap();
        out
    }

    #[test]
    fn test_roundtrip_utf8() {
        let bytes = build_bytes(TextEncoding::Utf8);
        let header = DictionaryHeader::parse(&bytes).unwrap();
        assert_eq!(header.version, DictionaryVersion::System);
        let grammar = Grammar::parse(&bytes, HEADER_STORAGE_SIZE, TextEncoding::Utf8).unwrap();
        assert_eq!(grammar.connect_cost(0, 1), 100);
        assert_eq!(grammar.connect_cost(1, 0), -200);
        let lexicon = Lexicon::parse(
            &bytes,
            HEADER_STORAGE_SIZE + grammar.storage_size(),
            TextEncoding::Utf8,
        )
        .unwrap();
        assert_eq!(lexicon.size(), 3);

        let matches: Vec<(u32, usize)> = lexicon.lookup("東京都".as_bytes(), 0).collect();
        // "東" (word 2) and "東京" (word 0).
        assert_eq!(matches, vec![(2, 3), (0, 6)]);

        let info = lexicon.word_info(0).unwrap();
        assert_eq!(info.surface, "東京");
        assert_eq!(info.headword_length, 6);
        assert_eq!(info.reading_form, "トウキョウ");
        assert_eq!(info.normalized_form, "東京");
        assert_eq!(info.dictionary_form, "東京");
        assert_eq!(lexicon.cost(0), 2000);
        assert_eq!(lexicon.left_id(1), 1);
    }

    #[test]
    fn test_roundtrip_utf16() {
        let bytes = build_bytes(TextEncoding::Utf16);
        let grammar = Grammar::parse(&bytes, HEADER_STORAGE_SIZE, TextEncoding::Utf16).unwrap();
        let lexicon = Lexicon::parse(
            &bytes,
            HEADER_STORAGE_SIZE + grammar.storage_size(),
            TextEncoding::Utf16,
        )
        .unwrap();
        let info = lexicon.word_info(1).unwrap();
        assert_eq!(info.surface, "京都");
        // Headword length counts UTF-16 code units in this mode.
        assert_eq!(info.headword_length, 2);
        assert_eq!(info.reading_form, "キョウト");
    }

    #[test]
    fn test_convert_encoding_preserves_fields() {
        let utf8 = build_bytes(TextEncoding::Utf8);
        let utf16 = convert_dictionary(&utf8, TextEncoding::Utf8, TextEncoding::Utf16).unwrap();

        let g8 = Grammar::parse(&utf8, HEADER_STORAGE_SIZE, TextEncoding::Utf8).unwrap();
        let g16 = Grammar::parse(&utf16, HEADER_STORAGE_SIZE, TextEncoding::Utf16).unwrap();
        assert_eq!(g8.pos_size(), g16.pos_size());
        for i in 0..g8.pos_size() {
            assert_eq!(g8.pos_string(i as i16), g16.pos_string(i as i16));
        }
        assert_eq!(g8.connect_cost(1, 1), g16.connect_cost(1, 1));

        let l8 = Lexicon::parse(&utf8, HEADER_STORAGE_SIZE + g8.storage_size(), TextEncoding::Utf8)
            .unwrap();
        let l16 = Lexicon::parse(
            &utf16,
            HEADER_STORAGE_SIZE + g16.storage_size(),
            TextEncoding::Utf16,
        )
        .unwrap();
        assert_eq!(l8.size(), l16.size());
        for word_id in 0..l8.size() {
            let info8 = l8.word_info(word_id).unwrap();
            let info16 = l16.word_info(word_id).unwrap();
            assert_eq!(info8.surface, info16.surface);
            assert_eq!(info8.pos_id, info16.pos_id);
            assert_eq!(info8.normalized_form, info16.normalized_form);
            assert_eq!(info8.reading_form, info16.reading_form);
            assert_eq!(info8.a_unit_split, info16.a_unit_split);
            assert_eq!(info8.b_unit_split, info16.b_unit_split);
            assert_eq!(info8.word_structure, info16.word_structure);
            assert_eq!(l8.left_id(word_id), l16.left_id(word_id));
            assert_eq!(l8.right_id(word_id), l16.right_id(word_id));
            assert_eq!(l8.cost(word_id), l16.cost(word_id));
        }
    }

    #[test]
    fn test_wrong_arity() {
        let csv = "東京,1,1,2000,東京,名詞\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        assert!(builder.read_lexicon(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_headword() {
        let csv = ",1,1,2000,空,名詞,*,*,*,*,*,*,*,*,A,*,*,*\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        assert!(builder.read_lexicon(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_unicode_escapes_decoded() {
        let csv = "\\u3042,1,1,0,\\u3042,名詞,*,*,*,*,*,ア,あ,*,A,*,*,*\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        builder.read_lexicon(csv.as_bytes()).unwrap();
        assert_eq!(builder.word_infos[0].surface, "あ");
        assert!(builder.trie_keys.contains_key("あ".as_bytes()));
    }

    #[test]
    fn test_negative_left_id_skips_trie() {
        let csv = "無効,-1,1,0,無効,名詞,*,*,*,*,*,ムコウ,無効,*,A,*,*,*\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        builder.read_lexicon(csv.as_bytes()).unwrap();
        assert!(builder.trie_keys.is_empty());
        assert_eq!(builder.params.len(), 1);
    }

    #[test]
    fn test_a_mode_word_with_splits_rejected() {
        let csv = "東京,1,1,0,東京,名詞,*,*,*,*,*,トウキョウ,東京,*,A,0/1,*,*\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        assert!(builder.read_lexicon(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_user_reference_in_system_dictionary_rejected() {
        let csv = "東京,1,1,0,東京,名詞,*,*,*,*,*,トウキョウ,東京,*,C,U0/1,*,*\n";
        let mut builder = DictionaryBuilder::new(TextEncoding::Utf8);
        assert!(builder.read_lexicon(csv.as_bytes()).is_err());
    }
}
