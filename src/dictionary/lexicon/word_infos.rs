use crate::dictionary::read::{self, TextEncoding};
use crate::errors::Result;

/// Metadata of a single word.
///
/// Empty normalized/reading forms on disk mean "equal to the surface" and
/// are resolved at decode time; the dictionary form is resolved through its
/// word ID (-1 meaning the word itself).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct WordInfo {
    pub surface: String,
    pub headword_length: u16,
    pub pos_id: i16,
    pub normalized_form: String,
    pub dictionary_form_word_id: i32,
    pub dictionary_form: String,
    pub reading_form: String,
    pub a_unit_split: Vec<u32>,
    pub b_unit_split: Vec<u32>,
    pub word_structure: Vec<u32>,
}

/// Word-info region: an absolute-offset table followed by variable
/// records.
///
/// Offsets address the whole dictionary buffer, so this view keeps it
/// entire rather than a sub-slice.
pub struct WordInfos<'a> {
    buf: &'a [u8],
    offsets_offset: usize,
    word_size: u32,
    encoding: TextEncoding,
}

impl<'a> WordInfos<'a> {
    pub fn new(buf: &'a [u8], offset: usize, word_size: u32, encoding: TextEncoding) -> Self {
        Self {
            buf,
            offsets_offset: offset,
            word_size,
            encoding,
        }
    }

    fn record_offset(&self, word_id: u32) -> Result<usize> {
        let (_, offset) = read::u32_at(self.buf, self.offsets_offset + 4 * word_id as usize)?;
        Ok(offset as usize)
    }

    pub fn get(&self, word_id: u32) -> Result<WordInfo> {
        let offset = self.record_offset(word_id)?;

        let (offset, surface) = self.encoding.string_at(self.buf, offset)?;
        let (offset, headword_length) = match self.encoding {
            TextEncoding::Utf8 => {
                let (offset, len) = read::u16_at(self.buf, offset)?;
                (offset, len)
            }
            TextEncoding::Utf16 => {
                let (offset, len) = read::u8_at(self.buf, offset)?;
                (offset, u16::from(len))
            }
        };
        let (offset, pos_id) = read::i16_at(self.buf, offset)?;
        let (offset, normalized_form) = self.encoding.string_at(self.buf, offset)?;
        let (offset, dictionary_form_word_id) = read::i32_at(self.buf, offset)?;
        let (offset, reading_form) = self.encoding.string_at(self.buf, offset)?;
        let (offset, a_unit_split) = read::u32_array_at(self.buf, offset)?;
        let (offset, b_unit_split) = read::u32_array_at(self.buf, offset)?;
        let (_, word_structure) = read::u32_array_at(self.buf, offset)?;

        let normalized_form = if normalized_form.is_empty() {
            surface.clone()
        } else {
            normalized_form
        };
        let reading_form = if reading_form.is_empty() {
            surface.clone()
        } else {
            reading_form
        };

        let dictionary_form = if dictionary_form_word_id >= 0
            && dictionary_form_word_id as u32 != word_id
        {
            self.get(dictionary_form_word_id as u32)?.surface
        } else {
            surface.clone()
        };

        Ok(WordInfo {
            surface,
            headword_length,
            pos_id,
            normalized_form,
            dictionary_form_word_id,
            dictionary_form,
            reading_form,
            a_unit_split: self.validated_split(a_unit_split),
            b_unit_split: self.validated_split(b_unit_split),
            word_structure: self.validated_split(word_structure),
        })
    }

    /// A split array with a local reference beyond the word count is
    /// broken; it is dropped rather than followed.
    fn validated_split(&self, split: Vec<u32>) -> Vec<u32> {
        let valid = split
            .iter()
            .all(|&id| id >> 28 != 0 || id < self.word_size);
        if valid {
            split
        } else {
            vec![]
        }
    }
}
