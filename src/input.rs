//! Input text and its builder.
//!
//! The builder holds the modified character sequence while rewriters run;
//! `build` freezes it into an [`InputText`] carrying the byte-level tables
//! the lattice and the OOV providers operate on.

use crate::dictionary::character::{CategorySet, CharacterCategory};

/// Mutable view of the input during character rewriting.
///
/// Positions are character indices into the modified text. Every position
/// of a replaced window inherits the original-text offset of the window
/// start, so surfaces can always be sliced out of the original text.
pub struct InputTextBuilder {
    original: String,
    modified: Vec<char>,
    text_offsets: Vec<usize>,
}

impl InputTextBuilder {
    pub fn new(text: &str) -> Self {
        let modified: Vec<char> = text.chars().collect();
        let mut text_offsets = Vec::with_capacity(modified.len() + 1);
        for i in 0..=modified.len() {
            text_offsets.push(i);
        }
        Self {
            original: text.to_string(),
            modified,
            text_offsets,
        }
    }

    /// Snapshot of the modified characters.
    pub fn text(&self) -> Vec<char> {
        self.modified.clone()
    }

    /// Splices `replacement` over the character window `begin..end`.
    pub fn replace(&mut self, begin: usize, end: usize, replacement: &str) {
        let offset = self.text_offsets[begin];
        let repl: Vec<char> = replacement.chars().collect();
        let repl_len = repl.len();
        self.modified.splice(begin..end, repl);
        self.text_offsets
            .splice(begin..end, std::iter::repeat(offset).take(repl_len));
    }

    /// Freezes the builder, computing categories, byte tables, category
    /// continuities, and beginning-of-word permissions.
    pub fn build(self, category: &CharacterCategory) -> InputText {
        let char_count = self.modified.len();

        let mut char_categories = Vec::with_capacity(char_count);
        for &c in &self.modified {
            char_categories.push(category.get_category_types(c));
        }

        let modified_text: String = self.modified.iter().collect();
        let byte_length = modified_text.len();

        let mut char_sizes = Vec::with_capacity(char_count);
        let mut byte_indexes = Vec::with_capacity(byte_length + 1);
        let mut offsets = Vec::with_capacity(byte_length + 1);
        for (i, &c) in self.modified.iter().enumerate() {
            let size = c.len_utf8();
            char_sizes.push(size);
            for _ in 0..size {
                byte_indexes.push(i);
                offsets.push(self.text_offsets[i]);
            }
        }
        byte_indexes.push(char_count);
        offsets.push(self.text_offsets[char_count]);

        let mut continuities = vec![0; byte_length];
        let mut p = 0;
        let mut i = 0;
        while i < char_count {
            let next = i + continuous_length(&char_categories, i);
            let run_bytes: usize = char_sizes[i..next].iter().sum();
            for k in (1..=run_bytes).rev() {
                continuities[p] = k;
                p += 1;
            }
            i = next;
        }

        let mut can_bow = vec![false; char_count];
        if char_count > 0 {
            can_bow[0] = true;
            for i in 1..char_count {
                let types = char_categories[i];
                if types
                    .intersects(CategorySet::ALPHA | CategorySet::GREEK | CategorySet::CYRILLIC)
                {
                    can_bow[i] = (char_categories[i - 1] & types).is_empty();
                } else {
                    can_bow[i] = true;
                }
            }
        }

        let mut original_c2b = Vec::with_capacity(self.original.chars().count() + 1);
        for (bi, _) in self.original.char_indices() {
            original_c2b.push(bi);
        }
        original_c2b.push(self.original.len());

        InputText {
            original: self.original,
            original_c2b,
            modified: modified_text,
            chars: self.modified,
            offsets,
            byte_indexes,
            char_categories,
            continuities,
            can_bow,
        }
    }
}

fn continuous_length(char_categories: &[CategorySet], offset: usize) -> usize {
    let continuous = char_categories[offset];
    let mut length = 1;
    while length < char_categories.len() - offset {
        if (continuous & char_categories[offset + length]).is_empty() {
            return length;
        }
        length += 1;
    }
    length
}

/// Immutable analyzed input: original and modified texts plus the parallel
/// byte tables.
#[derive(Clone)]
pub struct InputText {
    original: String,
    original_c2b: Vec<usize>,
    modified: String,
    chars: Vec<char>,
    /// Byte position -> original-text character index.
    offsets: Vec<usize>,
    /// Byte position -> modified-text character index.
    byte_indexes: Vec<usize>,
    /// Modified-text character index -> category set.
    char_categories: Vec<CategorySet>,
    /// Byte position -> remaining bytes sharing a category intersection.
    continuities: Vec<usize>,
    /// Modified-text character index -> beginning-of-word permission.
    can_bow: Vec<bool>,
}

impl InputText {
    #[inline(always)]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline(always)]
    pub fn modified(&self) -> &str {
        &self.modified
    }

    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        self.modified.as_bytes()
    }

    /// Modified-text slice between two byte positions.
    pub fn substring(&self, begin: usize, end: usize) -> String {
        self.chars[self.byte_indexes[begin]..self.byte_indexes[end]]
            .iter()
            .collect()
    }

    /// Original-text slice behind the modified byte window `begin..end`.
    pub fn original_substring(&self, begin: usize, end: usize) -> &str {
        let from = self.original_c2b[self.offsets[begin]];
        let to = self.original_c2b[self.offsets[end]];
        &self.original[from..to]
    }

    /// Original-text character index behind a modified byte position.
    #[inline(always)]
    pub fn original_index(&self, byte_pos: usize) -> usize {
        self.offsets[byte_pos]
    }

    /// Modified-text character index of a byte position.
    #[inline(always)]
    pub fn char_index(&self, byte_pos: usize) -> usize {
        self.byte_indexes[byte_pos]
    }

    #[inline(always)]
    pub fn char_category_types(&self, byte_pos: usize) -> CategorySet {
        self.char_categories[self.byte_indexes[byte_pos]]
    }

    /// Intersection of categories over the byte window, empty if the window
    /// leaves the continuity run of its first character.
    pub fn char_category_types_range(&self, begin: usize, end: usize) -> CategorySet {
        if begin + self.continuities[begin] < end {
            return CategorySet::empty();
        }
        let b = self.byte_indexes[begin];
        let e = self.byte_indexes[end];
        let mut continuous = self.char_categories[b];
        for i in b + 1..e {
            continuous &= self.char_categories[i];
        }
        continuous
    }

    #[inline(always)]
    pub fn char_category_continuous_length(&self, byte_pos: usize) -> usize {
        self.continuities[byte_pos]
    }

    /// Byte length of the `code_point_offset` characters following
    /// `byte_pos`.
    pub fn code_points_offset_length(&self, byte_pos: usize, code_point_offset: usize) -> usize {
        let target = self.byte_indexes[byte_pos] + code_point_offset;
        let mut length = 0;
        for i in byte_pos..self.modified.len() {
            if self.byte_indexes[i] >= target {
                return length;
            }
            length += 1;
        }
        length
    }

    /// Number of characters between two byte positions.
    #[inline(always)]
    pub fn code_point_count(&self, begin: usize, end: usize) -> usize {
        self.byte_indexes[end] - self.byte_indexes[begin]
    }

    /// Whether a word may start at this byte position.
    #[inline(always)]
    pub fn can_bow(&self, byte_pos: usize) -> bool {
        self.is_char_alignment(byte_pos) && self.can_bow[self.byte_indexes[byte_pos]]
    }

    /// UTF-8 leading-byte test.
    #[inline(always)]
    pub fn is_char_alignment(&self, byte_pos: usize) -> bool {
        self.bytes()[byte_pos] & 0xC0 != 0x80
    }
}
