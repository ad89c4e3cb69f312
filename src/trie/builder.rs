use crate::errors::{Result, StaccatoError};
use crate::trie::dawg::{DawgBuilder, DAWG_ROOT};

const BLOCK_SIZE: usize = 256;
const NUM_EXTRA_BLOCKS: usize = 16;
const NUM_EXTRAS: usize = BLOCK_SIZE * NUM_EXTRA_BLOCKS;
const UPPER_MASK: usize = 0xFF << 21;
const LOWER_MASK: usize = 0xFF;

#[inline(always)]
fn set_has_leaf(unit: u32, has_leaf: bool) -> u32 {
    if has_leaf {
        unit | 1 << 8
    } else {
        unit & !(1 << 8)
    }
}

#[inline(always)]
fn value_unit(value: u32) -> u32 {
    value | 1 << 31
}

#[inline(always)]
fn set_label(unit: u32, label: u8) -> u32 {
    (unit & !0xFF) | u32::from(label)
}

/// Stores a relative offset, switching to the extended encoding (bit 9,
/// offset shifted by 8 instead of 2) when it does not fit in 21 bits. The
/// offset validity check guarantees the low 8 bits are zero in that case.
#[inline(always)]
fn set_offset(unit: u32, offset: u32) -> u32 {
    let unit = unit & ((1 << 31) | (1 << 8) | 0xFF);
    if offset < 1 << 21 {
        unit | offset << 10
    } else {
        unit | (offset << 2) | (1 << 9)
    }
}

struct KeySet<'a> {
    keys: &'a [&'a [u8]],
    values: Option<&'a [u32]>,
}

impl<'a> KeySet<'a> {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn key(&self, id: usize) -> &[u8] {
        self.keys[id]
    }

    fn key_byte(&self, key_id: usize, byte_id: usize) -> u8 {
        if byte_id >= self.keys[key_id].len() {
            return 0;
        }
        self.keys[key_id][byte_id]
    }

    fn value(&self, id: usize) -> u32 {
        self.values.map_or(id as u32, |v| v[id])
    }
}

#[derive(Default, Clone, Copy)]
struct ExtraUnit {
    prev: usize,
    next: usize,
    is_fixed: bool,
    is_used: bool,
}

/// Transforms a DAWG or a sorted key set into the packed double array.
///
/// The array grows in 256-unit blocks. Only the last 16 blocks keep
/// modifiable free-list bookkeeping; older blocks are fixed with filler
/// labels so no stale slot can be misread as a reachable child.
pub struct DoubleArrayBuilder {
    units: Vec<u32>,
    extras: Vec<ExtraUnit>,
    labels: Vec<u8>,
    table: Vec<u32>,
    extras_head: usize,
}

impl DoubleArrayBuilder {
    /// Builds the double-array units for the given keys.
    ///
    /// Keys must be sorted in ascending byte-wise order. When `values` is
    /// given, the key set is first minimized into a DAWG so that shared
    /// suffixes share their placement; otherwise each key receives its index
    /// as the value.
    pub fn build<K>(keys: &[K], values: Option<&[u32]>) -> Result<Vec<u32>>
    where
        K: AsRef<[u8]>,
    {
        let keys: Vec<&[u8]> = keys.iter().map(AsRef::as_ref).collect();
        if let Some(values) = values {
            if keys.len() != values.len() {
                return Err(StaccatoError::invalid_argument(
                    "values",
                    "keys and values must have the same length",
                ));
            }
        }
        let key_set = KeySet {
            keys: &keys,
            values,
        };

        let mut builder = Self {
            units: vec![],
            extras: vec![ExtraUnit::default(); NUM_EXTRAS],
            labels: vec![],
            table: vec![],
            extras_head: 0,
        };
        if key_set.values.is_some() {
            let mut dawg = DawgBuilder::new();
            for i in 0..key_set.len() {
                dawg.insert(key_set.key(i), key_set.value(i))?;
            }
            dawg.finish();
            builder.build_from_dawg_root(&dawg);
        } else {
            builder.build_from_key_set_root(&key_set)?;
        }
        Ok(builder.units)
    }

    /// Serializes units as little-endian `u32` words, the on-disk form.
    pub fn units_to_bytes(units: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(units.len() * 4);
        for unit in units {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    fn num_blocks(&self) -> usize {
        self.units.len() / BLOCK_SIZE
    }

    #[inline(always)]
    fn extra(&self, id: usize) -> ExtraUnit {
        self.extras[id % NUM_EXTRAS]
    }

    #[inline(always)]
    fn extra_mut(&mut self, id: usize) -> &mut ExtraUnit {
        &mut self.extras[id % NUM_EXTRAS]
    }

    fn build_from_dawg_root(&mut self, dawg: &DawgBuilder) {
        self.table = vec![0; dawg.num_intersections()];

        self.reserve_id(0);
        self.extra_mut(0).is_used = true;
        self.units[0] = set_offset(self.units[0], 1);
        self.units[0] = set_label(self.units[0], 0);

        if dawg.child(DAWG_ROOT) != 0 {
            self.build_from_dawg(dawg, DAWG_ROOT, 0);
        }

        self.fix_all_blocks();

        self.extras.clear();
        self.labels.clear();
        self.table.clear();
    }

    fn build_from_dawg(&mut self, dawg: &DawgBuilder, dawg_id: usize, dic_id: usize) {
        let dawg_child_id = dawg.child(dawg_id) as usize;
        if dawg.is_intersection(dawg_child_id) {
            let intersection_id = dawg.intersection_id(dawg_child_id);
            let offset = self.table[intersection_id] as usize;
            if offset != 0 {
                let offset = offset ^ dic_id;
                if offset & UPPER_MASK == 0 || offset & LOWER_MASK == 0 {
                    if dawg.is_leaf(dawg_child_id) {
                        self.units[dic_id] = set_has_leaf(self.units[dic_id], true);
                    }
                    self.units[dic_id] = set_offset(self.units[dic_id], offset as u32);
                    return;
                }
            }
        }

        let offset = self.arrange_from_dawg(dawg, dawg_id, dic_id);
        if dawg.is_intersection(dawg_child_id) {
            self.table[dawg.intersection_id(dawg_child_id)] = offset as u32;
        }

        let mut dawg_child_id = dawg_child_id;
        loop {
            let child_label = dawg.label(dawg_child_id);
            let dic_child_id = offset ^ usize::from(child_label);
            if child_label != 0 {
                self.build_from_dawg(dawg, dawg_child_id, dic_child_id);
            }
            dawg_child_id = dawg.sibling(dawg_child_id);
            if dawg_child_id == 0 {
                break;
            }
        }
    }

    fn arrange_from_dawg(&mut self, dawg: &DawgBuilder, dawg_id: usize, dic_id: usize) -> usize {
        self.labels.clear();

        let mut dawg_child_id = dawg.child(dawg_id) as usize;
        while dawg_child_id != 0 {
            self.labels.push(dawg.label(dawg_child_id));
            dawg_child_id = dawg.sibling(dawg_child_id);
        }

        let offset = self.find_valid_offset(dic_id);
        self.units[dic_id] = set_offset(self.units[dic_id], (dic_id ^ offset) as u32);

        let mut dawg_child_id = dawg.child(dawg_id) as usize;
        for i in 0..self.labels.len() {
            let label = self.labels[i];
            let dic_child_id = offset ^ usize::from(label);
            self.reserve_id(dic_child_id);

            if dawg.is_leaf(dawg_child_id) {
                self.units[dic_id] = set_has_leaf(self.units[dic_id], true);
                self.units[dic_child_id] = value_unit(dawg.value(dawg_child_id));
            } else {
                self.units[dic_child_id] = set_label(self.units[dic_child_id], label);
            }

            dawg_child_id = dawg.sibling(dawg_child_id);
        }
        self.extra_mut(offset).is_used = true;

        offset
    }

    fn build_from_key_set_root(&mut self, key_set: &KeySet) -> Result<()> {
        self.reserve_id(0);
        self.extra_mut(0).is_used = true;
        self.units[0] = set_offset(self.units[0], 1);
        self.units[0] = set_label(self.units[0], 0);

        if key_set.len() > 0 {
            self.build_from_key_set(key_set, 0, key_set.len(), 0, 0)?;
        }

        self.fix_all_blocks();

        self.extras.clear();
        self.labels.clear();

        Ok(())
    }

    fn build_from_key_set(
        &mut self,
        key_set: &KeySet,
        begin: usize,
        end: usize,
        depth: usize,
        dic_id: usize,
    ) -> Result<()> {
        let offset = self.arrange_from_key_set(key_set, begin, end, depth, dic_id)?;

        let mut begin = begin;
        while begin < end {
            if key_set.key_byte(begin, depth) != 0 {
                break;
            }
            begin += 1;
        }
        if begin == end {
            return Ok(());
        }

        let mut last_begin = begin;
        let mut last_label = key_set.key_byte(begin, depth);
        begin += 1;
        while begin < end {
            let label = key_set.key_byte(begin, depth);
            if label != last_label {
                self.build_from_key_set(
                    key_set,
                    last_begin,
                    begin,
                    depth + 1,
                    offset ^ usize::from(last_label),
                )?;
                last_begin = begin;
                last_label = key_set.key_byte(begin, depth);
            }
            begin += 1;
        }
        self.build_from_key_set(
            key_set,
            last_begin,
            end,
            depth + 1,
            offset ^ usize::from(last_label),
        )
    }

    fn arrange_from_key_set(
        &mut self,
        key_set: &KeySet,
        begin: usize,
        end: usize,
        depth: usize,
        dic_id: usize,
    ) -> Result<usize> {
        self.labels.clear();

        let mut value: i64 = -1;
        for i in begin..end {
            let label = key_set.key_byte(i, depth);
            if label == 0 {
                if depth < key_set.key(i).len() {
                    return Err(StaccatoError::invalid_argument(
                        "keys",
                        "invalid null character",
                    ));
                }
                if key_set.value(i) > i32::MAX as u32 {
                    return Err(StaccatoError::invalid_argument("keys", "negative value"));
                }
                if value == -1 {
                    value = i64::from(key_set.value(i));
                }
            }

            match self.labels.last() {
                None => self.labels.push(label),
                Some(&last) if label != last => {
                    if label < last {
                        return Err(StaccatoError::invalid_argument("keys", "wrong key order"));
                    }
                    self.labels.push(label);
                }
                _ => {}
            }
        }

        let offset = self.find_valid_offset(dic_id);
        self.units[dic_id] = set_offset(self.units[dic_id], (dic_id ^ offset) as u32);

        for i in 0..self.labels.len() {
            let label = self.labels[i];
            let dic_child_id = offset ^ usize::from(label);
            self.reserve_id(dic_child_id);

            if label == 0 {
                self.units[dic_id] = set_has_leaf(self.units[dic_id], true);
                self.units[dic_child_id] = value_unit(value as u32);
            } else {
                self.units[dic_child_id] = set_label(self.units[dic_child_id], label);
            }
        }
        self.extra_mut(offset).is_used = true;

        Ok(offset)
    }

    fn find_valid_offset(&self, id: usize) -> usize {
        if self.extras_head >= self.units.len() {
            return self.units.len() | (id & LOWER_MASK);
        }

        let mut unfixed_id = self.extras_head;
        loop {
            let offset = unfixed_id ^ usize::from(self.labels[0]);
            if self.is_valid_offset(id, offset) {
                return offset;
            }
            unfixed_id = self.extra(unfixed_id).next;
            if unfixed_id == self.extras_head {
                break;
            }
        }

        self.units.len() | (id & LOWER_MASK)
    }

    fn is_valid_offset(&self, id: usize, offset: usize) -> bool {
        if self.extra(offset).is_used {
            return false;
        }

        let rel_offset = id ^ offset;
        if rel_offset & LOWER_MASK != 0 && rel_offset & UPPER_MASK != 0 {
            return false;
        }

        for i in 1..self.labels.len() {
            if self.extra(offset ^ usize::from(self.labels[i])).is_fixed {
                return false;
            }
        }
        true
    }

    fn reserve_id(&mut self, id: usize) {
        if id >= self.units.len() {
            self.expand_units();
        }

        if id == self.extras_head {
            self.extras_head = self.extra(id).next;
            if self.extras_head == id {
                self.extras_head = self.units.len();
            }
        }
        let prev = self.extra(id).prev;
        let next = self.extra(id).next;
        self.extra_mut(prev).next = next;
        self.extra_mut(next).prev = prev;
        self.extra_mut(id).is_fixed = true;
    }

    fn expand_units(&mut self) {
        let src_num_units = self.units.len();
        let src_num_blocks = self.num_blocks();

        let dest_num_units = src_num_units + BLOCK_SIZE;
        let dest_num_blocks = src_num_blocks + 1;

        if dest_num_blocks > NUM_EXTRA_BLOCKS {
            self.fix_block(src_num_blocks - NUM_EXTRA_BLOCKS);
        }

        self.units.resize(dest_num_units, 0);
        if dest_num_blocks > NUM_EXTRA_BLOCKS {
            for id in src_num_units..dest_num_units {
                let e = self.extra_mut(id);
                e.is_used = false;
                e.is_fixed = false;
            }
        }

        for i in (src_num_units + 1)..dest_num_units {
            self.extra_mut(i - 1).next = i;
            self.extra_mut(i).prev = i - 1;
        }

        self.extra_mut(src_num_units).prev = dest_num_units - 1;
        self.extra_mut(dest_num_units - 1).next = src_num_units;

        let head_prev = self.extra(self.extras_head).prev;
        self.extra_mut(src_num_units).prev = head_prev;
        self.extra_mut(dest_num_units - 1).next = self.extras_head;

        self.extra_mut(head_prev).next = src_num_units;
        self.extra_mut(self.extras_head).prev = dest_num_units - 1;
    }

    fn fix_all_blocks(&mut self) {
        let end = self.num_blocks();
        let begin = end.saturating_sub(NUM_EXTRA_BLOCKS);

        for block_id in begin..end {
            self.fix_block(block_id);
        }
    }

    /// Assigns filler labels to every unreserved slot of the block so the
    /// final array has no hole that a lookup could mistake for a child.
    fn fix_block(&mut self, block_id: usize) {
        let begin = block_id * BLOCK_SIZE;
        let end = begin + BLOCK_SIZE;

        let mut unused_offset = 0;
        for offset in begin..end {
            if !self.extra(offset).is_used {
                unused_offset = offset;
                break;
            }
        }

        for id in begin..end {
            if !self.extra(id).is_fixed {
                self.reserve_id(id);
                self.units[id] = set_label(self.units[id], (id ^ unused_offset) as u8);
            }
        }
    }
}
