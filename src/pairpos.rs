//! Pair adjustment positioning subtables (`GPOS` lookup type 2).
//!
//! > A pair adjustment positioning subtable (PairPos) is used to adjust the placement or
//! > advances of two glyphs in relation to one another.
//!
//! — <https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-2-pair-adjustment-positioning-subtable>
//!
//! Both subtable formats are decoded up front into owned tables that are never modified
//! afterwards, so a table can be shared between threads shaping different runs.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFixedSizeDep};
use crate::binary::U16Be;
use crate::context::{Glyph, GlyphSequence, MatchType};
use crate::error::ParseError;
use crate::gdef::GDEFTable;
use crate::gpos::Info;
use crate::layout::{ClassDef, Coverage, PairValue, ValueFormat};
use crate::size;

/// Pair positioning by individual glyph pairs.
pub struct PairPosFormat1 {
    pairs: FxHashMap<u16, FxHashMap<u16, PairValue>>,
}

/// Pair positioning by glyph class.
pub struct PairPosFormat2 {
    coverage: Coverage,
    classdef1: ClassDef,
    classdef2: ClassDef,
    class1_count: usize,
    class2_count: usize,
    /// Row-major `class1_count` x `class2_count` matrix. Empty when both value formats are
    /// empty, as every cell is then `EMPTY_PAIR_VALUE`.
    class_values: Vec<PairValue>,
}

static EMPTY_PAIR_VALUE: PairValue = PairValue {
    first: None,
    second: None,
};

pub enum PairPos {
    Format1(PairPosFormat1),
    Format2(PairPosFormat2),
}

struct PairSet {
    pair_values: FxHashMap<u16, PairValue>,
}

struct PairValueRecord {
    second_glyph: u16,
    pair_value: PairValue,
}

impl ReadBinary for PairPosFormat1 {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let format = ctxt.read_u16be()?;
        ctxt.check_version(format == 1)?;
        let coverage_offset = usize::from(ctxt.read_u16be()?);
        let value_format1 = ctxt.read::<ValueFormat>()?;
        let value_format2 = ctxt.read::<ValueFormat>()?;
        let pairset_count = usize::from(ctxt.read_u16be()?);
        let pairset_offsets = ctxt.read_array::<U16Be>(pairset_count)?;

        // Pair set `k` holds the pairs starting with the `k`th covered glyph.
        let coverage = scope.offset(coverage_offset).read::<Coverage>()?;
        let glyph_count = coverage.glyph_count();
        ctxt.check_index(glyph_count >= pairset_count)?;
        if glyph_count > pairset_count {
            debug!(
                "pair pos coverage has {} glyphs but only {} pair sets",
                glyph_count, pairset_count
            );
        }

        let mut pairs =
            FxHashMap::with_capacity_and_hasher(pairset_count, Default::default());
        let first_glyphs = coverage.glyphs().take(pairset_count);
        for (first_glyph, pairset_offset) in first_glyphs.zip(&pairset_offsets) {
            let pairset = scope
                .offset(usize::from(pairset_offset))
                .read_dep::<PairSet>((value_format1, value_format2))?;
            // A later pair set for the same glyph replaces an earlier one
            pairs.insert(first_glyph, pairset.pair_values);
        }
        Ok(PairPosFormat1 { pairs })
    }
}

impl ReadBinaryDep for PairSet {
    type Args<'a> = (ValueFormat, ValueFormat);
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, args: Self::Args<'a>) -> Result<Self, ParseError> {
        let pair_value_count = usize::from(ctxt.read_u16be()?);
        let records = ctxt.read_array_dep::<PairValueRecord>(pair_value_count, args)?;
        let mut pair_values =
            FxHashMap::with_capacity_and_hasher(pair_value_count, Default::default());
        for record in records.iter_res() {
            let record = record?;
            // The last record for a glyph wins
            pair_values.insert(record.second_glyph, record.pair_value);
        }
        Ok(PairSet { pair_values })
    }
}

impl ReadBinaryDep for PairValueRecord {
    type Args<'a> = (ValueFormat, ValueFormat);
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, args: Self::Args<'a>) -> Result<Self, ParseError> {
        let second_glyph = ctxt.read_u16be()?;
        let pair_value = ctxt.read_dep::<PairValue>(args)?;
        Ok(PairValueRecord {
            second_glyph,
            pair_value,
        })
    }
}

impl ReadFixedSizeDep for PairValueRecord {
    fn size(args: Self::Args<'_>) -> usize {
        size::U16 + PairValue::size(args)
    }
}

impl ReadBinary for PairPosFormat2 {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let format = ctxt.read_u16be()?;
        ctxt.check_version(format == 2)?;
        let coverage_offset = usize::from(ctxt.read_u16be()?);
        let value_format1 = ctxt.read::<ValueFormat>()?;
        let value_format2 = ctxt.read::<ValueFormat>()?;
        let classdef1_offset = usize::from(ctxt.read_u16be()?);
        let classdef2_offset = usize::from(ctxt.read_u16be()?);
        let class1_count = usize::from(ctxt.read_u16be()?);
        let class2_count = usize::from(ctxt.read_u16be()?);
        let value_formats = (value_format1, value_format2);
        let class_values = if PairValue::size(value_formats) == 0 {
            Vec::new()
        } else {
            ctxt.read_array_dep::<PairValue>(class1_count * class2_count, value_formats)?
                .read_to_vec()?
        };

        let coverage = scope.offset(coverage_offset).read::<Coverage>()?;
        let classdef1 = scope.offset(classdef1_offset).read::<ClassDef>()?;
        let classdef2 = scope.offset(classdef2_offset).read::<ClassDef>()?;

        Ok(PairPosFormat2 {
            coverage,
            classdef1,
            classdef2,
            class1_count,
            class2_count,
            class_values,
        })
    }
}

impl PairPosFormat1 {
    /// The adjustment for `glyph1` followed by `glyph2`, if there is one.
    pub fn lookup(&self, glyph1: u16, glyph2: u16) -> Option<&PairValue> {
        self.pairs.get(&glyph1)?.get(&glyph2)
    }

    /// Match the glyph under the cursor and the next glyph `match_type` does not skip.
    ///
    /// On a match both glyphs are adjusted and the cursor moves to the second glyph. Otherwise
    /// nothing is changed.
    pub fn try_match(
        &self,
        match_type: MatchType,
        opt_gdef_table: Option<&GDEFTable>,
        seq: &mut GlyphSequence<'_, Info>,
    ) -> bool {
        let i1 = seq.index();
        let second_glyphs = match seq
            .current()
            .and_then(|info| self.pairs.get(&info.get_glyph_index()))
        {
            Some(second_glyphs) => second_glyphs,
            None => return false,
        };
        let i2 = match seq.find_next(match_type, opt_gdef_table, i1) {
            Some(i2) => i2,
            None => return false,
        };
        match second_glyphs.get(&seq.glyphs()[i2].get_glyph_index()) {
            Some(pair_value) => {
                seq.apply_pair(i1, i2, pair_value);
                true
            }
            None => false,
        }
    }
}

impl PairPosFormat2 {
    pub fn class1_count(&self) -> usize {
        self.class1_count
    }

    pub fn class2_count(&self) -> usize {
        self.class2_count
    }

    /// The adjustment for `glyph1` followed by `glyph2`, if there is one.
    pub fn lookup(&self, glyph1: u16, glyph2: u16) -> Option<&PairValue> {
        self.coverage.glyph_coverage_value(glyph1)?;
        let class1 = self.class1(glyph1)?;
        self.class_value(class1, glyph2)
    }

    /// Match the glyph under the cursor and the next glyph `match_type` does not skip.
    ///
    /// On a match both glyphs are adjusted and the cursor moves to the second glyph. Otherwise
    /// nothing is changed.
    pub fn try_match(
        &self,
        match_type: MatchType,
        opt_gdef_table: Option<&GDEFTable>,
        seq: &mut GlyphSequence<'_, Info>,
    ) -> bool {
        let i1 = seq.index();
        let glyph1 = match seq.current() {
            Some(info) => info.get_glyph_index(),
            None => return false,
        };
        if self.coverage.glyph_coverage_value(glyph1).is_none() {
            return false;
        }
        let class1 = match self.class1(glyph1) {
            Some(class1) => class1,
            None => return false,
        };
        let i2 = match seq.find_next(match_type, opt_gdef_table, i1) {
            Some(i2) => i2,
            None => return false,
        };
        match self.class_value(class1, seq.glyphs()[i2].get_glyph_index()) {
            Some(pair_value) => {
                seq.apply_pair(i1, i2, pair_value);
                true
            }
            None => false,
        }
    }

    fn class1(&self, glyph1: u16) -> Option<usize> {
        let class1 = usize::from(self.classdef1.glyph_class_value(glyph1));
        if class1 < self.class1_count {
            Some(class1)
        } else {
            // ClassDef1 is meant to only produce classes the matrix has rows for
            warn!(
                "pair pos class {} of glyph {} exceeds class1 count {}",
                class1, glyph1, self.class1_count
            );
            None
        }
    }

    fn class_value(&self, class1: usize, glyph2: u16) -> Option<&PairValue> {
        let class2 = usize::from(self.classdef2.glyph_class_value(glyph2));
        if class2 >= self.class2_count {
            debug!(
                "pair pos class {} of glyph {} exceeds class2 count {}",
                class2, glyph2, self.class2_count
            );
            return None;
        }
        if self.class_values.is_empty() {
            return Some(&EMPTY_PAIR_VALUE);
        }
        self.class_values.get(class1 * self.class2_count + class2)
    }
}

impl PairPos {
    /// The adjustment for `glyph1` followed by `glyph2`, if there is one.
    pub fn lookup(&self, glyph1: u16, glyph2: u16) -> Option<&PairValue> {
        match self {
            PairPos::Format1(format1) => format1.lookup(glyph1, glyph2),
            PairPos::Format2(format2) => format2.lookup(glyph1, glyph2),
        }
    }

    pub fn try_match(
        &self,
        match_type: MatchType,
        opt_gdef_table: Option<&GDEFTable>,
        seq: &mut GlyphSequence<'_, Info>,
    ) -> bool {
        match self {
            PairPos::Format1(format1) => format1.try_match(match_type, opt_gdef_table, seq),
            PairPos::Format2(format2) => format2.try_match(match_type, opt_gdef_table, seq),
        }
    }
}
