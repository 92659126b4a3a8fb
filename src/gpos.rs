//! Applying pair adjustment lookups to a run of glyphs.
//!
//! > The GPOS table provides precise control over glyph placement for sophisticated text
//! > layout and rendering in each script and language system that a font supports.
//!
//! — <https://learn.microsoft.com/en-us/typography/opentype/spec/gpos>
//!
//! A [PairPosLookup] owns the decoded subtables of one lookup and steps a
//! [GlyphSequence] of [Info] forward one match at a time:
//!
//! ```
//! use pairpos::binary::read::ReadScope;
//! use pairpos::context::GlyphSequence;
//! use pairpos::gpos::{Info, PairPosLookup};
//!
//! # fn shape(lookup_data: &[u8]) -> Result<Vec<Info>, pairpos::error::ParseError> {
//! let lookup = ReadScope::new(lookup_data).read::<PairPosLookup>()?;
//! let mut infos = Info::init_from_glyphs(&[36, 68, 81]);
//! let mut seq = GlyphSequence::new(&mut infos);
//! while !seq.is_done() {
//!     lookup.try_match(None, &mut seq);
//! }
//! # Ok(infos)
//! # }
//! ```

use log::warn;

use crate::binary::read::{ReadBinary, ReadCtxt, ReadScope};
use crate::binary::U16Be;
use crate::context::{Glyph, GlyphSequence, LookupFlag, MatchType};
use crate::error::ParseError;
use crate::gdef::GDEFTable;
use crate::layout::{Adjust, PairValue, ValueRecord};
use crate::pairpos::{PairPos, PairPosFormat1, PairPosFormat2};

/// Lookup type of pair adjustment positioning.
pub const LOOKUP_TYPE_PAIR: u16 = 2;
/// Lookup type of extension positioning.
pub const LOOKUP_TYPE_EXTENSION: u16 = 9;

/// Adjustment to the placement of a glyph as a result of pair positioning.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Placement {
    None,
    /// Placement offset by distance delta.
    ///
    /// Fields
    /// (delta x, delta y)
    Distance(i32, i32),
}

impl Placement {
    fn combine_distance(&mut self, x2: i32, y2: i32) {
        *self = match *self {
            Placement::None => Placement::Distance(x2, y2),
            Placement::Distance(x1, y1) => Placement::Distance(x1 + x2, y1 + y2),
        }
    }
}

/// A positioned glyph.
///
/// Pair positioning only ever adds to the positioning fields. They start out zeroed and are
/// never read back while matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Info {
    pub glyph_index: u16,
    /// An offset from the horizontal glyph advance position for this glyph.
    pub kerning: i32,
    /// An offset from the vertical glyph advance position for this glyph.
    pub y_advance: i32,
    /// When not `Placement::None` indicates that this glyph should be placed according to
    /// the variant.
    pub placement: Placement,
}

impl Glyph for Info {
    fn get_glyph_index(&self) -> u16 {
        self.glyph_index
    }
}

impl Info {
    pub fn new(glyph_index: u16) -> Info {
        Info {
            glyph_index,
            kerning: 0,
            y_advance: 0,
            placement: Placement::None,
        }
    }

    pub fn init_from_glyphs(glyphs: &[u16]) -> Vec<Info> {
        glyphs.iter().copied().map(Info::new).collect()
    }
}

impl Adjust {
    /// Add this adjustment to the positioning of `info`.
    ///
    /// Device and variation index references are not applied.
    pub fn apply(&self, info: &mut Info) {
        if self.x_placement != 0 || self.y_placement != 0 {
            info.placement
                .combine_distance(i32::from(self.x_placement), i32::from(self.y_placement));
        }
        info.kerning += i32::from(self.x_advance);
        info.y_advance += i32::from(self.y_advance);
    }
}

fn adjust(info: &mut Info, value_record: &ValueRecord) {
    if let Some(adj) = value_record {
        adj.apply(info);
    }
}

impl GlyphSequence<'_, Info> {
    /// Apply a matched pair value to the glyphs at `i1` and `i2`, then move the cursor to `i2`.
    pub(crate) fn apply_pair(&mut self, i1: usize, i2: usize, pair_value: &PairValue) {
        if let Some(info) = self.glyph_mut(i1) {
            adjust(info, &pair_value.first);
        }
        if let Some(info) = self.glyph_mut(i2) {
            adjust(info, &pair_value.second);
        }
        self.set_index(i2);
    }
}

/// A pair adjustment lookup: its subtables in font order and the glyphs it skips over.
pub struct PairPosLookup {
    lookup_flag: LookupFlag,
    opt_mark_filtering_set: Option<u16>,
    match_type: MatchType,
    subtables: Vec<PairPos>,
    unsupported_subtables: usize,
}

impl PairPosLookup {
    /// Read the pair positioning subtables at `subtable_offsets` from `scope`.
    ///
    /// Subtables with a format other than 1 or 2 are skipped and counted in
    /// `unsupported_subtables`. Any other problem reading a subtable is an error.
    pub fn from_subtables(
        scope: ReadScope<'_>,
        lookup_flag: LookupFlag,
        opt_mark_filtering_set: Option<u16>,
        subtable_offsets: impl IntoIterator<Item = usize>,
    ) -> Result<PairPosLookup, ParseError> {
        let mut subtables = Vec::new();
        let mut unsupported_subtables = 0;
        for subtable_offset in subtable_offsets {
            let subtable_scope = scope.offset(subtable_offset);
            match subtable_scope.read::<U16Be>()? {
                1 => subtables.push(PairPos::Format1(
                    subtable_scope.read::<PairPosFormat1>()?,
                )),
                2 => subtables.push(PairPos::Format2(
                    subtable_scope.read::<PairPosFormat2>()?,
                )),
                format => {
                    warn!(
                        "skipping pair pos subtable with unsupported format {} at offset {}",
                        format,
                        subtable_scope.base()
                    );
                    unsupported_subtables += 1;
                }
            }
        }
        Ok(PairPosLookup {
            lookup_flag,
            opt_mark_filtering_set,
            match_type: MatchType::from_lookup_flag(lookup_flag, opt_mark_filtering_set),
            subtables,
            unsupported_subtables,
        })
    }

    pub fn lookup_flag(&self) -> LookupFlag {
        self.lookup_flag
    }

    pub fn mark_filtering_set(&self) -> Option<u16> {
        self.opt_mark_filtering_set
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn subtables(&self) -> &[PairPos] {
        &self.subtables
    }

    /// The number of subtables skipped because their format is not supported.
    pub fn unsupported_subtables(&self) -> usize {
        self.unsupported_subtables
    }

    /// The adjustment the first subtable with a rule for `glyph1` followed by `glyph2` gives.
    pub fn lookup_pair(&self, glyph1: u16, glyph2: u16) -> Option<&PairValue> {
        self.subtables
            .iter()
            .find_map(|subtable| subtable.lookup(glyph1, glyph2))
    }

    /// Try to match a pair starting at the cursor.
    ///
    /// On a match both glyphs are adjusted and the cursor moves to the second glyph of the pair.
    /// Otherwise the cursor moves on by one glyph. Either way the cursor advances unless it is
    /// already at the end of the sequence.
    pub fn try_match(
        &self,
        opt_gdef_table: Option<&GDEFTable>,
        seq: &mut GlyphSequence<'_, Info>,
    ) -> bool {
        let ignorable = match seq.current() {
            Some(info) => self.match_type.is_ignorable(opt_gdef_table, info),
            None => return false,
        };
        if ignorable {
            seq.advance();
            return false;
        }
        for subtable in &self.subtables {
            if subtable.try_match(self.match_type, opt_gdef_table, seq) {
                return true;
            }
        }
        seq.advance();
        false
    }

    /// Apply the lookup to every glyph of `infos`.
    pub fn apply(&self, opt_gdef_table: Option<&GDEFTable>, infos: &mut [Info]) {
        let mut seq = GlyphSequence::new(infos);
        while !seq.is_done() {
            self.try_match(opt_gdef_table, &mut seq);
        }
    }
}

impl ReadBinary for PairPosLookup {
    type HostType<'a> = Self;

    /// Read a Lookup table of type 2, or of type 9 wrapping pair positioning subtables.
    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let lookup_type = ctxt.read_u16be()?;
        let lookup_flag = LookupFlag(ctxt.read_u16be()?);
        let subtable_count = usize::from(ctxt.read_u16be()?);
        let subtable_offsets = ctxt.read_array::<U16Be>(subtable_count)?;
        let opt_mark_filtering_set = if lookup_flag.get_use_mark_filtering_set() {
            Some(ctxt.read_u16be()?)
        } else {
            None
        };

        let subtable_offsets: Vec<usize> = match lookup_type {
            LOOKUP_TYPE_PAIR => subtable_offsets.iter().map(usize::from).collect(),
            LOOKUP_TYPE_EXTENSION => {
                let mut offsets = Vec::with_capacity(subtable_count);
                for extension_offset in &subtable_offsets {
                    let extension_offset = usize::from(extension_offset);
                    let mut extension = scope.offset(extension_offset).ctxt();
                    let format = extension.read_u16be()?;
                    extension.check_version(format == 1)?;
                    let extension_lookup_type = extension.read_u16be()?;
                    extension.check_version(extension_lookup_type == LOOKUP_TYPE_PAIR)?;
                    let subtable_offset = usize::try_from(extension.read_u32be()?)?;
                    offsets.push(extension_offset + subtable_offset);
                }
                offsets
            }
            _ => return Err(ParseError::BadVersion),
        };

        PairPosLookup::from_subtables(
            scope,
            lookup_flag,
            opt_mark_filtering_set,
            subtable_offsets,
        )
    }
}
