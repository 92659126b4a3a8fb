//! Lookup flags and the glyph skipping rules used when matching glyph pairs.

use crate::gdef::{self, GDEFTable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LookupFlag(pub u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IgnoreMarks {
    NoIgnoreMarks,
    IgnoreAllMarks,
    /// Ignore marks whose mark attachment class differs from this one.
    IgnoreMarksExcept(u8),
    /// Ignore marks outside the mark glyph set with this index.
    IgnoreMarksNotInSet(u16),
}

/// Decides which glyphs take part in matching, and which are skipped over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatchType {
    ignore_bases: bool,
    ignore_ligatures: bool,
    ignore_marks: IgnoreMarks,
}

pub trait Glyph {
    fn get_glyph_index(&self) -> u16;
}

impl Glyph for u16 {
    fn get_glyph_index(&self) -> u16 {
        *self
    }
}

impl LookupFlag {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;
    pub const USE_MARK_FILTERING_SET: u16 = 0x0010;
    pub const MARK_ATTACHMENT_TYPE_MASK: u16 = 0xFF00;

    pub fn get_rtl(self) -> bool {
        (self.0 & Self::RIGHT_TO_LEFT) != 0
    }

    pub fn get_ignore_bases(self) -> bool {
        (self.0 & Self::IGNORE_BASE_GLYPHS) != 0
    }

    pub fn get_ignore_ligatures(self) -> bool {
        (self.0 & Self::IGNORE_LIGATURES) != 0
    }

    pub fn get_use_mark_filtering_set(self) -> bool {
        (self.0 & Self::USE_MARK_FILTERING_SET) != 0
    }

    pub fn get_ignore_marks(self) -> IgnoreMarks {
        if (self.0 & Self::IGNORE_MARKS) != 0 {
            IgnoreMarks::IgnoreAllMarks
        } else if self.0 & Self::MARK_ATTACHMENT_TYPE_MASK != 0 {
            IgnoreMarks::IgnoreMarksExcept((self.0 >> 8) as u8)
        } else {
            IgnoreMarks::NoIgnoreMarks
        }
    }
}

impl MatchType {
    /// A `MatchType` that skips nothing.
    pub fn match_all() -> MatchType {
        MatchType {
            ignore_bases: false,
            ignore_ligatures: false,
            ignore_marks: IgnoreMarks::NoIgnoreMarks,
        }
    }

    pub fn ignore_marks() -> MatchType {
        MatchType {
            ignore_bases: false,
            ignore_ligatures: false,
            ignore_marks: IgnoreMarks::IgnoreAllMarks,
        }
    }

    /// Build the `MatchType` for a lookup.
    ///
    /// `opt_mark_filtering_set` is only consulted when the flag has `USE_MARK_FILTERING_SET`
    /// set. `IGNORE_MARKS` takes precedence over the filtering set, which takes precedence over
    /// the mark attachment type.
    pub fn from_lookup_flag(
        lookup_flag: LookupFlag,
        opt_mark_filtering_set: Option<u16>,
    ) -> MatchType {
        let ignore_marks = match (lookup_flag.get_ignore_marks(), opt_mark_filtering_set) {
            (IgnoreMarks::IgnoreAllMarks, _) => IgnoreMarks::IgnoreAllMarks,
            (_, Some(set_index)) if lookup_flag.get_use_mark_filtering_set() => {
                IgnoreMarks::IgnoreMarksNotInSet(set_index)
            }
            (ignore_marks, _) => ignore_marks,
        };
        MatchType {
            ignore_bases: lookup_flag.get_ignore_bases(),
            ignore_ligatures: lookup_flag.get_ignore_ligatures(),
            ignore_marks,
        }
    }

    pub fn match_glyph<G: Glyph>(self, opt_gdef_table: Option<&GDEFTable>, glyph: &G) -> bool {
        self.match_glyph_index(opt_gdef_table, glyph.get_glyph_index())
    }

    pub fn match_glyph_index(self, opt_gdef_table: Option<&GDEFTable>, glyph_index: u16) -> bool {
        if !self.ignore_bases
            && !self.ignore_ligatures
            && self.ignore_marks == IgnoreMarks::NoIgnoreMarks
        {
            // fast path that doesn't require checking glyph_class
            return true;
        }
        let glyph_class = gdef::glyph_class(opt_gdef_table, glyph_index);
        if self.ignore_bases && glyph_class == gdef::GLYPH_CLASS_BASE {
            return false;
        }
        if self.ignore_ligatures && glyph_class == gdef::GLYPH_CLASS_LIGATURE {
            return false;
        }
        if glyph_class != gdef::GLYPH_CLASS_MARK {
            return true;
        }
        match self.ignore_marks {
            IgnoreMarks::NoIgnoreMarks => true,
            IgnoreMarks::IgnoreAllMarks => false,
            IgnoreMarks::IgnoreMarksExcept(keep_class) => {
                gdef::mark_attach_class(opt_gdef_table, glyph_index) == u16::from(keep_class)
            }
            IgnoreMarks::IgnoreMarksNotInSet(set_index) => {
                gdef::glyph_is_in_mark_set(opt_gdef_table, glyph_index, usize::from(set_index))
            }
        }
    }

    /// Whether the lookup skips over `glyph` when looking for the next glyph to match.
    pub fn is_ignorable<G: Glyph>(self, opt_gdef_table: Option<&GDEFTable>, glyph: &G) -> bool {
        !self.match_glyph(opt_gdef_table, glyph)
    }
}

/// A run of glyphs being positioned, with a cursor.
///
/// The cursor always lies within `start..=end`. Only glyphs in `start..end` are matched.
pub struct GlyphSequence<'a, G> {
    glyphs: &'a mut [G],
    start: usize,
    end: usize,
    index: usize,
}

impl<'a, G: Glyph> GlyphSequence<'a, G> {
    /// A sequence covering all of `glyphs` with the cursor on the first glyph.
    pub fn new(glyphs: &'a mut [G]) -> GlyphSequence<'a, G> {
        let end = glyphs.len();
        GlyphSequence {
            glyphs,
            start: 0,
            end,
            index: 0,
        }
    }

    /// A sequence covering `glyphs[start..end]` with the cursor at `start`.
    ///
    /// Bounds are clamped to the length of `glyphs`.
    pub fn with_range(glyphs: &'a mut [G], start: usize, end: usize) -> GlyphSequence<'a, G> {
        let end = end.min(glyphs.len());
        let start = start.min(end);
        GlyphSequence {
            glyphs,
            start,
            end,
            index: start,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The position of the cursor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move the cursor, clamped to `start..=end`.
    pub fn set_index(&mut self, index: usize) {
        self.index = index.clamp(self.start, self.end);
    }

    /// Move the cursor on by one glyph.
    pub fn advance(&mut self) {
        self.set_index(self.index + 1);
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.end
    }

    /// The glyph under the cursor, if the cursor is before `end`.
    pub fn current(&self) -> Option<&G> {
        if self.index < self.end {
            self.glyphs.get(self.index)
        } else {
            None
        }
    }

    pub fn glyphs(&self) -> &[G] {
        self.glyphs
    }

    pub(crate) fn glyph_mut(&mut self, index: usize) -> Option<&mut G> {
        self.glyphs.get_mut(index)
    }

    /// Find the next glyph after `index` that `match_type` does not skip.
    ///
    /// The search stops at `end`. The sequence is not modified.
    pub fn find_next(
        &self,
        match_type: MatchType,
        opt_gdef_table: Option<&GDEFTable>,
        mut index: usize,
    ) -> Option<usize> {
        while index + 1 < self.end {
            index += 1;
            if match_type.match_glyph(opt_gdef_table, &self.glyphs[index]) {
                return Some(index);
            }
        }
        None
    }
}
