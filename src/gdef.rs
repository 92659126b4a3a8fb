//! `GDEF` font table parsing and glyph class utilities.
//!
//! Only the parts of `GDEF` that decide which glyphs a lookup skips are read.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/gdef>

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::U32Be;
use crate::error::ParseError;
use crate::layout::{ClassDef, Coverage};
use crate::size;

pub const GLYPH_CLASS_NONE: u16 = 0;
pub const GLYPH_CLASS_BASE: u16 = 1;
pub const GLYPH_CLASS_LIGATURE: u16 = 2;
pub const GLYPH_CLASS_MARK: u16 = 3;

pub struct GDEFTable {
    pub opt_glyph_classdef: Option<ClassDef>,
    pub opt_mark_attach_classdef: Option<ClassDef>,
    pub opt_mark_glyph_sets: Option<Vec<Coverage>>,
}

impl ReadBinary for GDEFTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let table = ctxt.scope();

        let major_version = ctxt.read_u16be()?;
        ctxt.check_version(major_version == 1)?;
        let minor_version = ctxt.read_u16be()?;
        let glyph_classdef_offset = usize::from(ctxt.read_u16be()?);
        let _attach_list_offset = ctxt.read_u16be()?;
        let _lig_caret_list_offset = ctxt.read_u16be()?;
        // MarkAttachClassDef was added in OpenType 1.2 without a version bump, so it is always
        // read.
        let mark_attach_classdef_offset = usize::from(ctxt.read_u16be()?);
        let mark_glyph_sets_offset = if minor_version >= 2 {
            usize::from(ctxt.read_u16be()?)
        } else {
            0
        };

        let gdef_header_size = 6 * size::U16;

        // Offsets that point into the header are treated as absent.
        let opt_glyph_classdef = if glyph_classdef_offset < gdef_header_size {
            None
        } else {
            Some(table.offset(glyph_classdef_offset).read::<ClassDef>()?)
        };
        let opt_mark_attach_classdef = if mark_attach_classdef_offset < gdef_header_size {
            None
        } else {
            Some(
                table
                    .offset(mark_attach_classdef_offset)
                    .read::<ClassDef>()?,
            )
        };
        let opt_mark_glyph_sets = if mark_glyph_sets_offset < gdef_header_size {
            None
        } else {
            let sets_table = table.offset(mark_glyph_sets_offset);
            let mut sets_ctxt = sets_table.ctxt();
            let format = sets_ctxt.read_u16be()?;
            sets_ctxt.check_version(format == 1)?;
            let count = usize::from(sets_ctxt.read_u16be()?);
            let coverage_offsets = sets_ctxt.read_array::<U32Be>(count)?;
            let mut sets = Vec::with_capacity(count);
            for coverage_offset in &coverage_offsets {
                let coverage_offset = usize::try_from(coverage_offset)?;
                sets.push(sets_table.offset(coverage_offset).read::<Coverage>()?);
            }
            Some(sets)
        };

        Ok(GDEFTable {
            opt_glyph_classdef,
            opt_mark_attach_classdef,
            opt_mark_glyph_sets,
        })
    }
}

pub fn glyph_class(opt_gdef_table: Option<&GDEFTable>, glyph: u16) -> u16 {
    opt_gdef_table
        .and_then(|gdef| gdef.opt_glyph_classdef.as_ref())
        .map(|glyph_classdef| glyph_classdef.glyph_class_value(glyph))
        .unwrap_or(GLYPH_CLASS_NONE)
}

pub fn mark_attach_class(opt_gdef_table: Option<&GDEFTable>, glyph: u16) -> u16 {
    opt_gdef_table
        .and_then(|gdef| gdef.opt_mark_attach_classdef.as_ref())
        .map(|mark_attach_classdef| mark_attach_classdef.glyph_class_value(glyph))
        .unwrap_or(GLYPH_CLASS_NONE)
}

/// Whether `glyph` is in the mark glyph set at `index`.
///
/// A missing set contains no glyphs.
pub fn glyph_is_in_mark_set(opt_gdef_table: Option<&GDEFTable>, glyph: u16, index: usize) -> bool {
    opt_gdef_table
        .and_then(|gdef| gdef.opt_mark_glyph_sets.as_ref())
        .and_then(|mark_glyph_sets| mark_glyph_sets.get(index))
        .is_some_and(|mark_set| mark_set.glyph_coverage_value(glyph).is_some())
}
