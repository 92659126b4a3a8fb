//! Common OpenType layout structures: coverage tables, class definitions and value records.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2>

use bitflags::bitflags;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFixedSizeDep, ReadFrom};
use crate::binary::U16Be;
use crate::error::ParseError;
use crate::size;

pub enum Coverage {
    Format1 {
        glyph_array: Vec<u16>,
    },
    Format2 {
        coverage_range_array: Vec<CoverageRangeRecord>,
    },
}

pub struct CoverageRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    start_coverage_index: u16,
}

impl ReadFrom for CoverageRangeRecord {
    type ReadType = (U16Be, U16Be, U16Be);
    fn read_from((start_glyph, end_glyph, start_coverage_index): (u16, u16, u16)) -> Self {
        CoverageRangeRecord {
            start_glyph,
            end_glyph,
            start_coverage_index,
        }
    }
}

impl ReadBinary for Coverage {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_u16be()? {
            1 => {
                let glyph_count = ctxt.read_u16be()?;
                let glyph_array = ctxt.read_array::<U16Be>(usize::from(glyph_count))?;
                // The glyph indices must be in numerical order for binary searching of the list.
                // https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-format-1
                Ok(Coverage::Format1 {
                    glyph_array: glyph_array.to_vec(),
                })
            }
            2 => {
                let coverage_range_count = ctxt.read_u16be()?;
                let coverage_range_vec = ctxt
                    .read_array::<CoverageRangeRecord>(usize::from(coverage_range_count))?
                    .to_vec();
                for coverage_range_record in &coverage_range_vec {
                    ctxt.check(
                        coverage_range_record.start_glyph <= coverage_range_record.end_glyph,
                    )?
                }
                Ok(Coverage::Format2 {
                    coverage_range_array: coverage_range_vec,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl Coverage {
    pub fn glyph_coverage_value(&self, glyph: u16) -> Option<u16> {
        match *self {
            Coverage::Format1 { ref glyph_array } => glyph_array
                .binary_search(&glyph)
                .ok()
                .and_then(|index| u16::try_from(index).ok()),
            Coverage::Format2 {
                ref coverage_range_array,
            } => coverage_range_array
                .iter()
                .find(|range| glyph >= range.start_glyph && glyph <= range.end_glyph)
                .map(|range| {
                    range
                        .start_coverage_index
                        .wrapping_add(glyph - range.start_glyph)
                }),
        }
    }

    /// Convenience method to count the total number of glyphs covered
    pub fn glyph_count(&self) -> usize {
        match self {
            Coverage::Format1 { glyph_array } => glyph_array.len(),
            Coverage::Format2 {
                coverage_range_array,
            } => coverage_range_array
                .iter()
                .fold(0, |acc, coverage_range_record| {
                    acc + (usize::from(coverage_range_record.end_glyph))
                        - (usize::from(coverage_range_record.start_glyph))
                        + 1
                }),
        }
    }

    /// The covered glyphs in coverage index order.
    ///
    /// The position of a glyph in the iteration is the index of the record associated with
    /// that glyph in the table that owns the coverage. Ranges are expanded lazily.
    pub fn glyphs(&self) -> impl Iterator<Item = u16> + '_ {
        let (glyph_array, coverage_range_array): (&[u16], &[CoverageRangeRecord]) = match self {
            Coverage::Format1 { glyph_array } => (glyph_array.as_slice(), &[]),
            Coverage::Format2 {
                coverage_range_array,
            } => (&[], coverage_range_array.as_slice()),
        };
        glyph_array.iter().copied().chain(
            coverage_range_array
                .iter()
                .flat_map(|range| range.start_glyph..=range.end_glyph),
        )
    }
}

pub enum ClassDef {
    Format1 {
        start_glyph: u16,
        class_value_array: Vec<u16>,
    },
    Format2 {
        class_range_array: Vec<ClassRangeRecord>,
    },
}

pub struct ClassRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    class_value: u16,
}

impl ReadFrom for ClassRangeRecord {
    type ReadType = (U16Be, U16Be, U16Be);
    fn read_from((start_glyph, end_glyph, class_value): (u16, u16, u16)) -> Self {
        ClassRangeRecord {
            start_glyph,
            end_glyph,
            class_value,
        }
    }
}

impl ReadBinary for ClassDef {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_u16be()? {
            1 => {
                let start_glyph = ctxt.read_u16be()?;
                let glyph_count = ctxt.read_u16be()?;
                let class_value_array =
                    ctxt.read_array::<U16Be>(usize::from(glyph_count))?.to_vec();
                Ok(ClassDef::Format1 {
                    start_glyph,
                    class_value_array,
                })
            }
            2 => {
                let class_range_count = usize::from(ctxt.read_u16be()?);
                let class_range_array = ctxt
                    .read_array::<ClassRangeRecord>(class_range_count)
                    // Some fonts specify a class_range_count that exceeds the number of records
                    // actually present. Fall back to capping the length to the available bytes.
                    .or_else(|_| ctxt.read_array_upto_hack::<ClassRangeRecord>(class_range_count))?
                    .to_vec();
                Ok(ClassDef::Format2 { class_range_array })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl ClassDef {
    /// The class of `glyph`. Glyphs not assigned a class are in class 0.
    pub fn glyph_class_value(&self, glyph: u16) -> u16 {
        match *self {
            ClassDef::Format1 {
                start_glyph,
                ref class_value_array,
            } => glyph
                .checked_sub(start_glyph)
                .and_then(|class_index| class_value_array.get(usize::from(class_index)))
                .copied()
                .unwrap_or(0),
            ClassDef::Format2 {
                ref class_range_array,
            } => class_range_array
                .iter()
                .find(|range| glyph >= range.start_glyph && glyph <= range.end_glyph)
                .map_or(0, |range| range.class_value),
        }
    }
}

bitflags! {
    /// Fields present in a value record.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ValueFormat: u16 {
        const X_PLACEMENT = 0x0001;
        const Y_PLACEMENT = 0x0002;
        const X_ADVANCE = 0x0004;
        const Y_ADVANCE = 0x0008;
        const X_PLACEMENT_DEVICE = 0x0010;
        const Y_PLACEMENT_DEVICE = 0x0020;
        const X_ADVANCE_DEVICE = 0x0040;
        const Y_ADVANCE_DEVICE = 0x0080;
    }
}

impl ReadBinary for ValueFormat {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let value_format = ctxt.read_u16be()?;
        ValueFormat::from_bits(value_format).ok_or(ParseError::BadValue)
    }
}

impl ValueFormat {
    /// Size in bytes of a value record with this format.
    pub fn size(self) -> usize {
        self.bits().count_ones() as usize * size::U16
    }
}

/// Reference to a Device or VariationIndex table.
///
/// The offset is relative to the start of the subtable containing the value record. The
/// referenced table is not read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Device {
    pub offset: u16,
}

pub type ValueRecord = Option<Adjust>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Adjust {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
    pub x_placement_device: Option<Device>,
    pub y_placement_device: Option<Device>,
    pub x_advance_device: Option<Device>,
    pub y_advance_device: Option<Device>,
}

fn read_delta(
    ctxt: &mut ReadCtxt<'_>,
    value_format: ValueFormat,
    field: ValueFormat,
) -> Result<i16, ParseError> {
    if value_format.contains(field) {
        Ok(ctxt.read_i16be()?)
    } else {
        Ok(0)
    }
}

fn read_device(
    ctxt: &mut ReadCtxt<'_>,
    value_format: ValueFormat,
    field: ValueFormat,
) -> Result<Option<Device>, ParseError> {
    if value_format.contains(field) {
        // A zero offset is a null reference.
        match ctxt.read_u16be()? {
            0 => Ok(None),
            offset => Ok(Some(Device { offset })),
        }
    } else {
        Ok(None)
    }
}

impl ReadBinaryDep for ValueRecord {
    type Args<'a> = ValueFormat;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, value_format: ValueFormat) -> Result<Self, ParseError> {
        if value_format.is_empty() {
            return Ok(None);
        }
        // Fields appear in bit order.
        let x_placement = read_delta(ctxt, value_format, ValueFormat::X_PLACEMENT)?;
        let y_placement = read_delta(ctxt, value_format, ValueFormat::Y_PLACEMENT)?;
        let x_advance = read_delta(ctxt, value_format, ValueFormat::X_ADVANCE)?;
        let y_advance = read_delta(ctxt, value_format, ValueFormat::Y_ADVANCE)?;
        let x_placement_device = read_device(ctxt, value_format, ValueFormat::X_PLACEMENT_DEVICE)?;
        let y_placement_device = read_device(ctxt, value_format, ValueFormat::Y_PLACEMENT_DEVICE)?;
        let x_advance_device = read_device(ctxt, value_format, ValueFormat::X_ADVANCE_DEVICE)?;
        let y_advance_device = read_device(ctxt, value_format, ValueFormat::Y_ADVANCE_DEVICE)?;
        Ok(Some(Adjust {
            x_placement,
            y_placement,
            x_advance,
            y_advance,
            x_placement_device,
            y_placement_device,
            x_advance_device,
            y_advance_device,
        }))
    }
}

impl ReadFixedSizeDep for ValueRecord {
    fn size(value_format: ValueFormat) -> usize {
        value_format.size()
    }
}

/// The adjustments for the first and second glyph of a matched pair.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PairValue {
    pub first: ValueRecord,
    pub second: ValueRecord,
}

impl ReadBinaryDep for PairValue {
    type Args<'a> = (ValueFormat, ValueFormat);
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, args: Self::Args<'a>) -> Result<Self, ParseError> {
        let (value_format1, value_format2) = args;
        let first = ctxt.read_dep::<ValueRecord>(value_format1)?;
        let second = ctxt.read_dep::<ValueRecord>(value_format2)?;
        Ok(PairValue { first, second })
    }
}

impl ReadFixedSizeDep for PairValue {
    fn size((value_format1, value_format2): Self::Args<'_>) -> usize {
        value_format1.size() + value_format2.size()
    }
}
