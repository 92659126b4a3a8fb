pub mod writer {
    //! Testing utilities.
    //!
    #![allow(dead_code)]

    // The writer module is derived from ttf-parser, licenced under Apache-2.0.
    // https://github.com/RazrFalcon/ttf-parser/blob/439aaaebd50eb8aed66302e3c1b51fae047f85b2/src/writer.rs

    #[allow(missing_debug_implementations)]
    #[derive(Clone, Copy)]
    pub enum TtfType {
        Raw(&'static [u8]),
        Int16(i16),
        UInt16(u16),
        UInt32(u32),
    }

    pub fn convert(values: &[TtfType]) -> Vec<u8> {
        let mut data = Vec::with_capacity(256);
        for v in values {
            convert_type(*v, &mut data);
        }

        data
    }

    pub fn convert_type(value: TtfType, data: &mut Vec<u8>) {
        match value {
            TtfType::Raw(bytes) => {
                data.extend_from_slice(bytes);
            }
            TtfType::Int16(n) => {
                data.extend_from_slice(&i16::to_be_bytes(n));
            }
            TtfType::UInt16(n) => {
                data.extend_from_slice(&u16::to_be_bytes(n));
            }
            TtfType::UInt32(n) => {
                data.extend_from_slice(&u32::to_be_bytes(n));
            }
        }
    }
}

pub mod fixtures {
    //! Hand assembled pair positioning data.
    #![allow(dead_code)]

    use super::writer::{self, TtfType::*};

    /// Glyph that `gdef` classifies as a mark.
    pub const MARK_GLYPH: u16 = 50;

    /// PairPos format 1.
    ///
    /// Coverage [5, 9]. Glyph 5 pairs with 7 (x advance 100 / 0) and with 8 (x placement -20
    /// on the second glyph). Glyph 9 has an empty pair set.
    pub fn pairpos_format1() -> Vec<u8> {
        writer::convert(&[
            UInt16(1),      // format
            UInt16(38),     // coverage offset
            UInt16(0x0005), // value format 1: x placement, x advance
            UInt16(0x0005), // value format 2: x placement, x advance
            UInt16(2),      // pair set count
            UInt16(14),     // pair set offset for glyph 5
            UInt16(36),     // pair set offset for glyph 9
            // pair set for glyph 5 at 14
            UInt16(2),
            UInt16(7),
            Int16(0),
            Int16(100),
            Int16(0),
            Int16(0),
            UInt16(8),
            Int16(0),
            Int16(0),
            Int16(-20),
            Int16(0),
            // pair set for glyph 9 at 36
            UInt16(0),
            // coverage at 38
            UInt16(1),
            UInt16(2),
            UInt16(5),
            UInt16(9),
        ])
    }

    /// PairPos format 2.
    ///
    /// Coverage {5, 10}. ClassDef1: 5 and 6 are class 1, 10 is class 3 (outside the matrix).
    /// ClassDef2: 7 is class 0, 8 class 1, 9 class 5 (outside the matrix). The 2x2 matrix
    /// holds y placement 20 at [1][0] and -15 at [1][1].
    pub fn pairpos_format2() -> Vec<u8> {
        writer::convert(&[
            UInt16(2),      // format
            UInt16(32),     // coverage offset
            UInt16(0x0002), // value format 1: y placement
            UInt16(0x0002), // value format 2: y placement
            UInt16(40),     // classdef1 offset
            UInt16(56),     // classdef2 offset
            UInt16(2),      // class1 count
            UInt16(2),      // class2 count
            // class1 0
            Int16(0),
            Int16(0),
            Int16(0),
            Int16(0),
            // class1 1
            Int16(20),
            Int16(0),
            Int16(-15),
            Int16(0),
            // coverage at 32
            UInt16(1),
            UInt16(2),
            UInt16(5),
            UInt16(10),
            // classdef1 at 40
            UInt16(2),
            UInt16(2),
            UInt16(5),
            UInt16(6),
            UInt16(1),
            UInt16(10),
            UInt16(10),
            UInt16(3),
            // classdef2 at 56
            UInt16(2),
            UInt16(3),
            UInt16(7),
            UInt16(7),
            UInt16(0),
            UInt16(8),
            UInt16(8),
            UInt16(1),
            UInt16(9),
            UInt16(9),
            UInt16(5),
        ])
    }

    /// Subtable with an unsupported format.
    pub fn pairpos_format3() -> Vec<u8> {
        writer::convert(&[UInt16(3), UInt16(0), UInt16(0), UInt16(0)])
    }

    /// Concatenate subtables, returning the data and the offset of each subtable.
    pub fn concat(subtables: &[Vec<u8>]) -> (Vec<u8>, Vec<usize>) {
        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for subtable in subtables {
            offsets.push(data.len());
            data.extend_from_slice(subtable);
        }
        (data, offsets)
    }

    /// A Lookup table of type 2 holding `subtables` in order.
    ///
    /// When `lookup_flag` has USE_MARK_FILTERING_SET set the header refers to mark glyph set 0.
    pub fn lookup(lookup_flag: u16, subtables: &[Vec<u8>]) -> Vec<u8> {
        let use_mark_filtering_set = lookup_flag & 0x0010 != 0;
        let mut header_size = 6 + 2 * subtables.len();
        if use_mark_filtering_set {
            header_size += 2;
        }
        let (body, offsets) = concat(subtables);
        let mut data = writer::convert(&[
            UInt16(2),
            UInt16(lookup_flag),
            UInt16(subtables.len() as u16),
        ]);
        for offset in offsets {
            data.extend(writer::convert(&[UInt16((header_size + offset) as u16)]));
        }
        if use_mark_filtering_set {
            data.extend(writer::convert(&[UInt16(0)]));
        }
        data.extend(body);
        data
    }

    /// A Lookup table of type 9 wrapping each of `subtables` in an ExtensionPos subtable.
    pub fn extension_lookup(extension_lookup_type: u16, subtables: &[Vec<u8>]) -> Vec<u8> {
        let header_size = 6 + 2 * subtables.len();
        let extension_size = 8;
        let mut data = writer::convert(&[UInt16(9), UInt16(0), UInt16(subtables.len() as u16)]);
        for i in 0..subtables.len() {
            let offset = header_size + i * extension_size;
            data.extend(writer::convert(&[UInt16(offset as u16)]));
        }
        let (body, offsets) = concat(subtables);
        for (i, offset) in offsets.iter().enumerate() {
            // Offset from the extension subtable to the wrapped subtable
            let extension_offset = (subtables.len() - i) * extension_size + offset;
            data.extend(writer::convert(&[
                UInt16(1),
                UInt16(extension_lookup_type),
                UInt32(extension_offset as u32),
            ]));
        }
        data.extend(body);
        data
    }

    /// GDEF table classifying `MARK_GLYPH` as a mark and glyph 3 as a ligature.
    pub fn gdef() -> Vec<u8> {
        writer::convert(&[
            UInt16(1),
            UInt16(0),
            UInt16(12), // glyph classdef offset
            UInt16(0),
            UInt16(0),
            UInt16(0),
            // glyph classdef at 12
            UInt16(2),
            UInt16(2),
            UInt16(3),
            UInt16(3),
            UInt16(2),
            UInt16(MARK_GLYPH),
            UInt16(MARK_GLYPH),
            UInt16(3),
        ])
    }
}
