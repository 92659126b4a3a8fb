mod common;

use pairpos::binary::read::ReadScope;
use pairpos::context::{GlyphSequence, LookupFlag};
use pairpos::gdef::GDEFTable;
use pairpos::gpos::{Info, PairPosLookup, Placement};
use pairpos::layout::Adjust;
use pairpos::pairpos::PairPos;

use common::fixtures;
use common::writer::{self, TtfType::*};

fn read_lookup(data: &[u8]) -> PairPosLookup {
    ReadScope::new(data).read::<PairPosLookup>().unwrap()
}

fn read_gdef() -> GDEFTable {
    let data = fixtures::gdef();
    ReadScope::new(&data).read::<GDEFTable>().unwrap()
}

// Coverage [5, 9]. 5 followed by 7 moves 5 by 100 units, 9 has no pairs.
fn kerning_subtable() -> Vec<u8> {
    writer::convert(&[
        UInt16(1),
        UInt16(24),     // coverage offset
        UInt16(0x0004), // x advance
        UInt16(0x0004), // x advance
        UInt16(2),
        UInt16(14),
        UInt16(22),
        // pair set for 5
        UInt16(1),
        UInt16(7),
        Int16(100),
        Int16(0),
        // pair set for 9
        UInt16(0),
        // coverage
        UInt16(1),
        UInt16(2),
        UInt16(5),
        UInt16(9),
    ])
}

// Coverage {5}. 5 is in class 1 and 7 in class 0, with 20 units of y placement at [1][0].
fn class_subtable() -> Vec<u8> {
    writer::convert(&[
        UInt16(2),
        UInt16(32),     // coverage offset
        UInt16(0x0002), // y placement
        UInt16(0x0002), // y placement
        UInt16(38),     // classdef1 offset
        UInt16(46),     // classdef2 offset
        UInt16(2),
        UInt16(2),
        Int16(0),
        Int16(0),
        Int16(0),
        Int16(0),
        Int16(20),
        Int16(0),
        Int16(0),
        Int16(0),
        // coverage
        UInt16(1),
        UInt16(1),
        UInt16(5),
        // classdef1
        UInt16(1),
        UInt16(5),
        UInt16(1),
        UInt16(1),
        // classdef2
        UInt16(1),
        UInt16(7),
        UInt16(1),
        UInt16(0),
    ])
}

#[test]
fn test_kerning_pair() {
    let lookup = read_lookup(&fixtures::lookup(0, &[kerning_subtable()]));

    let mut infos = Info::init_from_glyphs(&[5, 7]);
    let mut seq = GlyphSequence::new(&mut infos);
    assert!(lookup.try_match(None, &mut seq));
    assert_eq!(seq.index(), 1);
    assert_eq!(infos[0].kerning, 100);
    assert_eq!(infos[1].kerning, 0);

    let mut infos = Info::init_from_glyphs(&[5, 8]);
    let mut seq = GlyphSequence::new(&mut infos);
    assert!(!lookup.try_match(None, &mut seq));
    assert_eq!(seq.index(), 1);
    assert_eq!(infos, Info::init_from_glyphs(&[5, 8]));
}

#[test]
fn test_class_pair() {
    let lookup = read_lookup(&fixtures::lookup(0, &[class_subtable()]));

    let mut infos = Info::init_from_glyphs(&[5, 7]);
    let mut seq = GlyphSequence::new(&mut infos);
    assert!(lookup.try_match(None, &mut seq));
    assert_eq!(seq.index(), 1);
    assert_eq!(infos[0].placement, Placement::Distance(0, 20));
    assert_eq!(infos[1].placement, Placement::None);

    let mut infos = Info::init_from_glyphs(&[6, 7]);
    let mut seq = GlyphSequence::new(&mut infos);
    assert!(!lookup.try_match(None, &mut seq));
    assert_eq!(infos, Info::init_from_glyphs(&[6, 7]));
}

#[test]
fn test_pair_across_ignored_mark() {
    let gdef = read_gdef();
    let lookup = read_lookup(&fixtures::lookup(
        LookupFlag::IGNORE_MARKS,
        &[kerning_subtable()],
    ));
    let mut infos = Info::init_from_glyphs(&[5, fixtures::MARK_GLYPH, 7]);
    let mut seq = GlyphSequence::new(&mut infos);
    assert!(lookup.try_match(Some(&gdef), &mut seq));
    assert_eq!(seq.index(), 2);
    assert_eq!(infos[0].kerning, 100);
    assert_eq!(infos[1], Info::new(fixtures::MARK_GLYPH));
}

#[test]
fn test_skipped_marks_do_not_change_adjustment() {
    let gdef = read_gdef();
    let lookup = read_lookup(&fixtures::lookup(
        LookupFlag::IGNORE_MARKS,
        &[kerning_subtable(), class_subtable()],
    ));
    let mark = fixtures::MARK_GLYPH;
    let mut expected = Info::init_from_glyphs(&[5, 7]);
    lookup.apply(Some(&gdef), &mut expected);

    for mark_count in 0..4 {
        let mut glyphs = vec![5];
        glyphs.extend(std::iter::repeat(mark).take(mark_count));
        glyphs.push(7);
        let mut infos = Info::init_from_glyphs(&glyphs);
        lookup.apply(Some(&gdef), &mut infos);
        assert_eq!(infos[0], expected[0]);
        assert_eq!(infos[mark_count + 1], expected[1]);
    }
}

#[test]
fn test_apply_run() {
    let lookup = read_lookup(&fixtures::lookup(
        0,
        &[kerning_subtable(), class_subtable()],
    ));
    let mut infos = Info::init_from_glyphs(&[5, 7, 5, 5, 7, 9]);
    lookup.apply(None, &mut infos);
    let kerning = infos.iter().map(|info| info.kerning).collect::<Vec<_>>();
    assert_eq!(kerning, vec![100, 0, 0, 100, 0, 0]);
    // 5 followed by 5 only matches in the class subtable, where the second 5 is in class 0
    assert_eq!(infos[2].placement, Placement::Distance(0, 20));
}

#[test]
fn test_extension_lookup() {
    let data = fixtures::extension_lookup(2, &[class_subtable(), kerning_subtable()]);
    let lookup = read_lookup(&data);
    assert!(matches!(
        lookup.subtables(),
        [PairPos::Format2(_), PairPos::Format1(_)]
    ));
    let mut infos = Info::init_from_glyphs(&[5, 7]);
    lookup.apply(None, &mut infos);
    assert_eq!(infos[0].placement, Placement::Distance(0, 20));
    assert_eq!(infos[0].kerning, 0);
}

#[test]
fn test_unsupported_subtable_is_skipped() {
    let data = fixtures::lookup(0, &[fixtures::pairpos_format3()]);
    let lookup = read_lookup(&data);
    assert_eq!(lookup.unsupported_subtables(), 1);
    let mut infos = Info::init_from_glyphs(&[5, 7]);
    lookup.apply(None, &mut infos);
    assert_eq!(infos, Info::init_from_glyphs(&[5, 7]));
}

#[test]
fn test_from_subtables() {
    let (data, offsets) = fixtures::concat(&[
        fixtures::pairpos_format3(),
        class_subtable(),
        kerning_subtable(),
    ]);
    let lookup =
        PairPosLookup::from_subtables(ReadScope::new(&data), LookupFlag(0), None, offsets)
            .unwrap();
    assert_eq!(lookup.subtables().len(), 2);
    assert_eq!(lookup.unsupported_subtables(), 1);
    assert_eq!(
        lookup.lookup_pair(5, 7).and_then(|pair_value| pair_value.first),
        Some(Adjust {
            y_placement: 20,
            ..Adjust::default()
        })
    );
}

#[test]
fn test_shared_between_threads() {
    let lookup = read_lookup(&fixtures::lookup(0, &[kerning_subtable()]));
    let lookup = &lookup;
    let runs = std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let mut infos = Info::init_from_glyphs(&[5, 7, 9, 5, 7]);
                    lookup.apply(None, &mut infos);
                    infos
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });
    for infos in runs {
        assert_eq!(infos[0].kerning, 100);
        assert_eq!(infos[3].kerning, 100);
    }
}
