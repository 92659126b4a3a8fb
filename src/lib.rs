#![warn(rust_2018_idioms)]

//! OpenType pair adjustment positioning.
//!
//! Reads `GPOS` pair adjustment lookups (kerning and other pair-wise placement) and applies
//! them to runs of glyphs. See [gpos::PairPosLookup] for the entry point.

/// Reading of binary data.
pub mod binary;
pub mod context;
pub mod error;
pub mod gdef;
pub mod gpos;
pub mod layout;
pub mod pairpos;
pub mod size;
/// Shared test code.
#[cfg(test)]
pub mod tests;
