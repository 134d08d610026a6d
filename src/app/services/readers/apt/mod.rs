//! apt.dat reader: airports, runways, helipads, pavements, boundaries and
//! the various point features that come with them.
//!
//! The reader is organized into:
//! - [`reader`] - record dispatch loop and per-record parsers
//! - [`layers`] - layer schemas and attribute-tuple builders
//! - [`geometry`] - node-record sub-loop for polygons/linestrings, bezier
//!   insertion and polygon topology repair

pub mod geometry;
pub mod layers;
pub mod reader;

#[cfg(test)]
mod tests;

pub use reader::AptReader;
