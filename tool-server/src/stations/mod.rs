//! Taiwan High Speed Rail station directory.
//!
//! A fixed table of the twelve stations on the line. Stations can be
//! looked up by their romanized code (`TaiPei`) or by their Chinese
//! display name (`台北`); both resolve to the same [`Station`].

mod directory;

pub use directory::{Station, UnknownStation};
