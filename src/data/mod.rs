//! Dataset implementations
//!
//! File-format readers are out of scope; datasets are assembled in memory
//! or deserialised through serde.

pub mod column;

pub use self::column::*;
