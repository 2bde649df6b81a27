//! Label and simplex encodings of class membership

pub mod labels;
pub mod simplex;

pub use self::labels::*;
pub use self::simplex::*;
