//! Kernel functions and the Gram matrix engine

pub mod gram;
pub mod polynomial;
pub mod rbf;
pub mod spec;
pub mod traits;

pub use self::gram::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::spec::*;
pub use self::traits::*;
