//! Quasi-Newton solver for the classifier objective
//!
//! The solver only sees the `Objective` trait, so any differentiable
//! objective can be minimized with it.

pub mod lbfgs;

pub use self::lbfgs::*;
