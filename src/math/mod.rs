//! Mathematical utilities: the shared least-squares solver.

pub mod lsq;

pub use lsq::*;
