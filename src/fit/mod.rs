//! Curve fitting.
//!
//! Responsibilities:
//!
//! - validate extracted series before any numerics run
//! - fit the three-coefficient extrapolation model by damped Gauss-Newton
//! - report parameter uncertainty when the data supports it

pub mod fitter;

pub use fitter::*;
