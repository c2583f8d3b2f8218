//! Model evaluation for the inverse-power extrapolation family.

pub mod model;

pub use model::*;
