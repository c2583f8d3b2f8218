//! Run-scoped data collection.

pub mod series;

pub use series::*;
