//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - extraction rules (`ExtractRule`, `ExtractSpec`, `LogFormat`)
//! - paired sample series (`Series`, `NamedSeries`)
//! - fit outputs (`TdlModel`, `FitResult`, etc.)

pub mod types;

pub use types::*;
