//! Input/output: log extraction and result exports.

pub mod export;
pub mod extract;
pub mod fitfile;
