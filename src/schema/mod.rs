//! Schema module - Configuration, score and result types for evolutionary runs.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
