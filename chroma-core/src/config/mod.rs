//! Configuration types and validation

pub mod types;

pub use types::*;
