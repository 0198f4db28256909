//! Display hardware
//!
//! Panel driver for the EA DOGS102. The clock face itself lives in
//! `chroma-display`.

pub mod uc1701;

pub use uc1701::Uc1701;
