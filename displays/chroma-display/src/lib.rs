//! Clock face rendering for the Chroma color clock
//!
//! This crate provides:
//! - `DisplayBackend` trait: an `embedded-graphics` draw target that can
//!   push its frame buffer to the panel
//! - `ClockFace`: draws a `StatusSnapshot` (color name, date, large HH:MM)
//!   and implements the core `StatusView` trait
//! - `FaceLayout`: every coordinate the face uses, defaulting to a
//!   102x64 panel
//! - Seven-segment glyphs for the large time readout
//!
//! The face never talks to hardware directly; the firmware supplies a
//! backend for its panel.

#![no_std]

pub mod backend;
pub mod digits;
pub mod face;
pub mod layout;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use face::ClockFace;
pub use layout::{DigitStyle, FaceLayout};
