//! Wall-clock time
//!
//! `ClockSource` turns occasional network time exchanges into a reading
//! that advances with the local millisecond counter.

pub mod calendar;
pub mod reading;
pub mod source;

pub use reading::{split_timestamp, ParseError, TimeReading, TIMESTAMP_LEN};
pub use source::ClockSource;
