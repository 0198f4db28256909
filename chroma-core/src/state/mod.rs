//! Shared device state
//!
//! `StatusSnapshot` is the single record the display and the status page
//! read from. Only the refresh loop mutates it.

pub mod connection;
pub mod snapshot;

pub use connection::ConnectionState;
pub use snapshot::{
    StatusSnapshot, COLOR_CODE_LEN, COLOR_NAME_LEN, DATE_LEN, TIME_LEN,
};
