//! Board-agnostic core logic for the Chroma color clock
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or network stacks:
//!
//! - Collaborator traits (time sync, feed transport, HTTP endpoint, view)
//! - Clock source with deadline-based resynchronization
//! - Color feed listener and its reconnect policy
//! - The status snapshot shared by the display and the web page
//! - Status page handler
//! - The cooperative refresh loop tying it all together
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod config;
pub mod feed;
pub mod scheduler;
pub mod state;
pub mod traits;
pub mod web;
