//! Device configuration
//!
//! `build.rs` validates `device.toml` and embeds it as a postcard blob;
//! this module decodes it at boot.

mod loader;

pub use loader::load;
