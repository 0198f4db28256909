//! Status web surface
//!
//! Serves the current color as a small HTML page. Handlers only read the
//! snapshot; they never touch the network themselves.

pub mod page;
pub mod server;

pub use page::{bad_request, not_found, status_page};
pub use server::{respond, StatusHttpServer};
