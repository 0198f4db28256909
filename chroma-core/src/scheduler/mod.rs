//! Cooperative refresh loop
//!
//! One pass polls every source in a fixed order. Nothing in a pass waits
//! on another source; slow work is deferred by deadlines instead.

pub mod refresh;
pub mod throttle;

pub use refresh::{RefreshLoop, TickReport};
pub use throttle::RenderThrottle;
