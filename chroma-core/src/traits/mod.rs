//! Collaborator traits
//!
//! These traits define the interface between the refresh loop and the
//! network stack, display and timer of a particular board. All I/O
//! methods are async; implementations must bound every wait with a
//! timeout so a single loop iteration always finishes.

pub mod clock;
pub mod feed;
pub mod http;
pub mod view;

pub use clock::{ClockError, Monotonic, TimeSync};
pub use feed::{FeedTransport, TransportError};
pub use http::{HttpEndpoint, ServeError};
pub use view::{Housekeeping, StatusView};
