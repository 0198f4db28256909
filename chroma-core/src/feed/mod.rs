//! Color feed
//!
//! Keeps a session with the color broadcast broker alive and routes its
//! two topics (color name, RGB code) into the status snapshot.

pub mod listener;
pub mod reconnect;
pub mod topics;

pub use listener::{client_id, ClientIds, ColorFeedListener, CLIENT_ID_LEN};
pub use reconnect::ReconnectPolicy;
pub use topics::{ColorTopic, ColorUpdate, FeedTopics};
