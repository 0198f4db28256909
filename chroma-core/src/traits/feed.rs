//! Publish/subscribe transport trait

/// Errors that can occur on the messaging link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No session with the broker
    Disconnected,
    /// Broker refused the connection (CONNACK return code)
    Refused(u8),
    /// Broker did not answer in time
    Timeout,
    /// Socket or name resolution failure
    Io,
    /// Unexpected or malformed packet
    Protocol,
}

/// Client side of a publish/subscribe session
///
/// The transport owns the socket and the packet parser; the listener only
/// decides when to connect and what to subscribe to.
#[allow(async_fn_in_trait)]
pub trait FeedTransport {
    /// Check whether a session is currently established
    fn is_connected(&self) -> bool;

    /// Open a clean session with the given client id
    async fn connect(&mut self, client_id: &str) -> Result<(), TransportError>;

    /// Subscribe to a single topic
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Dispatch messages that have already arrived
    ///
    /// Must not wait for new data. Calls `on_message(topic, payload)` once
    /// per message and returns how many were delivered. Keep-alive traffic
    /// is handled here as well.
    async fn poll<F>(&mut self, on_message: F) -> Result<usize, TransportError>
    where
        F: FnMut(&str, &[u8]);
}
