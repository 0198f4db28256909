//! Time synchronization traits

/// Errors reported by the clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Time server did not answer within the retry bound
    Unreachable,
    /// No successful sync yet and the next attempt is still deferred
    NotSynced,
}

/// One request/response exchange with a network time server
#[allow(async_fn_in_trait)]
pub trait TimeSync {
    /// Ask the server for the current time
    ///
    /// Returns Unix seconds (UTC). Any transport or protocol failure is
    /// reported as `ClockError::Unreachable`.
    async fn exchange(&mut self) -> Result<u64, ClockError>;
}

/// Monotonic millisecond counter since boot
pub trait Monotonic {
    fn now_ms(&self) -> u64;
}
