//! Clock source with deadline-based resynchronization
//!
//! A synchronization round asks the time server up to `max_attempts`
//! times. A failed round never blocks the caller: it records a retry
//! deadline and the next `refresh` call past that deadline tries again.
//! Between rounds the reading is extrapolated from the last sync point
//! using the monotonic millisecond counter.

use crate::config::TimeConfig;
use crate::traits::{ClockError, TimeSync};

use super::reading::TimeReading;

/// Server time paired with the local counter value it was received at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncPoint {
    unix_s: u64,
    at_ms: u64,
}

/// Network-synchronized wall clock
pub struct ClockSource<S> {
    sync: S,
    utc_offset_s: i32,
    update_interval_ms: u64,
    retry_interval_ms: u64,
    max_attempts: u8,
    base: Option<SyncPoint>,
    /// Next synchronization round is due at this counter value
    next_sync_ms: u64,
    failed_rounds: u32,
}

impl<S: TimeSync> ClockSource<S> {
    /// Create a clock source; the first `refresh` synchronizes immediately
    pub fn new(sync: S, config: &TimeConfig) -> Self {
        Self {
            sync,
            utc_offset_s: config.utc_offset_s,
            update_interval_ms: config.update_interval_s as u64 * 1000,
            retry_interval_ms: config.retry_interval_ms as u64,
            max_attempts: config.max_attempts.max(1),
            base: None,
            next_sync_ms: 0,
            failed_rounds: 0,
        }
    }

    /// Check if at least one synchronization succeeded
    pub fn is_synced(&self) -> bool {
        self.base.is_some()
    }

    /// Consecutive failed synchronization rounds
    pub fn failed_rounds(&self) -> u32 {
        self.failed_rounds
    }

    /// Counter value at which the next round is due
    pub fn next_sync_ms(&self) -> u64 {
        self.next_sync_ms
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }

    /// Produce the current local reading
    ///
    /// Runs a synchronization round when one is due. Once synced, a failed
    /// round still yields the extrapolated reading; before the first sync
    /// it yields `Unreachable`, and `NotSynced` while the retry is pending.
    pub async fn refresh(&mut self, now_ms: u64) -> Result<TimeReading, ClockError> {
        if now_ms >= self.next_sync_ms {
            match self.sync_round().await {
                Ok(unix_s) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Clock synced: {} (unix)", unix_s);

                    self.base = Some(SyncPoint { unix_s, at_ms: now_ms });
                    self.next_sync_ms = now_ms + self.update_interval_ms;
                    self.failed_rounds = 0;
                }
                Err(e) => {
                    self.next_sync_ms = now_ms + self.retry_interval_ms;
                    self.failed_rounds = self.failed_rounds.saturating_add(1);

                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "Clock sync failed ({} rounds), retry in {} ms",
                        self.failed_rounds,
                        self.retry_interval_ms
                    );

                    if self.base.is_none() {
                        return Err(e);
                    }
                }
            }
        }

        self.reading_at(now_ms)
    }

    async fn sync_round(&mut self) -> Result<u64, ClockError> {
        let mut last_error = ClockError::Unreachable;
        for _ in 0..self.max_attempts {
            match self.sync.exchange().await {
                Ok(unix_s) => return Ok(unix_s),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }

    fn reading_at(&self, now_ms: u64) -> Result<TimeReading, ClockError> {
        let base = self.base.ok_or(ClockError::NotSynced)?;
        let elapsed_s = now_ms.saturating_sub(base.at_ms) / 1000;
        let utc_s = base.unix_s + elapsed_s;
        let local_s = (utc_s as i64 + self.utc_offset_s as i64).max(0) as u64;
        Ok(TimeReading::from_epoch(local_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use heapless::Deque;

    /// Replays scripted exchange results, then fails
    struct ScriptedSync {
        replies: Deque<Result<u64, ClockError>, 16>,
        calls: u32,
    }

    impl ScriptedSync {
        fn new(replies: &[Result<u64, ClockError>]) -> Self {
            let mut deque = Deque::new();
            for &r in replies {
                deque.push_back(r).unwrap();
            }
            Self {
                replies: deque,
                calls: 0,
            }
        }
    }

    impl TimeSync for ScriptedSync {
        async fn exchange(&mut self) -> Result<u64, ClockError> {
            self.calls += 1;
            self.replies
                .pop_front()
                .unwrap_or(Err(ClockError::Unreachable))
        }
    }

    fn utc_config() -> TimeConfig {
        TimeConfig {
            utc_offset_s: 0,
            ..TimeConfig::default()
        }
    }

    // 2023-11-14T22:13:20Z
    const T0: u64 = 1_700_000_000;

    #[test]
    fn test_first_refresh_syncs() {
        let mut clock = ClockSource::new(ScriptedSync::new(&[Ok(T0)]), &utc_config());
        let reading = block_on(clock.refresh(0)).unwrap();

        assert!(clock.is_synced());
        assert_eq!(reading.timestamp.as_str(), "2023-11-14T22:13:20Z");
        assert_eq!(clock.next_sync_ms(), 60_000);
    }

    #[test]
    fn test_extrapolates_between_syncs() {
        let mut clock = ClockSource::new(ScriptedSync::new(&[Ok(T0)]), &utc_config());
        block_on(clock.refresh(1_000)).unwrap();

        let reading = block_on(clock.refresh(6_500)).unwrap();
        assert_eq!(reading.epoch_s, T0 + 5);
        assert_eq!(clock.sync().calls, 1);
    }

    #[test]
    fn test_applies_utc_offset() {
        let config = TimeConfig::default(); // -6 h
        let mut clock = ClockSource::new(ScriptedSync::new(&[Ok(T0)]), &config);
        let reading = block_on(clock.refresh(0)).unwrap();
        assert_eq!(reading.timestamp.as_str(), "2023-11-14T16:13:20Z");
        assert_eq!(reading.hour, 16);
    }

    #[test]
    fn test_round_retries_up_to_bound() {
        let replies = [
            Err(ClockError::Unreachable),
            Err(ClockError::Unreachable),
            Ok(T0),
        ];
        let mut clock = ClockSource::new(ScriptedSync::new(&replies), &utc_config());
        assert!(block_on(clock.refresh(0)).is_ok());
        assert_eq!(clock.sync().calls, 3);
    }

    #[test]
    fn test_unreachable_then_deferred() {
        let mut clock = ClockSource::new(ScriptedSync::new(&[]), &utc_config());

        assert_eq!(block_on(clock.refresh(0)), Err(ClockError::Unreachable));
        assert_eq!(clock.sync().calls, 3);
        assert_eq!(clock.next_sync_ms(), 1_000);

        // Deferred: no exchange until the retry deadline
        assert_eq!(block_on(clock.refresh(500)), Err(ClockError::NotSynced));
        assert_eq!(clock.sync().calls, 3);

        assert_eq!(block_on(clock.refresh(1_000)), Err(ClockError::Unreachable));
        assert_eq!(clock.sync().calls, 6);
        assert_eq!(clock.failed_rounds(), 2);
    }

    #[test]
    fn test_failed_resync_keeps_extrapolating() {
        let mut clock = ClockSource::new(ScriptedSync::new(&[Ok(T0)]), &utc_config());
        block_on(clock.refresh(0)).unwrap();

        let reading = block_on(clock.refresh(60_000)).unwrap();
        assert_eq!(reading.epoch_s, T0 + 60);
        assert_eq!(clock.failed_rounds(), 1);
        assert_eq!(clock.next_sync_ms(), 61_000);
    }

    #[test]
    fn test_resync_replaces_base() {
        let mut clock = ClockSource::new(ScriptedSync::new(&[Ok(T0), Ok(T0 + 100)]), &utc_config());
        block_on(clock.refresh(0)).unwrap();

        let reading = block_on(clock.refresh(60_000)).unwrap();
        assert_eq!(reading.epoch_s, T0 + 100);
        assert_eq!(clock.next_sync_ms(), 120_000);
    }
}
