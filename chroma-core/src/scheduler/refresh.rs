//! Refresh loop
//!
//! Order of one pass:
//! 1. answer at most one HTTP request
//! 2. housekeeping (link monitor, advertisement)
//! 3. refresh the clock and copy the reading into the snapshot
//! 4. render if the throttle allows and the timestamp parsed
//! 5. reconnect the feed if it is down
//! 6. apply pending color messages

use crate::clock::{ClockSource, TimeReading};
use crate::feed::ColorFeedListener;
use crate::state::{ConnectionState, StatusSnapshot};
use crate::traits::{
    ClockError, FeedTransport, Housekeeping, HttpEndpoint, Monotonic, StatusView, TimeSync,
};
use crate::web::StatusHttpServer;

use super::throttle::RenderThrottle;

/// What happened during one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub served_request: bool,
    /// Clock error this pass, if any
    pub clock_error: Option<ClockError>,
    /// Snapshot time fields were rewritten
    pub time_updated: bool,
    pub rendered: bool,
    pub feed_state: ConnectionState,
    /// Color updates applied
    pub messages: usize,
}

/// Owns every component and the snapshot they share
pub struct RefreshLoop<S, T, E, V, H> {
    clock: ClockSource<S>,
    feed: ColorFeedListener<T>,
    http: StatusHttpServer<E>,
    view: V,
    housekeeping: H,
    snapshot: StatusSnapshot,
    throttle: RenderThrottle,
}

impl<S, T, E, V, H> RefreshLoop<S, T, E, V, H>
where
    S: TimeSync,
    T: FeedTransport,
    E: HttpEndpoint,
    V: StatusView,
    H: Housekeeping,
{
    pub fn new(
        clock: ClockSource<S>,
        feed: ColorFeedListener<T>,
        http: StatusHttpServer<E>,
        view: V,
        housekeeping: H,
        throttle: RenderThrottle,
    ) -> Self {
        Self {
            clock,
            feed,
            http,
            view,
            housekeeping,
            snapshot: StatusSnapshot::new(),
            throttle,
        }
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn clock(&self) -> &ClockSource<S> {
        &self.clock
    }

    pub fn feed(&self) -> &ColorFeedListener<T> {
        &self.feed
    }

    pub fn http(&self) -> &StatusHttpServer<E> {
        &self.http
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run one pass at monotonic time `now_ms`
    pub async fn run_once(&mut self, now_ms: u64) -> TickReport {
        let served_request = self.http.poll(&self.snapshot).await;

        self.housekeeping.service(now_ms).await;

        let reading = self.clock.refresh(now_ms).await;
        let clock_error = reading.as_ref().err().copied();
        let (time_updated, render_allowed) = self.apply_reading(reading);

        let mut rendered = false;
        if render_allowed && self.throttle.ready(now_ms) {
            self.throttle.mark(now_ms);

            #[cfg(feature = "defmt")]
            defmt::info!("DATE: {} TIME: {}", self.snapshot.date(), self.snapshot.time());

            let frame = self.snapshot.read();
            self.view.render(&frame).await;
            rendered = true;
        }

        let feed_state = self.feed.poll(now_ms).await;
        let messages = self.feed.process(&mut self.snapshot).await;

        TickReport {
            served_request,
            clock_error,
            time_updated,
            rendered,
            feed_state,
            messages,
        }
    }

    /// Copy a clock result into the snapshot
    ///
    /// Returns (time fields updated, render allowed). Clock errors leave
    /// the previous time in place and still allow a render; a malformed
    /// timestamp blocks rendering for this pass.
    fn apply_reading(&mut self, reading: Result<TimeReading, ClockError>) -> (bool, bool) {
        match reading {
            Ok(reading) => match self.snapshot.update_time(&reading) {
                Ok(()) => (true, true),
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Bad timestamp {}: {}", reading.timestamp.as_str(), _e);

                    (false, false)
                }
            },
            Err(_) => (false, true),
        }
    }

    /// Run passes forever, timed by `timer`
    pub async fn run_forever<M: Monotonic>(&mut self, timer: &M) -> ! {
        loop {
            self.run_once(timer.now_ms()).await;
        }
    }
}
