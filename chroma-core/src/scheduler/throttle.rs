//! Render cadence

/// Allows one render per interval
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl RenderThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Check if a render is due; the first check is always due
    pub fn ready(&self, now_ms: u64) -> bool {
        self.last_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    /// Record a render at `now_ms`
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    pub fn last_ms(&self) -> Option<u64> {
        self.last_ms
    }
}
