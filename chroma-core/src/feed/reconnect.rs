//! Fixed-backoff reconnect policy
//!
//! The policy never sleeps. It records when the next attempt is allowed
//! and the listener checks that deadline each time the loop comes around.

/// Reconnect bookkeeping for the feed session
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    backoff_ms: u64,
    /// `None` means an attempt may be made right away
    next_attempt_ms: Option<u64>,
    attempts: u32,
    consecutive_failures: u32,
}

impl ReconnectPolicy {
    pub fn new(backoff_ms: u64) -> Self {
        Self {
            backoff_ms,
            next_attempt_ms: None,
            attempts: 0,
            consecutive_failures: 0,
        }
    }

    /// Check whether a connection attempt may be made now
    pub fn attempt_due(&self, now_ms: u64) -> bool {
        self.next_attempt_ms.map_or(true, |next| now_ms >= next)
    }

    /// Record the start of an attempt
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Record a failed attempt and push the next one out by the backoff
    pub fn record_failure(&mut self, now_ms: u64) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.next_attempt_ms = Some(now_ms + self.backoff_ms);
    }

    /// Record a successful connection
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.next_attempt_ms = None;
    }

    pub fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Total attempts since boot
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn next_attempt_ms(&self) -> Option<u64> {
        self.next_attempt_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_immediate() {
        let policy = ReconnectPolicy::new(5_000);
        assert!(policy.attempt_due(0));
    }

    #[test]
    fn test_backoff_after_failure() {
        let mut policy = ReconnectPolicy::new(5_000);
        policy.record_attempt();
        policy.record_failure(1_000);

        assert!(!policy.attempt_due(1_000));
        assert!(!policy.attempt_due(5_999));
        assert!(policy.attempt_due(6_000));
        assert_eq!(policy.consecutive_failures(), 1);
    }

    #[test]
    fn test_success_clears_backoff() {
        let mut policy = ReconnectPolicy::new(5_000);
        policy.record_attempt();
        policy.record_failure(0);
        policy.record_attempt();
        policy.record_success();

        assert!(policy.attempt_due(1));
        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.attempts(), 2);
    }
}
