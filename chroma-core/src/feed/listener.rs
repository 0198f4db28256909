//! Color feed listener

use core::fmt::Write;

use heapless::String;

use crate::state::{ConnectionState, StatusSnapshot};
use crate::traits::{FeedTransport, TransportError};

use super::reconnect::ReconnectPolicy;
use super::topics::{ColorUpdate, FeedTopics};

/// Maximum client id length (prefix + 4 hex digits)
pub const CLIENT_ID_LEN: usize = 32;

/// Build a client id from a prefix and a random suffix
pub fn client_id(prefix: &str, suffix: u16) -> String<CLIENT_ID_LEN> {
    let mut id = String::new();
    // Prefix is capped well below the id length by the config type
    let _ = write!(id, "{}{:04X}", prefix, suffix);
    id
}

/// Fresh client id per connection attempt
///
/// Suffixes follow a 16-bit xorshift sequence seeded from the hardware
/// RNG; consecutive attempts never share an id.
#[derive(Debug, Clone)]
pub struct ClientIds {
    prefix: String<CLIENT_ID_LEN>,
    state: u16,
}

impl ClientIds {
    pub fn new(prefix: &str, seed: u16) -> Self {
        let mut stored = String::new();
        let _ = stored.push_str(prefix);
        Self {
            prefix: stored,
            // Zero is a fixed point of xorshift
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Id for the next attempt
    pub fn next_id(&mut self) -> String<CLIENT_ID_LEN> {
        let id = client_id(&self.prefix, self.state);
        let mut x = self.state;
        x ^= x << 7;
        x ^= x >> 9;
        x ^= x << 8;
        self.state = x;
        id
    }
}

/// Subscriber for the color name and code topics
pub struct ColorFeedListener<T> {
    transport: T,
    topics: FeedTopics,
    ids: ClientIds,
    /// Id used by the latest attempt
    client_id: String<CLIENT_ID_LEN>,
    policy: ReconnectPolicy,
    state: ConnectionState,
}

impl<T: FeedTransport> ColorFeedListener<T> {
    pub fn new(
        transport: T,
        topics: FeedTopics,
        ids: ClientIds,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            transport,
            topics,
            ids,
            client_id: String::new(),
            policy,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drive the reconnect policy
    ///
    /// Connected sessions are left alone. A disconnected listener makes one
    /// connect-and-subscribe attempt when the backoff deadline has passed.
    pub async fn poll(&mut self, now_ms: u64) -> ConnectionState {
        if self.state == ConnectionState::Connected {
            if self.transport.is_connected() {
                return self.state;
            }

            #[cfg(feature = "defmt")]
            defmt::warn!("MQTT connection lost");

            self.state = ConnectionState::Disconnected;
        }

        if !self.policy.attempt_due(now_ms) {
            return self.state;
        }

        self.client_id = self.ids.next_id();

        #[cfg(feature = "defmt")]
        defmt::info!("Attempting MQTT connection as {}...", self.client_id.as_str());

        self.state = ConnectionState::Connecting;
        self.policy.record_attempt();

        match self.connect_and_subscribe().await {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "connected, subscribed to {} and {}",
                    self.topics.name(),
                    self.topics.code()
                );

                self.policy.record_success();
                self.state = ConnectionState::Connected;
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "failed, rc={} try again in {} seconds",
                    _e,
                    self.policy.backoff_ms() / 1000
                );

                self.policy.record_failure(now_ms);
                self.state = ConnectionState::Disconnected;
            }
        }

        self.state
    }

    async fn connect_and_subscribe(&mut self) -> Result<(), TransportError> {
        self.transport.connect(&self.client_id).await?;
        self.transport.subscribe(self.topics.name()).await?;
        self.transport.subscribe(self.topics.code()).await?;
        Ok(())
    }

    /// Route pending messages into the snapshot
    ///
    /// Returns how many color updates were applied. A transport error
    /// drops the session; the next `poll` reconnects.
    pub async fn process(&mut self, snapshot: &mut StatusSnapshot) -> usize {
        if self.state != ConnectionState::Connected {
            return 0;
        }

        let topics = &self.topics;
        let mut applied = 0;
        let result = self
            .transport
            .poll(|topic, payload| {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "Message arrived [{}] {}",
                    topic,
                    core::str::from_utf8(payload).unwrap_or("<binary>")
                );

                if let Some(kind) = topics.classify(topic) {
                    snapshot.update_color(ColorUpdate {
                        topic: kind,
                        value: payload,
                    });
                    applied += 1;
                }
            })
            .await;

        if let Err(_e) = result {
            #[cfg(feature = "defmt")]
            defmt::warn!("MQTT poll failed: {}", _e);

            self.state = ConnectionState::Disconnected;
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use embassy_futures::block_on;
    use heapless::{Deque, Vec};

    type Message = (&'static str, &'static [u8]);

    /// In-memory broker session
    struct MockTransport {
        connect_results: Deque<Result<(), TransportError>, 16>,
        connected: bool,
        connects: u32,
        last_client_id: String<CLIENT_ID_LEN>,
        subscriptions: Vec<String<64>, 8>,
        inbox: Vec<Message, 8>,
        poll_error: Option<TransportError>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                connect_results: Deque::new(),
                connected: false,
                connects: 0,
                last_client_id: String::new(),
                subscriptions: Vec::new(),
                inbox: Vec::new(),
                poll_error: None,
            }
        }

        fn failing(times: usize) -> Self {
            let mut transport = Self::new();
            for _ in 0..times {
                transport
                    .connect_results
                    .push_back(Err(TransportError::Refused(5)))
                    .unwrap();
            }
            transport
        }
    }

    impl FeedTransport for MockTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self, client_id: &str) -> Result<(), TransportError> {
            self.connects += 1;
            self.last_client_id.clear();
            self.last_client_id.push_str(client_id).unwrap();
            let result = self.connect_results.pop_front().unwrap_or(Ok(()));
            self.connected = result.is_ok();
            result
        }

        async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
            let mut t = String::new();
            t.push_str(topic).unwrap();
            self.subscriptions.push(t).unwrap();
            Ok(())
        }

        async fn poll<F>(&mut self, mut on_message: F) -> Result<usize, TransportError>
        where
            F: FnMut(&str, &[u8]),
        {
            if let Some(e) = self.poll_error.take() {
                self.connected = false;
                return Err(e);
            }
            let count = self.inbox.len();
            for &(topic, payload) in self.inbox.iter() {
                on_message(topic, payload);
            }
            self.inbox.clear();
            Ok(count)
        }
    }

    fn listener(transport: MockTransport) -> ColorFeedListener<MockTransport> {
        ColorFeedListener::new(
            transport,
            FeedTopics::from_config(&FeedConfig::default()),
            ClientIds::new("ESPclient-", 0x1A2B),
            ReconnectPolicy::new(5_000),
        )
    }

    #[test]
    fn test_client_id_format() {
        assert_eq!(client_id("ESPclient-", 0x1A2B).as_str(), "ESPclient-1A2B");
        assert_eq!(client_id("ESPclient-", 0xF).as_str(), "ESPclient-000F");
    }

    #[test]
    fn test_client_ids_start_at_seed_then_change() {
        let mut ids = ClientIds::new("ESPclient-", 0x1A2B);
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first.as_str(), "ESPclient-1A2B");
        assert!(second.starts_with("ESPclient-"));
        assert_eq!(second.len(), first.len());
        assert_ne!(first, second);
    }

    #[test]
    fn test_client_ids_zero_seed() {
        let mut ids = ClientIds::new("c-", 0);
        let mut previous = ids.next_id();
        for _ in 0..100 {
            let id = ids.next_id();
            assert_ne!(id, previous);
            assert_ne!(id.as_str(), "c-0000");
            previous = id;
        }
    }

    #[test]
    fn test_each_attempt_uses_fresh_client_id() {
        let mut feed = listener(MockTransport::failing(1));

        block_on(feed.poll(0));
        let first = feed.transport().last_client_id.clone();
        assert_eq!(first.as_str(), "ESPclient-1A2B");
        assert_eq!(feed.client_id(), first.as_str());

        assert_eq!(block_on(feed.poll(5_000)), ConnectionState::Connected);
        let second = feed.transport().last_client_id.clone();
        assert!(second.starts_with("ESPclient-"));
        assert_ne!(first, second);
        assert_eq!(feed.client_id(), second.as_str());
    }

    #[test]
    fn test_connect_subscribes_both_topics() {
        let mut feed = listener(MockTransport::new());
        assert_eq!(block_on(feed.poll(0)), ConnectionState::Connected);

        let subs = &feed.transport().subscriptions;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].as_str(), "cheerlights");
        assert_eq!(subs[1].as_str(), "cheerlightsRGB");
    }

    #[test]
    fn test_failed_connect_waits_for_backoff() {
        let mut feed = listener(MockTransport::failing(1));

        assert_eq!(block_on(feed.poll(0)), ConnectionState::Disconnected);
        assert_eq!(block_on(feed.poll(4_999)), ConnectionState::Disconnected);
        assert_eq!(feed.transport().connects, 1);

        assert_eq!(block_on(feed.poll(5_000)), ConnectionState::Connected);
        assert_eq!(feed.transport().connects, 2);
    }

    #[test]
    fn test_n_failures_then_success() {
        for failures in 0..6u32 {
            let mut feed = listener(MockTransport::failing(failures as usize));
            let mut attempt_times: Vec<u64, 16> = Vec::new();

            let mut now = 0;
            while feed.state() != ConnectionState::Connected {
                let before = feed.policy().attempts();
                block_on(feed.poll(now));
                if feed.policy().attempts() != before {
                    attempt_times.push(now).unwrap();
                }
                now += 250;
            }

            assert_eq!(attempt_times.len() as u32, failures + 1);
            for pair in attempt_times.windows(2) {
                assert!(pair[1] - pair[0] >= 5_000);
            }
        }
    }

    #[test]
    fn test_process_routes_messages() {
        let mut transport = MockTransport::new();
        transport.inbox.push(("cheerlights", b"purple")).unwrap();
        transport.inbox.push(("cheerlightsRGB", b"#800080")).unwrap();
        transport.inbox.push(("other", b"ignored")).unwrap();

        let mut feed = listener(transport);
        let mut snapshot = StatusSnapshot::new();
        block_on(feed.poll(0));

        assert_eq!(block_on(feed.process(&mut snapshot)), 2);
        assert_eq!(snapshot.color_name(), "purple");
        assert_eq!(snapshot.color_code(), "#800080");
    }

    #[test]
    fn test_process_skipped_while_disconnected() {
        let mut transport = MockTransport::failing(1);
        transport.inbox.push(("cheerlights", b"red")).unwrap();

        let mut feed = listener(transport);
        let mut snapshot = StatusSnapshot::new();
        block_on(feed.poll(0));

        assert_eq!(block_on(feed.process(&mut snapshot)), 0);
        assert_eq!(snapshot.color_name(), "");
    }

    #[test]
    fn test_poll_error_drops_session_and_reconnects() {
        let mut feed = listener(MockTransport::new());
        let mut snapshot = StatusSnapshot::new();
        block_on(feed.poll(0));

        feed.transport.poll_error = Some(TransportError::Io);
        block_on(feed.process(&mut snapshot));
        assert_eq!(feed.state(), ConnectionState::Disconnected);

        // Link drops after a success reconnect without waiting
        assert_eq!(block_on(feed.poll(10)), ConnectionState::Connected);
        assert_eq!(feed.transport().connects, 2);
    }

    #[test]
    fn test_lost_link_detected_on_poll() {
        let mut feed = listener(MockTransport::new());
        block_on(feed.poll(0));
        feed.transport.connected = false;
        feed.transport.connect_results.push_back(Err(TransportError::Io)).unwrap();

        assert_eq!(block_on(feed.poll(100)), ConnectionState::Disconnected);
        assert_eq!(feed.transport().connects, 2);
        assert_eq!(feed.policy().next_attempt_ms(), Some(5_100));
    }
}
