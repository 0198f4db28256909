//! Configuration type definitions
//!
//! These types represent the device configuration. The firmware build
//! parses `device.toml` into `DeviceConfig`, validates it and embeds it as
//! postcard-serialized binary data.

use heapless::String;

use chroma_protocol::mqtt::{MQTT_PORT, MAX_TOPIC_LEN};
use chroma_protocol::NTP_PORT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum DHCP hostname length
pub const MAX_HOSTNAME_LEN: usize = 32;

/// Maximum server host name length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum client-id prefix length
pub const MAX_CLIENT_PREFIX_LEN: usize = 16;

/// Largest UTC offset accepted, in seconds
pub const MAX_UTC_OFFSET_S: i32 = 14 * 3600;

fn text<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    let _ = out.push_str(value);
    out
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A required host name is empty
    EmptyHost,
    /// A feed topic is empty
    EmptyTopic,
    /// Name and code topics are the same
    DuplicateTopic,
    /// An interval or timeout is zero
    ZeroInterval,
    /// A port is zero
    ZeroPort,
    /// UTC offset beyond ±14 h
    OffsetOutOfRange,
    /// `max_attempts` is zero
    ZeroAttempts,
}

/// Wireless network settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    /// Hostname sent with DHCP requests
    pub hostname: String<MAX_HOSTNAME_LEN>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            hostname: text("thot0x9"),
        }
    }
}

/// Network time settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimeConfig {
    pub server: String<MAX_HOST_LEN>,
    pub port: u16,
    /// Local offset from UTC in seconds
    pub utc_offset_s: i32,
    /// Resynchronize this often once synced
    pub update_interval_s: u32,
    /// Wait this long after a failed round
    pub retry_interval_ms: u32,
    /// Exchanges per synchronization round
    pub max_attempts: u8,
    /// Per-exchange response timeout
    pub timeout_ms: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            server: text("pool.ntp.org"),
            port: NTP_PORT,
            utc_offset_s: -21_600,
            update_interval_s: 60,
            retry_interval_ms: 1_000,
            max_attempts: 3,
            timeout_ms: 1_000,
        }
    }
}

/// Color feed (MQTT) settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    pub broker: String<MAX_HOST_LEN>,
    pub port: u16,
    /// Topic carrying the color name
    pub name_topic: String<MAX_TOPIC_LEN>,
    /// Topic carrying the "#RRGGBB" code
    pub code_topic: String<MAX_TOPIC_LEN>,
    /// Client id prefix; a random hex suffix is appended at boot
    pub client_prefix: String<MAX_CLIENT_PREFIX_LEN>,
    /// Delay between failed connection attempts
    pub reconnect_backoff_ms: u32,
    pub keep_alive_s: u16,
    /// Timeout for CONNACK/SUBACK
    pub response_timeout_ms: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            broker: text("mqtt.cheerlights.com"),
            port: MQTT_PORT,
            name_topic: text("cheerlights"),
            code_topic: text("cheerlightsRGB"),
            client_prefix: text("ESPclient-"),
            reconnect_backoff_ms: 5_000,
            keep_alive_s: 15,
            response_timeout_ms: 3_000,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Minimum time between redraws
    pub render_interval_ms: u32,
    /// Panel is mounted upside down
    pub rotate_180: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 1_000,
            rotate_180: true,
        }
    }
}

/// Status page settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HttpConfig {
    pub port: u16,
    /// How long to wait for a client per loop iteration
    pub accept_window_ms: u32,
    /// How long a client may take to send its request head
    pub request_timeout_ms: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 80,
            accept_window_ms: 10,
            request_timeout_ms: 2_000,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    pub network: NetworkConfig,
    pub time: TimeConfig,
    pub feed: FeedConfig,
    pub display: DisplayConfig,
    pub http: HttpConfig,
}

impl DeviceConfig {
    /// Check the configuration for values the firmware cannot run with
    ///
    /// Wi-Fi credentials are not checked; an empty SSID just never joins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let time = &self.time;
        if time.server.is_empty() || self.feed.broker.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if time.port == 0 || self.feed.port == 0 || self.http.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if time.utc_offset_s.abs() > MAX_UTC_OFFSET_S {
            return Err(ConfigError::OffsetOutOfRange);
        }
        if time.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if time.update_interval_s == 0
            || time.retry_interval_ms == 0
            || time.timeout_ms == 0
            || self.feed.reconnect_backoff_ms == 0
            || self.feed.response_timeout_ms == 0
            || self.display.render_interval_ms == 0
            || self.http.accept_window_ms == 0
            || self.http.request_timeout_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }

        let feed = &self.feed;
        if feed.name_topic.is_empty() || feed.code_topic.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if feed.name_topic == feed.code_topic {
            return Err(ConfigError::DuplicateTopic);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DeviceConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.time.utc_offset_s, -21_600);
        assert_eq!(config.feed.name_topic.as_str(), "cheerlights");
        assert_eq!(config.feed.code_topic.as_str(), "cheerlightsRGB");
        assert_eq!(config.feed.port, 1883);
        assert_eq!(config.display.render_interval_ms, 1_000);
    }

    #[test]
    fn test_duplicate_topic() {
        let mut config = DeviceConfig::default();
        config.feed.code_topic = config.feed.name_topic.clone();
        assert_eq!(config.validate(), Err(ConfigError::DuplicateTopic));
    }

    #[test]
    fn test_empty_topic() {
        let mut config = DeviceConfig::default();
        config.feed.name_topic.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyTopic));
    }

    #[test]
    fn test_offset_range() {
        let mut config = DeviceConfig::default();
        config.time.utc_offset_s = 14 * 3600;
        assert_eq!(config.validate(), Ok(()));
        config.time.utc_offset_s = -(14 * 3600 + 1);
        assert_eq!(config.validate(), Err(ConfigError::OffsetOutOfRange));
    }

    #[test]
    fn test_zero_interval() {
        let mut config = DeviceConfig::default();
        config.display.render_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn test_zero_port_and_attempts() {
        let mut config = DeviceConfig::default();
        config.http.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPort));

        let mut config = DeviceConfig::default();
        config.time.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroAttempts));
    }
}
