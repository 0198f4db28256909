//! MQTT 3.1.1 subscriber subset
//!
//! Control packet format:
//! ```text
//! ┌────────────────┬──────────────────┬─────────────────┬─────────┐
//! │ TYPE | FLAGS   │ REMAINING LENGTH │ VARIABLE HEADER │ PAYLOAD │
//! │ 1B             │ 1-4B (varint)    │ type-specific   │         │
//! └────────────────┴──────────────────┴─────────────────┴─────────┘
//! ```
//!
//! Only what a clean-session QoS 0 subscriber needs is implemented:
//! CONNECT, SUBSCRIBE, PINGREQ and DISCONNECT out; CONNACK, SUBACK,
//! PUBLISH and PINGRESP in.

pub mod packet;
pub mod parser;
pub mod queue;

pub use packet::{
    encode_connect, encode_disconnect, encode_pingreq, encode_subscribe, ConnectReturnCode,
};
pub use parser::{Packet, PacketParser, Publish, MAX_BODY_SIZE, MAX_MESSAGE_SIZE, MAX_TOPIC_LEN};
pub use queue::PublishQueue;

/// Default unencrypted broker port
pub const MQTT_PORT: u16 = 1883;

/// Largest value the remaining-length field can carry
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Control packet types (upper nibble of the fixed header)
pub mod packet_type {
    pub const CONNECT: u8 = 1;
    pub const CONNACK: u8 = 2;
    pub const PUBLISH: u8 = 3;
    pub const PUBACK: u8 = 4;
    pub const SUBSCRIBE: u8 = 8;
    pub const SUBACK: u8 = 9;
    pub const PINGREQ: u8 = 12;
    pub const PINGRESP: u8 = 13;
    pub const DISCONNECT: u8 = 14;
}

/// Errors that can occur during MQTT packet encoding or parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MqttError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// String longer than the 16-bit length prefix allows
    StringTooLong,
    /// Remaining length field longer than four bytes
    RemainingLengthOverflow,
    /// Packet body does not match its type
    Malformed,
    /// Packet larger than the receive buffer; it was skipped
    PacketTooLarge,
}
