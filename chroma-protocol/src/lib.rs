//! Wire codecs for the Chroma color clock
//!
//! The appliance talks three small protocols, all implemented here without
//! allocation so they can be exercised on the host:
//!
//! - `sntp`: 48-byte time request/response packets (RFC 4330)
//! - `mqtt`: the MQTT 3.1.1 subset a QoS 0 subscriber needs
//! - `http`: request-head parsing and response encoding for the status page
//!
//! Nothing in this crate performs I/O. The firmware feeds received bytes in
//! and writes encoded buffers out over its sockets.

#![no_std]
#![deny(unsafe_code)]

pub mod http;
pub mod mqtt;
pub mod sntp;

pub use http::{parse_request, HttpError, Method, Request, Response, Status};
pub use mqtt::{MqttError, Packet, PacketParser, Publish, PublishQueue};
pub use sntp::{SntpError, NTP_PORT, SNTP_PACKET_SIZE};
