//! Streaming parser for inbound control packets

use heapless::{String, Vec};

use super::{packet_type, MqttError};

/// Largest packet body held in memory
pub const MAX_BODY_SIZE: usize = 256;

/// Longest topic name accepted in a PUBLISH
pub const MAX_TOPIC_LEN: usize = 64;

/// Largest application message accepted in a PUBLISH
pub const MAX_MESSAGE_SIZE: usize = 192;

/// An application message received from the broker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Publish {
    /// Topic the message was published to
    pub topic: String<MAX_TOPIC_LEN>,
    /// Raw message bytes
    pub payload: Vec<u8, MAX_MESSAGE_SIZE>,
    /// Delivery QoS (0-2)
    pub qos: u8,
    /// Packet identifier, present for QoS > 0
    pub packet_id: Option<u16>,
}

/// A decoded inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Packet {
    ConnAck { session_present: bool, return_code: u8 },
    SubAck { packet_id: u16, granted_qos: u8 },
    Publish(Publish),
    PingResp,
    /// Any other packet type, body discarded
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the fixed header byte
    WaitingForHeader,
    /// Reading remaining-length varint bytes
    ReadingLength,
    /// Reading body bytes
    ReadingBody,
    /// Discarding an oversized body
    Skipping,
}

/// State machine for parsing packets from a byte stream
#[derive(Debug, Clone)]
pub struct PacketParser {
    state: ParseState,
    header: u8,
    remaining: usize,
    multiplier: usize,
    length_bytes: u8,
    body: Vec<u8, MAX_BODY_SIZE>,
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketParser {
    /// Create a new packet parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            header: 0,
            remaining: 0,
            multiplier: 1,
            length_bytes: 0,
            body: Vec::new(),
        }
    }

    /// Reset the parser state
    ///
    /// Call after the underlying connection is re-established.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.header = 0;
        self.remaining = 0;
        self.multiplier = 1;
        self.length_bytes = 0;
        self.body.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(packet))` when a complete packet is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when a packet had to
    /// be dropped. The parser is ready for the next packet after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Packet>, MqttError> {
        match self.state {
            ParseState::WaitingForHeader => {
                self.header = byte;
                self.remaining = 0;
                self.multiplier = 1;
                self.length_bytes = 0;
                self.body.clear();
                self.state = ParseState::ReadingLength;
                Ok(None)
            }
            ParseState::ReadingLength => {
                self.remaining += (byte & 0x7F) as usize * self.multiplier;
                self.multiplier *= 128;
                self.length_bytes += 1;

                if byte & 0x80 != 0 {
                    if self.length_bytes == 4 {
                        self.reset();
                        return Err(MqttError::RemainingLengthOverflow);
                    }
                    return Ok(None);
                }

                if self.remaining == 0 {
                    return self.complete().map(Some);
                }
                self.state = if self.remaining > MAX_BODY_SIZE {
                    ParseState::Skipping
                } else {
                    ParseState::ReadingBody
                };
                Ok(None)
            }
            ParseState::ReadingBody => {
                // Capacity was checked against `remaining`
                let _ = self.body.push(byte);
                if self.body.len() == self.remaining {
                    return self.complete().map(Some);
                }
                Ok(None)
            }
            ParseState::Skipping => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.reset();
                    return Err(MqttError::PacketTooLarge);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser, handing each packet to `on_packet`
    ///
    /// Unlike a frame-at-a-time API this consumes the whole slice, since a
    /// single TCP read often carries several packets. Dropped packets are
    /// reported through `on_error` and parsing continues.
    pub fn feed_bytes<F, E>(&mut self, bytes: &[u8], mut on_packet: F, mut on_error: E)
    where
        F: FnMut(Packet),
        E: FnMut(MqttError),
    {
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(packet)) => on_packet(packet),
                Ok(None) => {}
                Err(e) => on_error(e),
            }
        }
    }

    fn complete(&mut self) -> Result<Packet, MqttError> {
        let result = decode(self.header, &self.body);
        self.reset();
        result
    }
}

fn decode(header: u8, body: &[u8]) -> Result<Packet, MqttError> {
    match header >> 4 {
        packet_type::CONNACK => {
            if body.len() != 2 {
                return Err(MqttError::Malformed);
            }
            Ok(Packet::ConnAck {
                session_present: body[0] & 0x01 != 0,
                return_code: body[1],
            })
        }
        packet_type::SUBACK => {
            if body.len() < 3 {
                return Err(MqttError::Malformed);
            }
            Ok(Packet::SubAck {
                packet_id: u16::from_be_bytes([body[0], body[1]]),
                granted_qos: body[2],
            })
        }
        packet_type::PUBLISH => decode_publish(header, body).map(Packet::Publish),
        packet_type::PINGRESP => Ok(Packet::PingResp),
        other => Ok(Packet::Other(other)),
    }
}

fn decode_publish(header: u8, body: &[u8]) -> Result<Publish, MqttError> {
    let qos = (header >> 1) & 0x03;
    if qos == 3 || body.len() < 2 {
        return Err(MqttError::Malformed);
    }

    let topic_len = u16::from_be_bytes([body[0], body[1]]) as usize;
    let mut pos = 2 + topic_len;
    if pos > body.len() {
        return Err(MqttError::Malformed);
    }
    let topic = core::str::from_utf8(&body[2..pos]).map_err(|_| MqttError::Malformed)?;

    let packet_id = if qos > 0 {
        if pos + 2 > body.len() {
            return Err(MqttError::Malformed);
        }
        let id = u16::from_be_bytes([body[pos], body[pos + 1]]);
        pos += 2;
        Some(id)
    } else {
        None
    };

    let mut topic_buf = String::new();
    topic_buf
        .push_str(topic)
        .map_err(|_| MqttError::PacketTooLarge)?;

    let mut payload = Vec::new();
    payload
        .extend_from_slice(&body[pos..])
        .map_err(|_| MqttError::PacketTooLarge)?;

    Ok(Publish {
        topic: topic_buf,
        payload,
        qos,
        packet_id,
    })
}
