//! Outbound control packet encoders

use super::{packet_type, MqttError, MAX_REMAINING_LENGTH};

/// Protocol name and level for MQTT 3.1.1
const PROTOCOL_NAME: &str = "MQTT";
const PROTOCOL_LEVEL: u8 = 4;

/// CONNECT flag: start without a stored session
const CLEAN_SESSION: u8 = 0x02;

/// CONNACK return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectReturnCode {
    Accepted,
    UnacceptableProtocol,
    IdentifierRejected,
    ServerUnavailable,
    BadCredentials,
    NotAuthorized,
    Unknown(u8),
}

impl From<u8> for ConnectReturnCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Accepted,
            1 => Self::UnacceptableProtocol,
            2 => Self::IdentifierRejected,
            3 => Self::ServerUnavailable,
            4 => Self::BadCredentials,
            5 => Self::NotAuthorized,
            other => Self::Unknown(other),
        }
    }
}

/// Cursor over an output buffer
struct Writer<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), MqttError> {
        let end = self.pos + bytes.len();
        if end > self.buffer.len() {
            return Err(MqttError::BufferTooSmall);
        }
        self.buffer[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_u8(&mut self, value: u8) -> Result<(), MqttError> {
        self.put(&[value])
    }

    fn put_u16(&mut self, value: u16) -> Result<(), MqttError> {
        self.put(&value.to_be_bytes())
    }

    /// Length-prefixed UTF-8 string
    fn put_str(&mut self, value: &str) -> Result<(), MqttError> {
        let len = u16::try_from(value.len()).map_err(|_| MqttError::StringTooLong)?;
        self.put_u16(len)?;
        self.put(value.as_bytes())
    }

    fn put_remaining_length(&mut self, mut len: usize) -> Result<(), MqttError> {
        if len > MAX_REMAINING_LENGTH {
            return Err(MqttError::RemainingLengthOverflow);
        }
        loop {
            let mut byte = (len % 128) as u8;
            len /= 128;
            if len > 0 {
                byte |= 0x80;
            }
            self.put_u8(byte)?;
            if len == 0 {
                return Ok(());
            }
        }
    }

    fn finish(self) -> usize {
        self.pos
    }
}

/// Encode a clean-session CONNECT packet
///
/// Returns the number of bytes written
pub fn encode_connect(
    buffer: &mut [u8],
    client_id: &str,
    keep_alive_s: u16,
) -> Result<usize, MqttError> {
    // protocol name (2 + 4) + level + flags + keep alive (2) + client id
    let remaining = 2 + PROTOCOL_NAME.len() + 1 + 1 + 2 + 2 + client_id.len();

    let mut w = Writer::new(buffer);
    w.put_u8(packet_type::CONNECT << 4)?;
    w.put_remaining_length(remaining)?;
    w.put_str(PROTOCOL_NAME)?;
    w.put_u8(PROTOCOL_LEVEL)?;
    w.put_u8(CLEAN_SESSION)?;
    w.put_u16(keep_alive_s)?;
    w.put_str(client_id)?;
    Ok(w.finish())
}

/// Encode a SUBSCRIBE packet for a single topic filter at QoS 0
pub fn encode_subscribe(buffer: &mut [u8], packet_id: u16, topic: &str) -> Result<usize, MqttError> {
    let remaining = 2 + 2 + topic.len() + 1;

    let mut w = Writer::new(buffer);
    // SUBSCRIBE requires flags 0b0010
    w.put_u8(packet_type::SUBSCRIBE << 4 | 0x02)?;
    w.put_remaining_length(remaining)?;
    w.put_u16(packet_id)?;
    w.put_str(topic)?;
    w.put_u8(0)?;
    Ok(w.finish())
}

/// Encode a PINGREQ packet
pub fn encode_pingreq(buffer: &mut [u8]) -> Result<usize, MqttError> {
    let mut w = Writer::new(buffer);
    w.put(&[packet_type::PINGREQ << 4, 0])?;
    Ok(w.finish())
}

/// Encode a DISCONNECT packet
pub fn encode_disconnect(buffer: &mut [u8]) -> Result<usize, MqttError> {
    let mut w = Writer::new(buffer);
    w.put(&[packet_type::DISCONNECT << 4, 0])?;
    Ok(w.finish())
}
