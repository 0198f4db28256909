//! SNTP client packets
//!
//! Packet layout (48 bytes, big endian):
//! - byte 0: leap indicator (2 bits), version (3 bits), mode (3 bits)
//! - byte 1: stratum
//! - bytes 40..48: transmit timestamp (seconds, fraction) since 1900-01-01

/// Size of an SNTP packet without extension fields
pub const SNTP_PACKET_SIZE: usize = 48;

/// Well-known NTP server port
pub const NTP_PORT: u16 = 123;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Client request header: LI = 3 (unsynchronized), VN = 4, mode = 3 (client)
const REQUEST_HEADER: u8 = 0b1110_0011;

const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;

/// Errors that can occur while building or reading SNTP packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Response shorter than a full packet
    TooShort,
    /// Response is not from a server
    InvalidMode,
    /// Server sent a kiss-of-death (stratum 0)
    KissOfDeath,
    /// Server has no time to give
    ZeroTimestamp,
}

/// Encode a client request into `buffer`
///
/// Returns the number of bytes written
pub fn encode_request(buffer: &mut [u8]) -> Result<usize, SntpError> {
    if buffer.len() < SNTP_PACKET_SIZE {
        return Err(SntpError::BufferTooSmall);
    }

    let packet = &mut buffer[..SNTP_PACKET_SIZE];
    packet.fill(0);
    packet[0] = REQUEST_HEADER;
    packet[1] = 0; // stratum
    packet[2] = 6; // polling interval (2^6 s)
    packet[3] = 0xEC; // clock precision
    packet[12..16].copy_from_slice(b"1N14"); // reference id

    Ok(SNTP_PACKET_SIZE)
}

/// Parse a server response
///
/// Returns the transmit timestamp as Unix seconds (UTC). Timestamps in the
/// second NTP era (after 2036-02-07) are unwrapped.
pub fn parse_response(packet: &[u8]) -> Result<u64, SntpError> {
    if packet.len() < SNTP_PACKET_SIZE {
        return Err(SntpError::TooShort);
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(SntpError::InvalidMode);
    }

    if packet[1] == 0 {
        return Err(SntpError::KissOfDeath);
    }

    let seconds = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]) as u64;
    if seconds == 0 {
        return Err(SntpError::ZeroTimestamp);
    }

    if seconds >= NTP_UNIX_OFFSET {
        Ok(seconds - NTP_UNIX_OFFSET)
    } else {
        // Era 1 wraps the 32-bit seconds counter
        Ok(seconds + (1u64 << 32) - NTP_UNIX_OFFSET)
    }
}
