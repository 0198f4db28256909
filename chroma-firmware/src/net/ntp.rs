//! SNTP client over UDP

use defmt::*;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, WithTimeout};
use heapless::String;

use chroma_core::config::{TimeConfig, MAX_HOST_LEN};
use chroma_core::traits::{ClockError, TimeSync};
use chroma_protocol::sntp::{encode_request, parse_response};
use chroma_protocol::SNTP_PACKET_SIZE;

use super::resolve;

/// Local port the request is sent from
const LOCAL_PORT: u16 = 1337;

/// One-shot SNTP exchanges with a configured server
pub struct SntpClient {
    stack: Stack<'static>,
    server: String<MAX_HOST_LEN>,
    port: u16,
    timeout: Duration,
    rx_meta: [PacketMetadata; 2],
    tx_meta: [PacketMetadata; 2],
    rx_buffer: [u8; 128],
    tx_buffer: [u8; 128],
}

impl SntpClient {
    pub fn new(stack: Stack<'static>, config: &TimeConfig) -> Self {
        Self {
            stack,
            server: config.server.clone(),
            port: config.port,
            timeout: Duration::from_millis(u64::from(config.timeout_ms)),
            rx_meta: [PacketMetadata::EMPTY; 2],
            tx_meta: [PacketMetadata::EMPTY; 2],
            rx_buffer: [0; 128],
            tx_buffer: [0; 128],
        }
    }
}

impl TimeSync for SntpClient {
    async fn exchange(&mut self) -> Result<u64, ClockError> {
        if !self.stack.is_config_up() {
            return Err(ClockError::Unreachable);
        }

        let Some(addr) = resolve(self.stack, &self.server).await else {
            return Err(ClockError::Unreachable);
        };

        let mut socket = UdpSocket::new(
            self.stack,
            &mut self.rx_meta,
            &mut self.rx_buffer,
            &mut self.tx_meta,
            &mut self.tx_buffer,
        );
        if let Err(e) = socket.bind(LOCAL_PORT) {
            warn!("NTP bind failed: {}", e);
            return Err(ClockError::Unreachable);
        }

        let mut packet = [0u8; SNTP_PACKET_SIZE];
        let len = encode_request(&mut packet).map_err(|_| ClockError::Unreachable)?;

        if let Err(e) = socket
            .send_to(&packet[..len], IpEndpoint::new(addr, self.port))
            .await
        {
            warn!("NTP send failed: {}", e);
            return Err(ClockError::Unreachable);
        }

        let received = match socket.recv_from(&mut packet).with_timeout(self.timeout).await {
            Ok(Ok((n, _meta))) => n,
            Ok(Err(e)) => {
                warn!("NTP receive failed: {}", e);
                return Err(ClockError::Unreachable);
            }
            Err(_) => {
                debug!("NTP response timed out");
                return Err(ClockError::Unreachable);
            }
        };

        parse_response(&packet[..received]).map_err(|e| {
            warn!("Bad NTP response: {}", e);
            ClockError::Unreachable
        })
    }
}
