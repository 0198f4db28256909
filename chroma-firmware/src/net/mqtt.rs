//! MQTT session over TCP
//!
//! Blocking waits are limited to connection setup (CONNACK, SUBACK), each
//! bounded by the configured response timeout. `poll` only consumes bytes
//! already sitting in the socket buffer.

use defmt::*;
use embassy_net::tcp::{State, TcpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Instant, WithTimeout};
use embedded_io_async::Write;
use heapless::String;

use chroma_core::config::{FeedConfig, MAX_HOST_LEN};
use chroma_core::traits::{FeedTransport, TransportError};
use chroma_protocol::mqtt::{
    encode_connect, encode_disconnect, encode_pingreq, encode_subscribe, ConnectReturnCode,
};
use chroma_protocol::{Packet, PacketParser, PublishQueue};

use super::resolve;

/// Messages held while waiting for a control packet
const PENDING_CAPACITY: usize = 4;

/// SUBACK return code for a refused subscription
const SUBACK_FAILURE: u8 = 0x80;

/// Outbound packet scratch size (CONNECT and SUBSCRIBE are the largest)
const TX_SCRATCH: usize = 128;

/// Control packet a setup step is waiting for
#[derive(Clone, Copy)]
enum Awaiting {
    ConnAck,
    SubAck(u16),
}

/// Clean-session QoS 0 subscriber on an embassy-net TCP socket
pub struct MqttTransport {
    socket: TcpSocket<'static>,
    stack: Stack<'static>,
    broker: String<MAX_HOST_LEN>,
    port: u16,
    keep_alive: Duration,
    response_timeout: Duration,
    parser: PacketParser,
    /// Publishes that arrived ahead of an awaited control packet
    pending: PublishQueue<PENDING_CAPACITY>,
    connected: bool,
    next_packet_id: u16,
    last_sent: Instant,
    ping_sent: Option<Instant>,
}

impl MqttTransport {
    pub fn new(
        stack: Stack<'static>,
        rx_buffer: &'static mut [u8],
        tx_buffer: &'static mut [u8],
        config: &FeedConfig,
    ) -> Self {
        Self {
            socket: TcpSocket::new(stack, rx_buffer, tx_buffer),
            stack,
            broker: config.broker.clone(),
            port: config.port,
            keep_alive: Duration::from_secs(u64::from(config.keep_alive_s)),
            response_timeout: Duration::from_millis(u64::from(config.response_timeout_ms)),
            parser: PacketParser::new(),
            pending: PublishQueue::new(),
            connected: false,
            next_packet_id: 1,
            last_sent: Instant::now(),
            ping_sent: None,
        }
    }

    fn packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        // Packet id 0 is reserved
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }

    /// Drop the session and reset the socket
    async fn teardown(&mut self) {
        if self.connected && self.socket.state() == State::Established {
            let mut buf = [0u8; 2];
            if let Ok(len) = encode_disconnect(&mut buf) {
                let _ = self
                    .socket
                    .write_all(&buf[..len])
                    .with_timeout(self.response_timeout)
                    .await;
            }
        }

        self.connected = false;
        self.ping_sent = None;
        self.pending.clear();
        self.parser.reset();
        self.socket.abort();
        let _ = self.socket.flush().with_timeout(self.response_timeout).await;
    }

    fn lose_session(&mut self) {
        self.connected = false;
        self.ping_sent = None;
        self.socket.abort();
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        match self
            .socket
            .write_all(bytes)
            .with_timeout(self.response_timeout)
            .await
        {
            Ok(Ok(())) => {
                self.last_sent = Instant::now();
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("MQTT write failed: {}", e);
                Err(TransportError::Io)
            }
            Err(_) => Err(TransportError::Timeout),
        }
    }

    /// Feed received bytes to the parser
    ///
    /// Publishes are queued; the first packet matching `awaiting` is
    /// returned. Keep-alive responses are consumed here.
    fn ingest(&mut self, bytes: &[u8], awaiting: Option<Awaiting>) -> Option<Packet> {
        let mut found = None;
        for &byte in bytes {
            let packet = match self.parser.feed(byte) {
                Ok(Some(packet)) => packet,
                Ok(None) => continue,
                Err(e) => {
                    warn!("MQTT packet dropped: {}", e);
                    continue;
                }
            };

            match packet {
                Packet::Publish(publish) => {
                    if self.pending.push(publish).is_some() {
                        warn!("MQTT message queue full, oldest message dropped");
                    }
                }
                Packet::PingResp => self.ping_sent = None,
                Packet::ConnAck { .. } if matches!(awaiting, Some(Awaiting::ConnAck)) => {
                    found.get_or_insert(packet);
                }
                Packet::SubAck { packet_id, .. }
                    if matches!(awaiting, Some(Awaiting::SubAck(id)) if id == packet_id) =>
                {
                    found.get_or_insert(packet);
                }
                other => debug!("MQTT ignoring packet {}", other),
            }
        }
        found
    }

    /// Read until the awaited control packet arrives
    async fn wait_for(&mut self, awaiting: Awaiting) -> Result<Packet, TransportError> {
        let deadline = Instant::now() + self.response_timeout;
        let mut chunk = [0u8; 64];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let n = match self.socket.read(&mut chunk).with_timeout(remaining).await {
                Ok(Ok(0)) => return Err(TransportError::Disconnected),
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    warn!("MQTT read failed: {}", e);
                    return Err(TransportError::Io);
                }
                Err(_) => return Err(TransportError::Timeout),
            };

            if let Some(packet) = self.ingest(&chunk[..n], Some(awaiting)) {
                return Ok(packet);
            }
        }
    }

    /// Consume whatever the socket already holds
    async fn drain_socket(&mut self) -> Result<(), TransportError> {
        let mut chunk = [0u8; 64];
        while self.socket.can_recv() {
            match self.socket.read(&mut chunk).await {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => {
                    self.ingest(&chunk[..n], None);
                }
                Err(e) => {
                    warn!("MQTT read failed: {}", e);
                    return Err(TransportError::Io);
                }
            }
        }
        Ok(())
    }

    /// Send PINGREQ when idle; give up if the last one went unanswered
    async fn keep_alive(&mut self) -> Result<(), TransportError> {
        let now = Instant::now();

        if let Some(sent) = self.ping_sent {
            if now.duration_since(sent) > self.keep_alive {
                warn!("MQTT keep-alive timed out");
                return Err(TransportError::Timeout);
            }
            return Ok(());
        }

        if now.duration_since(self.last_sent) >= self.keep_alive {
            let mut buf = [0u8; 2];
            let len = encode_pingreq(&mut buf).map_err(|_| TransportError::Protocol)?;
            self.send(&buf[..len]).await?;
            self.ping_sent = Some(now);
        }
        Ok(())
    }

    async fn open(&mut self, client_id: &str) -> Result<(), TransportError> {
        if !self.stack.is_config_up() {
            return Err(TransportError::Io);
        }

        let addr = resolve(self.stack, &self.broker)
            .await
            .ok_or(TransportError::Io)?;

        // Let the stack notice a dead broker between keep-alives
        self.socket.set_timeout(Some(self.keep_alive * 2));

        match self
            .socket
            .connect(IpEndpoint::new(addr, self.port))
            .with_timeout(self.response_timeout)
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("MQTT TCP connect failed: {}", e);
                return Err(TransportError::Io);
            }
            Err(_) => return Err(TransportError::Timeout),
        }

        let mut buf = [0u8; TX_SCRATCH];
        let keep_alive_s = self.keep_alive.as_secs() as u16;
        let len =
            encode_connect(&mut buf, client_id, keep_alive_s).map_err(|_| TransportError::Protocol)?;
        self.send(&buf[..len]).await?;

        match self.wait_for(Awaiting::ConnAck).await? {
            Packet::ConnAck { return_code: 0, .. } => Ok(()),
            Packet::ConnAck { return_code, .. } => {
                warn!(
                    "MQTT connection refused: {}",
                    ConnectReturnCode::from(return_code)
                );
                Err(TransportError::Refused(return_code))
            }
            _ => Err(TransportError::Protocol),
        }
    }
}

impl FeedTransport for MqttTransport {
    fn is_connected(&self) -> bool {
        self.connected && self.socket.state() == State::Established
    }

    async fn connect(&mut self, client_id: &str) -> Result<(), TransportError> {
        self.teardown().await;

        match self.open(client_id).await {
            Ok(()) => {
                self.connected = true;
                Ok(())
            }
            Err(e) => {
                self.lose_session();
                Err(e)
            }
        }
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }

        let packet_id = self.packet_id();
        let mut buf = [0u8; TX_SCRATCH];
        let len = encode_subscribe(&mut buf, packet_id, topic).map_err(|_| TransportError::Protocol)?;

        let result = match self.send(&buf[..len]).await {
            Ok(()) => self.wait_for(Awaiting::SubAck(packet_id)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Packet::SubAck { granted_qos, .. }) if granted_qos != SUBACK_FAILURE => Ok(()),
            Ok(_) => {
                warn!("MQTT subscription to {} refused", topic);
                Err(TransportError::Refused(SUBACK_FAILURE))
            }
            Err(e) => {
                self.lose_session();
                Err(e)
            }
        }
    }

    async fn poll<F>(&mut self, mut on_message: F) -> Result<usize, TransportError>
    where
        F: FnMut(&str, &[u8]),
    {
        if !self.is_connected() {
            self.connected = false;
            return Err(TransportError::Disconnected);
        }

        let result = match self.drain_socket().await {
            Ok(()) => self.keep_alive().await,
            Err(e) => Err(e),
        };

        let mut delivered = 0;
        while let Some(publish) = self.pending.pop() {
            on_message(&publish.topic, &publish.payload);
            delivered += 1;
        }

        match result {
            Ok(()) => Ok(delivered),
            Err(e) => {
                self.lose_session();
                Err(e)
            }
        }
    }
}
