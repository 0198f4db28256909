//! Status page listener over TCP
//!
//! One socket, one client at a time. Each loop iteration listens for a
//! short accept window; a connected client gets the rest of its request
//! read under a separate timeout, one response, then the socket closes.

use defmt::*;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::{Duration, WithTimeout};
use embedded_io_async::Write;

use chroma_core::config::HttpConfig;
use chroma_core::traits::{HttpEndpoint, ServeError};
use chroma_protocol::http::head_complete;
use chroma_protocol::Response;

/// Largest request head read; longer requests are answered from the prefix
const MAX_HEAD: usize = 1024;

/// Encoded response scratch size
const MAX_RESPONSE: usize = 1536;

/// Grace period for the response to drain before the socket is reset
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

pub struct HttpListener {
    socket: TcpSocket<'static>,
    port: u16,
    accept_window: Duration,
    request_timeout: Duration,
    head: [u8; MAX_HEAD],
    out: [u8; MAX_RESPONSE],
}

impl HttpListener {
    pub fn new(
        stack: Stack<'static>,
        rx_buffer: &'static mut [u8],
        tx_buffer: &'static mut [u8],
        config: &HttpConfig,
    ) -> Self {
        Self {
            socket: TcpSocket::new(stack, rx_buffer, tx_buffer),
            port: config.port,
            accept_window: Duration::from_millis(u64::from(config.accept_window_ms)),
            request_timeout: Duration::from_millis(u64::from(config.request_timeout_ms)),
            head: [0; MAX_HEAD],
            out: [0; MAX_RESPONSE],
        }
    }

    /// Read the request head, respond and flush
    async fn exchange<F>(&mut self, respond: F) -> Result<(), ServeError>
    where
        F: FnOnce(&[u8]) -> Response,
    {
        let mut len = 0;
        while len < self.head.len() {
            let n = self
                .socket
                .read(&mut self.head[len..])
                .await
                .map_err(|_| ServeError::Io)?;
            if n == 0 {
                return Err(ServeError::Io);
            }
            len += n;
            if head_complete(&self.head[..len]) {
                break;
            }
        }

        let response = respond(&self.head[..len]);
        debug!("HTTP {} {}", response.status, response.status.code());

        let n = response.encode(&mut self.out)?;
        self.socket
            .write_all(&self.out[..n])
            .await
            .map_err(|_| ServeError::Io)?;
        self.socket.flush().await.map_err(|_| ServeError::Io)?;
        Ok(())
    }

    async fn close(&mut self) {
        self.socket.close();
        let _ = self.socket.flush().with_timeout(CLOSE_TIMEOUT).await;
        self.socket.abort();
        let _ = self.socket.flush().with_timeout(CLOSE_TIMEOUT).await;
    }
}

impl HttpEndpoint for HttpListener {
    async fn serve<F>(&mut self, respond: F) -> Result<bool, ServeError>
    where
        F: FnOnce(&[u8]) -> Response,
    {
        // The socket stays in LISTEN across windows; re-accepting on the
        // same port is a no-op for the stack
        match self.socket.accept(self.port).with_timeout(self.accept_window).await {
            Err(_) => return Ok(false),
            Ok(Err(e)) => {
                warn!("HTTP accept failed: {}", e);
                self.socket.abort();
                return Err(ServeError::Io);
            }
            Ok(Ok(())) => {}
        }

        let result = match self.exchange(respond).with_timeout(self.request_timeout).await {
            Ok(result) => result,
            Err(_) => Err(ServeError::Timeout),
        };

        self.close().await;
        result.map(|()| true)
    }
}
