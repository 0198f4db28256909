//! Network adapters
//!
//! Each module binds one core trait to the embassy-net stack:
//!
//! - `ntp`: `TimeSync` over a UDP socket
//! - `mqtt`: `FeedTransport` over a TCP socket
//! - `http`: `HttpEndpoint` over a listening TCP socket
//! - `monitor`: `Housekeeping` that watches the Wi-Fi link
//! - `wifi`: association and the driver tasks

pub mod http;
pub mod monitor;
pub mod mqtt;
pub mod ntp;
pub mod wifi;

pub use http::HttpListener;
pub use monitor::LinkMonitor;
pub use mqtt::MqttTransport;
pub use ntp::SntpClient;

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::{IpAddress, Ipv4Address, Stack};
use embassy_time::{Duration, WithTimeout};

/// Upper bound on a single DNS lookup
const DNS_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolve `host` to an address
///
/// Dotted-quad literals skip the lookup.
pub async fn resolve(stack: Stack<'static>, host: &str) -> Option<IpAddress> {
    if let Ok(addr) = host.parse::<Ipv4Address>() {
        return Some(IpAddress::Ipv4(addr));
    }

    match stack
        .dns_query(host, DnsQueryType::A)
        .with_timeout(DNS_TIMEOUT)
        .await
    {
        Ok(Ok(addrs)) => addrs.first().copied(),
        Ok(Err(e)) => {
            warn!("DNS lookup for {} failed: {}", host, e);
            None
        }
        Err(_) => {
            warn!("DNS lookup for {} timed out", host);
            None
        }
    }
}
