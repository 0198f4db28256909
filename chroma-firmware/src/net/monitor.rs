//! Link monitor
//!
//! Runs as the loop's housekeeping step: logs link and address changes and
//! rejoins the access point after the link drops. DHCP renews on its own
//! once the link is back.

use cyw43::Control;
use defmt::*;
use embassy_net::Stack;

use chroma_core::config::NetworkConfig;
use chroma_core::traits::Housekeeping;

use super::wifi;

/// Link state is sampled this often
const CHECK_INTERVAL_MS: u64 = 1_000;

/// Grace period before the first rejoin, then the spacing between rejoins
const REJOIN_DELAY_MS: u64 = 5_000;
const REJOIN_INTERVAL_MS: u64 = 30_000;

pub struct LinkMonitor {
    stack: Stack<'static>,
    control: Control<'static>,
    network: NetworkConfig,
    online: bool,
    next_check_ms: u64,
    next_rejoin_ms: u64,
    rejoins: u32,
}

impl LinkMonitor {
    pub fn new(stack: Stack<'static>, control: Control<'static>, network: NetworkConfig) -> Self {
        Self {
            online: stack.is_link_up() && stack.is_config_up(),
            stack,
            control,
            network,
            next_check_ms: 0,
            next_rejoin_ms: 0,
            rejoins: 0,
        }
    }

    fn report(&self, online: bool) {
        if !online {
            warn!("Network down");
            return;
        }
        match self.stack.config_v4() {
            Some(config) => info!("Network up, IP address: {}", config.address),
            None => info!("Network up"),
        }
    }
}

impl Housekeeping for LinkMonitor {
    async fn service(&mut self, now_ms: u64) {
        if now_ms < self.next_check_ms {
            return;
        }
        self.next_check_ms = now_ms + CHECK_INTERVAL_MS;

        let link_up = self.stack.is_link_up();
        let online = link_up && self.stack.is_config_up();
        if online != self.online {
            self.report(online);
            self.online = online;
            if !online {
                self.next_rejoin_ms = now_ms + REJOIN_DELAY_MS;
            }
        }

        if link_up || now_ms < self.next_rejoin_ms {
            return;
        }

        self.rejoins = self.rejoins.wrapping_add(1);
        info!("Rejoining {} (rejoin {})", self.network.ssid.as_str(), self.rejoins);
        if !wifi::join(&mut self.control, &self.network).await {
            self.next_rejoin_ms = now_ms + REJOIN_INTERVAL_MS;
        }
    }
}
