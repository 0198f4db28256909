//! Wi-Fi association and driver tasks

use cyw43::{Control, JoinOptions};
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::Stack;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{Duration, Timer, WithTimeout};

use chroma_core::config::NetworkConfig;

/// Upper bound on a single association attempt
const JOIN_TIMEOUT: Duration = Duration::from_secs(15);

/// How long to wait for a DHCP lease after joining
const DHCP_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause between failed boot-time attempts
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub type WifiRunner = cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>;

/// CYW43439 driver task
#[embassy_executor::task]
pub async fn cyw43_task(runner: WifiRunner) -> ! {
    runner.run().await
}

/// embassy-net stack task
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Make one bounded association attempt
pub async fn join(control: &mut Control<'static>, network: &NetworkConfig) -> bool {
    let options = if network.password.is_empty() {
        JoinOptions::new_open()
    } else {
        JoinOptions::new(network.password.as_bytes())
    };

    match control
        .join(&network.ssid, options)
        .with_timeout(JOIN_TIMEOUT)
        .await
    {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Join {} failed, status={}", network.ssid.as_str(), e.status);
            false
        }
        Err(_) => {
            warn!("Join {} timed out", network.ssid.as_str());
            false
        }
    }
}

/// Join the network and wait for an address, retrying until both succeed
pub async fn connect(control: &mut Control<'static>, stack: Stack<'static>, network: &NetworkConfig) {
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.wrapping_add(1);
        info!("Connecting to {} (attempt {})", network.ssid.as_str(), attempt);

        if join(control, network).await {
            match stack.wait_config_up().with_timeout(DHCP_TIMEOUT).await {
                Ok(()) => {
                    if let Some(config) = stack.config_v4() {
                        info!("WiFi connected, IP address: {}", config.address);
                    }
                    return;
                }
                Err(_) => {
                    warn!("DHCP timed out, leaving {}", network.ssid.as_str());
                    control.leave().await;
                }
            }
        }

        Timer::after(RETRY_DELAY).await;
    }
}
