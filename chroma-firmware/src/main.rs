//! Chroma - Cheerlights Color Clock Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W. Shows network time and
//! the current Cheerlights color on an EA DOGS102 LCD and serves a small
//! status page over HTTP.
//!
//! Everything after Wi-Fi comes up runs in one cooperative loop; the only
//! other tasks are the radio driver and the network stack.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{DhcpConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::spi::{self, Spi};
use embassy_time::Instant;
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use chroma_core::clock::ClockSource;
use chroma_core::feed::{ClientIds, ColorFeedListener, FeedTopics, ReconnectPolicy};
use chroma_core::scheduler::{RefreshLoop, RenderThrottle};
use chroma_core::traits::Monotonic;
use chroma_core::web::StatusHttpServer;
use chroma_display::{ClockFace, FaceLayout};

use crate::display::Uc1701;
use crate::net::{HttpListener, LinkMonitor, MqttTransport, SntpClient};

mod config;
mod display;
mod net;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// DHCP, DNS, SNTP, MQTT and HTTP
const SOCKETS: usize = 5;

/// The UC1701 is specified up to 33 MHz; stay well below for long wires
const DISPLAY_SPI_HZ: u32 = 8_000_000;

const MQTT_RX_SIZE: usize = 1024;
const MQTT_TX_SIZE: usize = 256;
const HTTP_RX_SIZE: usize = 1024;
const HTTP_TX_SIZE: usize = 2048;

// Static cells for driver state and socket buffers (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<SOCKETS>> = StaticCell::new();
static MQTT_RX: StaticCell<[u8; MQTT_RX_SIZE]> = StaticCell::new();
static MQTT_TX: StaticCell<[u8; MQTT_TX_SIZE]> = StaticCell::new();
static HTTP_RX: StaticCell<[u8; HTTP_RX_SIZE]> = StaticCell::new();
static HTTP_TX: StaticCell<[u8; HTTP_TX_SIZE]> = StaticCell::new();

/// Milliseconds since boot from the embassy time driver
struct Uptime;

impl Monotonic for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Chroma firmware starting...");

    let p = embassy_rp::init(Default::default());
    let config = config::load();
    let mut rng = RoscRng;

    // Display: EA DOGS102 on SPI1
    // SCK=GPIO10, MOSI=GPIO11, CD=GPIO12, CS=GPIO13, RST=GPIO14
    let mut spi_config = spi::Config::default();
    spi_config.frequency = DISPLAY_SPI_HZ;
    spi_config.polarity = spi::Polarity::IdleHigh;
    spi_config.phase = spi::Phase::CaptureOnSecondTransition;
    let spi = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH1, spi_config);

    let mut panel = Uc1701::new(
        spi,
        Output::new(p.PIN_13, Level::High),
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_14, Level::High),
        config.display.rotate_180,
    );
    if let Err(e) = panel.init().await {
        error!("Display init failed: {}", e);
    }

    let mut face = ClockFace::new(panel, FaceLayout::default());
    if let Err(e) = face.show_boot().await {
        warn!("Boot screen failed: {}", e);
    }
    info!("Display initialized");

    // Wi-Fi: CYW43439 on PIO0
    // PWR=GPIO23, DIO=GPIO24, CS=GPIO25, CLK=GPIO29
    let fw = cyw43::aligned_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");
    let nvram = cyw43::aligned_bytes!("../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let wifi_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, wifi_spi, fw, nvram).await;
    spawner.spawn(net::wifi::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    // Network stack with DHCP, announcing the configured hostname
    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = config.network.hostname.as_str().try_into().ok();
    let (stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(dhcp),
        NET_RESOURCES.init(StackResources::new()),
        rng.next_u64(),
    );
    spawner.spawn(net::wifi::net_task(net_runner)).unwrap();

    if config.network.ssid.is_empty() {
        warn!("No SSID configured, the clock cannot go online");
    }
    net::wifi::connect(&mut control, stack, &config.network).await;

    // Components
    let clock = ClockSource::new(SntpClient::new(stack, &config.time), &config.time);

    let transport = MqttTransport::new(
        stack,
        MQTT_RX.init([0; MQTT_RX_SIZE]),
        MQTT_TX.init([0; MQTT_TX_SIZE]),
        &config.feed,
    );
    let feed = ColorFeedListener::new(
        transport,
        FeedTopics::from_config(&config.feed),
        ClientIds::new(&config.feed.client_prefix, rng.next_u32() as u16),
        ReconnectPolicy::new(u64::from(config.feed.reconnect_backoff_ms)),
    );

    let http = StatusHttpServer::new(HttpListener::new(
        stack,
        HTTP_RX.init([0; HTTP_RX_SIZE]),
        HTTP_TX.init([0; HTTP_TX_SIZE]),
        &config.http,
    ));
    info!("HTTP server started on port {}", config.http.port);

    let throttle = RenderThrottle::new(u64::from(config.display.render_interval_ms));
    let monitor = LinkMonitor::new(stack, control, config.network);

    let mut refresh = RefreshLoop::new(clock, feed, http, face, monitor, throttle);

    info!("Entering main loop");
    refresh.run_forever(&Uptime).await
}
