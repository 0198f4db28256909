//! Embedded configuration loader

use defmt::*;

use chroma_core::config::DeviceConfig;

/// Postcard-serialized `DeviceConfig` produced by the build script
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/device_config.bin"));

/// Decode the embedded configuration
///
/// Falls back to the built-in defaults if the blob does not decode or
/// fails validation, so a bad build still boots to a working clock.
pub fn load() -> DeviceConfig {
    let config = match postcard::from_bytes::<DeviceConfig>(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(_) => {
            warn!("Embedded config did not decode, using defaults");
            return DeviceConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        warn!("Embedded config invalid ({}), using defaults", e);
        return DeviceConfig::default();
    }

    info!(
        "Config: ssid={} hostname={} ntp={} broker={}:{}",
        config.network.ssid.as_str(),
        config.network.hostname.as_str(),
        config.time.server.as_str(),
        config.feed.broker.as_str(),
        config.feed.port
    );

    config
}
