//! Build script for chroma-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates device.toml at compile time
//! - Embeds the validated configuration as a postcard blob

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chroma_core::config::DeviceConfig;

/// Credentials can be kept out of device.toml with these
const SSID_ENV: &str = "CHROMA_WIFI_SSID";
const PASSWORD_ENV: &str = "CHROMA_WIFI_PASSWORD";

fn main() {
    setup_linker();
    embed_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse device.toml, validate it and write the postcard blob to OUT_DIR
fn embed_config() {
    println!("cargo:rerun-if-changed=device.toml");
    println!("cargo:rerun-if-env-changed={}", SSID_ENV);
    println!("cargo:rerun-if-env-changed={}", PASSWORD_ENV);

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file.         ║\n\
            ║  Please create one in the chroma-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Unknown keys fall back to their defaults via serde(default)
    let mut config: DeviceConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid device.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    apply_env_overrides(&mut config);

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            ║  • {:<62} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format!("{:?}", e)
        );
    }

    if config.network.ssid.is_empty() {
        println!(
            "cargo:warning=No Wi-Fi SSID configured; set [network] ssid or {}",
            SSID_ENV
        );
    }

    let bytes = postcard::to_allocvec(&config).unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.bin"), bytes).unwrap();

    println!("cargo:warning=device.toml validated successfully");
}

/// Replace credentials from the environment when set
fn apply_env_overrides(config: &mut DeviceConfig) {
    if let Ok(ssid) = env::var(SSID_ENV) {
        config.network.ssid.clear();
        if config.network.ssid.push_str(&ssid).is_err() {
            panic!("{} is longer than {} bytes", SSID_ENV, config.network.ssid.capacity());
        }
    }

    if let Ok(password) = env::var(PASSWORD_ENV) {
        config.network.password.clear();
        if config.network.password.push_str(&password).is_err() {
            panic!(
                "{} is longer than {} bytes",
                PASSWORD_ENV,
                config.network.password.capacity()
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
