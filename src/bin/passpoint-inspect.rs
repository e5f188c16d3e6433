//! Decode a parcel-encoded Passpoint configuration and print it as JSON.
//!
//! Usage:
//!   passpoint-inspect <file>
//!
//! Decoder limits can be raised or lowered through the environment:
//!   PASSPOINT_MAX_ARRAY_LEN, PASSPOINT_MAX_STRING_LEN, PASSPOINT_MAX_BYTE_ARRAY_LEN
//!
//! Passwords and private key bytes are never printed.

use log::{debug, error, info, warn};
use passpoint_config::{Parcelable, ParcelLimits, PasspointConfiguration};
use std::process::exit;

/// Read a limit override from the environment, falling back to `default`.
fn limit_from_env(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(value) => match value.trim().parse() {
            Ok(limit) => limit,
            Err(e) => {
                warn!("Ignoring {}={:?}: {}", name, value, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn limits_from_env() -> ParcelLimits {
    let defaults = ParcelLimits::default();
    ParcelLimits {
        max_array_len: limit_from_env("PASSPOINT_MAX_ARRAY_LEN", defaults.max_array_len),
        max_string_len: limit_from_env("PASSPOINT_MAX_STRING_LEN", defaults.max_string_len),
        max_byte_array_len: limit_from_env(
            "PASSPOINT_MAX_BYTE_ARRAY_LEN",
            defaults.max_byte_array_len,
        ),
    }
}

fn log_summary(config: &PasspointConfiguration) {
    match &config.home_sp {
        Some(home_sp) => info!(
            "HomeSP: fqdn={} friendly_name={}",
            home_sp.fqdn.as_deref().unwrap_or("(none)"),
            home_sp.friendly_name.as_deref().unwrap_or("(none)")
        ),
        None => info!("HomeSP: (none)"),
    }

    let Some(credential) = &config.credential else {
        info!("Credential: (none)");
        return;
    };
    let kinds: Vec<&str> = [
        credential.user_credential.as_ref().map(|_| "user"),
        credential.cert_credential.as_ref().map(|_| "certificate"),
        credential.sim_credential.as_ref().map(|_| "sim"),
    ]
    .into_iter()
    .flatten()
    .collect();
    info!(
        "Credential: realm={} kinds=[{}]",
        credential.realm.as_deref().unwrap_or("(none)"),
        kinds.join(", ")
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage:");
        eprintln!("  passpoint-inspect <file>");
        exit(1);
    };

    let limits = limits_from_env();
    debug!("Decoder limits: {:?}", limits);

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            exit(1);
        }
    };
    info!("Read {} bytes from {}", bytes.len(), path);

    let config = match PasspointConfiguration::from_parcel_bytes_with_limits(&bytes, limits) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to decode Passpoint configuration: {}", e);
            exit(1);
        }
    };
    log_summary(&config);

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to render configuration: {}", e);
            exit(1);
        }
    }
}
