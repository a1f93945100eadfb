//! Runtime configuration for the lift firmware.
//!
//! Every field has a default matching the shipped board, so an empty JSON
//! object (or no config at all) yields a working controller.

use serde::Deserialize;

/// UDP port the command socket listens on.
pub const DEFAULT_PORT: u16 = 35037;
/// Grace window applied to network speed commands until reconfigured.
pub const DEFAULT_TIMEOUT_MS: i32 = 500;
/// Grace window applied while a button is held.
pub const BUTTON_GRACE_MS: u32 = 10;
/// Minimum spacing between status refreshes.
pub const STATUS_INTERVAL_MS: u32 = 100;
/// Sleep taken by a cycle that handled neither a button nor a datagram.
pub const IDLE_SLEEP_MS: u32 = 10;

/// Lift configuration, loadable from JSON on hosts that have a filesystem.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LiftConfig {
    /// UDP port for the command protocol.
    pub port: u16,
    /// Initial value of the configured timeout window (ms).
    pub default_timeout_ms: i32,
    /// Short grace period used for button overrides (ms).
    pub button_grace_ms: u32,
    pub status_interval_ms: u32,
    pub idle_sleep_ms: u32,
    /// Access point address.
    pub address: [u8; 4],
    pub gateway: [u8; 4],
    pub prefix_len: u8,
    /// Prefix of the SSID; the hardware identity is appended.
    pub ssid_prefix: heapless::String<20>,
}

impl Default for LiftConfig {
    fn default() -> Self {
        let mut ssid_prefix = heapless::String::new();
        // fits the 20 byte capacity
        let _ = ssid_prefix.push_str("nature40-liftsystem");

        Self {
            port: DEFAULT_PORT,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            button_grace_ms: BUTTON_GRACE_MS,
            status_interval_ms: STATUS_INTERVAL_MS,
            idle_sleep_ms: IDLE_SLEEP_MS,
            address: [192, 168, 3, 254],
            gateway: [192, 168, 3, 254],
            prefix_len: 24,
            ssid_prefix,
        }
    }
}
