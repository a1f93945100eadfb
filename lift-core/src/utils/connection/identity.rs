//! Boot-time network identity.
//!
//! Each lift announces its own access point. The SSID is the configured
//! prefix followed by four hex digits taken from bits 32..48 of the chip's
//! factory identity (the eFuse MAC on ESP32 parts).

use core::fmt::Write;

/// Maximum SSID length permitted by 802.11.
pub const SSID_CAPACITY: usize = 32;

/// Build the access point SSID for a chip.
pub fn ssid_for_chip(
    prefix: &str,
    chip_id: u64,
) -> heapless::String<SSID_CAPACITY> {
    let mut ssid = heapless::String::new();
    if write!(ssid, "{}-{:04x}", prefix, chip_suffix(chip_id)).is_err() {
        tracing::warn!(prefix, "SSID prefix too long, truncated");
    }
    ssid
}

/// Part of `ssid` after `prefix` and its separator, as shown on the status
/// surface. An SSID without the prefix is returned whole.
pub fn ssid_suffix<'a>(
    ssid: &'a str,
    prefix: &str,
) -> &'a str {
    ssid.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(ssid)
}

/// The 16 identity bits shown in the SSID.
pub const fn chip_suffix(chip_id: u64) -> u16 {
    (chip_id >> 32) as u16
}
