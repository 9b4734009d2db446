//! Terminal identity.
//!
//! The payload's device field comes from configuration.  When that is
//! left empty the terminal falls back to `VT-XXYYZZ`, built from the last
//! three bytes of the factory MAC, so two unconfigured terminals never
//! report the same id.

use core::fmt::Write;

use log::info;

use crate::config::StationConfig;

pub type DeviceIdString = heapless::String<16>;

pub type MacAddress = [u8; 6];

/// Factory MAC from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: fixed MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x24, 0x6F, 0x28, 0x1A, 0x2B, 0x3C]
}

/// `VT-XXYYZZ` from the last three MAC bytes.
pub fn mac_device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    // 9 chars always fit.
    let _ = write!(id, "VT-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// Fill in `config.device_id` from the MAC when it is blank.
/// Returns the id in effect.
pub fn resolve_device_id(config: &mut StationConfig, mac: &MacAddress) -> String {
    if config.device_id.trim().is_empty() {
        config.device_id = mac_device_id(mac).as_str().into();
        info!("Device id derived from MAC: {}", config.device_id);
    }
    config.device_id.clone()
}
