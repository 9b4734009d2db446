//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`].  The link is brought up once at boot
//! with a bounded wait; after that the domain only asks whether it is up.
//! A failed or timed-out connect is logged and the terminal keeps running,
//! so submissions report `Offline` until the radio associates.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi`, attached from
//!   `main` with the modem peripheral.
//! - **all other targets**: an in-memory link for host-side tests.

use log::{error, info, warn};

use crate::app::ports::ConnectivityPort;
use crate::error::ConnectivityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Poll interval while waiting for the station to come up.
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u32 = 100;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network; otherwise WPA2 bounds.
fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    wifi: Option<esp_idf_svc::wifi::EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            timeout_ms,
            #[cfg(target_os = "espidf")]
            wifi: None,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up: false,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, wifi: esp_idf_svc::wifi::EspWifi<'static>) {
        self.wifi = Some(wifi);
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(())
    }

    /// Associate and wait up to the configured timeout for the link.
    pub fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        info!("WiFi: connecting to '{}' (timeout {} ms)", self.ssid, self.timeout_ms);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected");
                Ok(())
            }
            Err(ConnectivityError::Timeout) => {
                warn!("WiFi: not connected after {} ms, continuing offline", self.timeout_ms);
                self.state = WifiState::Failed;
                Err(ConnectivityError::Timeout)
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = WifiState::Failed;
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::hal::delay::FreeRtos;
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let wifi = self.wifi.as_mut().ok_or(ConnectivityError::NoDriver)?;
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&config)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|_| ConnectivityError::ConnectionFailed)?;
        }
        wifi.connect().map_err(|_| ConnectivityError::ConnectionFailed)?;

        let mut waited = 0;
        while waited < self.timeout_ms {
            if wifi.is_up().unwrap_or(false) {
                return Ok(());
            }
            FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += CONNECT_POLL_MS;
        }
        Err(ConnectivityError::Timeout)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_link_up = true;
        Ok(())
    }

    /// Simulation: drop or restore the link behind the adapter's back.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }
}

impl ConnectivityPort for WifiAdapter {
    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        self.wifi
            .as_ref()
            .is_some_and(|w| w.is_up().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.sim_link_up
    }
}
