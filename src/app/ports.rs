//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (fingerprint sensor, LCD + buzzer, WiFi, HTTP client,
//! event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) and the enrollment
//! [`BridgeEngine`](crate::bridge::engine::BridgeEngine) consume them via
//! generics, so the domain core never touches hardware directly.

use crate::error::{BiometricError, HttpError};
use crate::protocol::VoterIdentity;

// ───────────────────────────────────────────────────────────────
// Biometric port (driven adapter: fingerprint sensor ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Sensor-side character buffer a converted image is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBuffer {
    One = 1,
    Two = 2,
}

/// Capture, convert, enroll and search against the sensor's template library.
///
/// Every call is a single sensor round trip and returns promptly; waiting
/// for a finger is the caller's loop.
pub trait BiometricPort {
    /// Handshake with the sensor.  Fails when it is absent or miswired.
    fn verify_sensor(&mut self) -> Result<(), BiometricError>;

    /// Take one image.  `Err(NoFinger)` is the normal idle answer.
    fn capture_image(&mut self) -> Result<(), BiometricError>;

    /// Convert the last image into a feature template in `buffer`.
    fn image_to_template(&mut self, buffer: TemplateBuffer) -> Result<(), BiometricError>;

    /// Search the library for the template in buffer one.
    ///
    /// `Ok(None)` means the search completed without a match.
    fn search(&mut self) -> Result<Option<VoterIdentity>, BiometricError>;

    /// Combine both template buffers into an enrollment model.
    fn create_model(&mut self) -> Result<(), BiometricError>;

    /// Persist the model into library slot `slot`.
    fn store_model(&mut self, slot: u16) -> Result<(), BiometricError>;

    /// Erase every stored template.
    fn clear_templates(&mut self) -> Result<(), BiometricError>;
}

// ───────────────────────────────────────────────────────────────
// Feedback port (driven adapter: domain → LCD + buzzer)
// ───────────────────────────────────────────────────────────────

/// The three fixed buzzer pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beep {
    /// Success / idle re-arm.
    Short,
    /// Vote failure.
    Error,
    /// Access denied.
    Long,
}

/// Row-addressable text display plus a single-level buzzer.
///
/// Display faults are logged by the adapter and never reach the domain.
pub trait FeedbackPort {
    /// Blank the whole display.
    fn clear(&mut self);

    /// Blank `row`, then write `text` truncated to the display width.
    /// Out-of-range rows are clamped to the nearest valid row.
    fn show(&mut self, row: u8, text: &str);

    /// Sound one pulse.  Blocks for the pulse length.
    fn beep(&mut self, beep: Beep);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic device clock plus blocking delays.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block the control loop for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapters: domain → WiFi / HTTP client)
// ───────────────────────────────────────────────────────────────

/// Reports the binary link state.  Establishing the link happens at boot,
/// outside the domain.
pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;
}

/// A received HTTP response.  Any status, even 5xx, is a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// One blocking HTTP POST, bounded only by the client's own timeout.
pub trait HttpPort {
    fn post(&mut self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
