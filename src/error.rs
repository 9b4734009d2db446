//! Unified error types for the BioVote firmware.
//!
//! Each subsystem owns a small `Copy` error enum with a `Display` impl;
//! all of them convert into the top-level [`Error`] so the boot path can
//! report failures uniformly.  None of these errors escalate to a halt
//! except a missing fingerprint sensor at boot.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The fingerprint sensor rejected a command or did not answer.
    Biometric(BiometricError),
    /// The display bus failed.
    Display(DisplayError),
    /// The network link could not be brought up.
    Connectivity(ConnectivityError),
    /// An HTTP exchange with the backend failed below the status-code level.
    Http(HttpError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Biometric(e) => write!(f, "biometric: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Biometric errors
// ---------------------------------------------------------------------------

/// Outcomes of a fingerprint-sensor command other than plain success.
///
/// `NoFinger` is the normal idle answer of a capture poll and is not
/// logged as a fault by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricError {
    /// No finger on the sensor window.
    NoFinger,
    /// The sensor did not answer, or answered with a malformed packet.
    Communication,
    /// Image capture failed.
    ImageFailed,
    /// Image too messy / too few feature points to build a template.
    FeatureFailed,
    /// The two enrollment captures do not belong to the same finger.
    EnrollMismatch,
    /// Template slot outside the sensor library.
    BadLocation,
    /// Flash write on the sensor failed.
    FlashError,
    /// Template library could not be erased.
    ClearFailed,
    /// Handshake password rejected.
    WrongPassword,
    /// No finger arrived (or left) before the wait deadline.
    Timeout,
    /// Confirmation code this firmware does not know.
    Unexpected(u8),
}

impl fmt::Display for BiometricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFinger => write!(f, "no finger detected"),
            Self::Communication => write!(f, "sensor communication error"),
            Self::ImageFailed => write!(f, "image capture failed"),
            Self::FeatureFailed => write!(f, "feature extraction failed"),
            Self::EnrollMismatch => write!(f, "enrollment captures do not match"),
            Self::BadLocation => write!(f, "template slot out of range"),
            Self::FlashError => write!(f, "sensor flash write failed"),
            Self::ClearFailed => write!(f, "template library erase failed"),
            Self::WrongPassword => write!(f, "sensor password rejected"),
            Self::Timeout => write!(f, "timed out waiting for finger"),
            Self::Unexpected(code) => write!(f, "unexpected confirmation code 0x{code:02X}"),
        }
    }
}

impl From<BiometricError> for Error {
    fn from(e: BiometricError) -> Self {
        Self::Biometric(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// I²C write to the LCD backpack failed.
    Bus,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "LCD bus write failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Connectivity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// No radio driver attached (host simulation without a link).
    NoDriver,
    ConnectionFailed,
    /// Association did not complete within the configured wait.
    Timeout,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::NoDriver => write!(f, "no WiFi driver attached"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::Timeout => write!(f, "WiFi connect timed out"),
        }
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

// ---------------------------------------------------------------------------
// HTTP errors
// ---------------------------------------------------------------------------

/// Failures below the status-code level; any received status, even 500,
/// is a response and not an `HttpError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// Connection could not be opened (DNS, TCP, client init).
    Connect(i32),
    /// Request headers or body could not be sent.
    Send(i32),
    /// Response could not be read.
    Receive(i32),
    /// The payload could not be serialised.
    Encode,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(rc) => write!(f, "connect failed (rc={rc})"),
            Self::Send(rc) => write!(f, "request send failed (rc={rc})"),
            Self::Receive(rc) => write!(f, "response read failed (rc={rc})"),
            Self::Encode => write!(f, "payload encoding failed"),
        }
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for [`StationConfig`](crate::config::StationConfig).
    Malformed,
    /// A field failed validation.  The string names the field and rule.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config document malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl core::error::Error for Error {}
impl core::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
