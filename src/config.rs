//! Station configuration parameters
//!
//! All tunable parameters for the voting terminal.  Values are fixed at
//! build time: the compiled-in defaults below, with secrets and endpoint
//! overridable through `BIOVOTE_*` environment variables when the
//! firmware is built.  A JSON override document can be parsed with
//! [`StationConfig::from_json`] for host tooling and tests.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Compiled-in value, replaced by the named build-time variable if set.
macro_rules! build_env {
    ($var:literal, $default:expr) => {
        match option_env!($var) {
            Some(v) => v,
            None => $default,
        }
    };
}

/// Log verbosity applied with `log::set_max_level` at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
        }
    }
}

/// Wire names of the vote payload keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldKeys {
    pub voter_id: String,
    pub timestamp: String,
    pub device_id: String,
    pub election_id: String,
    pub candidate_id: String,
    pub location: String,
    pub polling_station: String,
    pub vote_hash: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            voter_id: "voter_id".into(),
            timestamp: "timestamp".into(),
            device_id: "device_id".into(),
            election_id: "election_id".into(),
            candidate_id: "candidate_id".into(),
            location: "location".into(),
            polling_station: "polling_station".into(),
            vote_hash: "vote_hash".into(),
        }
    }
}

/// Core station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Upper bound on the boot-time association wait (milliseconds)
    pub wifi_timeout_ms: u32,

    // --- Backend ---
    /// Scheme + host, e.g. `http://backend.example`
    pub server_url: String,
    /// Path appended to `server_url`, e.g. `/api/vote`
    pub api_path: String,
    /// HTTP client timeout (milliseconds); the only bound on a submission
    pub http_timeout_ms: u32,
    pub use_api_key: bool,
    pub api_key_header: String,
    pub api_key: String,
    pub use_bearer_token: bool,
    pub bearer_token: String,
    /// Status codes that count as an accepted vote
    pub success_codes: heapless::Vec<u16, 8>,
    /// Also accept a vote when the body contains the key and value below
    pub parse_response_body: bool,
    pub success_response_key: String,
    pub success_response_value: String,

    // --- Vote payload ---
    pub field_keys: FieldKeys,
    pub include_election_id: bool,
    pub include_candidate_id: bool,
    pub include_location: bool,
    pub include_polling_station: bool,
    /// Declared for backend compatibility; no hash is ever computed
    pub include_vote_hash: bool,
    /// Empty means "derive from the factory MAC at boot"
    pub device_id: String,
    pub device_location: String,
    pub polling_station_id: String,
    pub election_id: String,
    pub candidate_id: String,

    // --- Rate limiting ---
    /// Accepted votes allowed per one-minute window
    pub max_votes_per_minute: u32,
    /// Minimum gap after an accepted vote before the next scan (milliseconds)
    pub vote_cooldown_ms: u32,
    /// Carried for backend parity; the submission path never retries
    pub enable_vote_retry: bool,
    pub max_retry_attempts: u8,
    pub retry_delay_ms: u32,

    // --- Display ---
    pub lcd_columns: u8,
    pub lcd_rows: u8,
    /// Pause on boot after "System Ready" (milliseconds)
    pub startup_delay_ms: u32,
    /// Pause after access-denied / rate-limit messages (milliseconds)
    pub message_display_ms: u32,
    /// Pause after a vote result message (milliseconds)
    pub result_display_ms: u32,

    // --- Audio ---
    pub beep_short_ms: u32,
    pub beep_error_ms: u32,
    pub beep_long_ms: u32,

    // --- Fingerprint sensor ---
    pub fingerprint_baudrate: u32,
    /// Finger wait bound for enrollment-bridge captures (milliseconds)
    pub fingerprint_timeout_ms: u32,

    // --- Timing ---
    /// Control loop period (milliseconds)
    pub main_loop_delay_ms: u32,

    // --- Logging ---
    pub log_level: LogLevel,
    /// Log every outgoing vote payload (contains voter ids)
    pub log_vote_data: bool,
    /// Log status and body of every backend response
    pub log_http_responses: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        let api_key = build_env!("BIOVOTE_API_KEY", "");
        let bearer_token = build_env!("BIOVOTE_BEARER_TOKEN", "");

        Self {
            // Network
            wifi_ssid: build_env!("BIOVOTE_WIFI_SSID", "YOUR_WIFI_SSID").into(),
            wifi_password: build_env!("BIOVOTE_WIFI_PASSWORD", "YOUR_WIFI_PASSWORD").into(),
            wifi_timeout_ms: 10_000,

            // Backend
            server_url: build_env!("BIOVOTE_SERVER_URL", "http://your-blockchain-server.com").into(),
            api_path: "/api/vote".into(),
            http_timeout_ms: 5_000,
            use_api_key: !api_key.is_empty(),
            api_key_header: "X-API-Key".into(),
            api_key: api_key.into(),
            use_bearer_token: !bearer_token.is_empty(),
            bearer_token: bearer_token.into(),
            success_codes: heapless::Vec::from_slice(&[200, 201, 202]).unwrap_or_default(),
            parse_response_body: false,
            success_response_key: "success".into(),
            success_response_value: "true".into(),

            // Vote payload
            field_keys: FieldKeys::default(),
            include_election_id: false,
            include_candidate_id: false,
            include_location: false,
            include_polling_station: false,
            include_vote_hash: false,
            device_id: build_env!("BIOVOTE_DEVICE_ID", "ESP32_VOTING_001").into(),
            device_location: "POLLING_STATION_A".into(),
            polling_station_id: "POLLING_STATION_A".into(),
            election_id: "ELECTION_2024".into(),
            candidate_id: "CANDIDATE_1".into(),

            // Rate limiting
            max_votes_per_minute: 60,
            vote_cooldown_ms: 1_000,
            enable_vote_retry: true,
            max_retry_attempts: 3,
            retry_delay_ms: 5_000,

            // Display (20x4 character LCD)
            lcd_columns: 20,
            lcd_rows: 4,
            startup_delay_ms: 2_000,
            message_display_ms: 2_000,
            result_display_ms: 3_000,

            // Audio
            beep_short_ms: 100,
            beep_error_ms: 200,
            beep_long_ms: 1_000,

            // Fingerprint sensor
            fingerprint_baudrate: 57_600,
            fingerprint_timeout_ms: 10_000,

            // Timing
            main_loop_delay_ms: 100, // 10 Hz

            // Logging
            log_level: LogLevel::Info,
            log_vote_data: true,
            log_http_responses: true,
        }
    }
}

impl StationConfig {
    /// Parse a JSON override document.  Missing fields keep their defaults.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Fully-qualified submission endpoint.
    pub fn endpoint_url(&self) -> String {
        let mut url = String::with_capacity(self.server_url.len() + self.api_path.len());
        url.push_str(&self.server_url);
        url.push_str(&self.api_path);
        url
    }

    /// Reject combinations the terminal cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed("server_url must start with http:// or https://"));
        }
        if self.lcd_columns == 0 || self.lcd_rows == 0 {
            return Err(ConfigError::ValidationFailed("lcd dimensions must be positive"));
        }
        if self.success_codes.is_empty() {
            return Err(ConfigError::ValidationFailed("success_codes must not be empty"));
        }
        if self.parse_response_body && self.success_response_key.is_empty() {
            return Err(ConfigError::ValidationFailed("success_response_key required when parse_response_body is set"));
        }
        if self.use_api_key && (self.api_key.is_empty() || self.api_key_header.is_empty()) {
            return Err(ConfigError::ValidationFailed("api_key and api_key_header required when use_api_key is set"));
        }
        if self.use_bearer_token && self.bearer_token.is_empty() {
            return Err(ConfigError::ValidationFailed("bearer_token required when use_bearer_token is set"));
        }
        if self.max_votes_per_minute == 0 {
            return Err(ConfigError::ValidationFailed("max_votes_per_minute must be positive"));
        }
        if self.fingerprint_baudrate == 0 {
            return Err(ConfigError::ValidationFailed("fingerprint_baudrate must be positive"));
        }
        Ok(())
    }
}
