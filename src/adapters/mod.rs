//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                      | Connects to              |
//! |-------------|---------------------------------|--------------------------|
//! | `hardware`  | BiometricPort, FeedbackPort,    | AS608, LCD, buzzer       |
//! |             | ClockPort                       |                          |
//! | `time`      | ClockPort                       | ESP32 system timer       |
//! | `wifi`      | ConnectivityPort                | ESP-IDF WiFi STA         |
//! | `http`      | HttpPort (+ ConnectivityPort)   | ESP-IDF HTTP client      |
//! | `log_sink`  | EventSink                       | Serial log output        |
//! | `uart`      | Transport                       | ESP-IDF UART driver      |
//! | `device_id` | —                               | eFuse factory MAC        |

pub mod device_id;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
pub mod wifi;
