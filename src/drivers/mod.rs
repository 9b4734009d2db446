//! Peripheral drivers: AS608 fingerprint sensor, character LCD, buzzer.
//!
//! Each driver is generic over the `embedded-hal` traits (or the byte
//! [`Transport`](crate::bridge::transport::Transport) for the sensor), so
//! the same code runs against ESP-IDF peripherals and host-side mocks.

pub mod buzzer;
pub mod fingerprint;
pub mod lcd;
