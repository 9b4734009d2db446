//! BioVote terminal firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! tooling.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod protocol;
pub mod session;

// Adapters and drivers carry simulation stubs on the host so the crate
// builds and tests off-target.
pub mod adapters;
pub mod drivers;
