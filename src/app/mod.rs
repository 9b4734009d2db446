//! Application core — pure domain logic, zero I/O.
//!
//! The polling-station rules live here: FSM orchestration, rate limiting
//! and vote submission.  All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod screens;
pub mod service;
