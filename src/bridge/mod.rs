//! Enrollment bridge — voter administration over the serial console.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Bridge stack                             │
//! │                                                              │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────────────────┐   │
//! │  │ Transport │──▶│ LineDecoder│──▶│ Engine (dispatcher)  │   │
//! │  │ (console) │   │ (\n framed)│   │ → BiometricPort      │   │
//! │  └───────────┘   └────────────┘   └──────────────────────┘   │
//! │       ▲                                       │              │
//! │       └──────────── JSON response line ◀──────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod commands;
pub mod engine;
pub mod transport;
