//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: the boot probe result, the voter currently being processed, the
//! submission outcome, and the queue of feedback commands that the
//! application service plays out after each FSM step.

use crate::app::ports::Beep;
use crate::app::screens::Screen;
use crate::config::StationConfig;
use crate::protocol::VoterIdentity;
use crate::protocol::submission::SubmissionOutcome;

// ---------------------------------------------------------------------------
// Feedback commands (written by state handlers; played out by the service)
// ---------------------------------------------------------------------------

/// One step of user-visible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCommand {
    Show(Screen),
    Beep(Beep),
    /// Keep the current display for this many milliseconds.
    Hold(u32),
}

/// Upper bound on commands queued by one step (result + hold + idle re-arm).
pub const FEEDBACK_QUEUE_LEN: usize = 8;

/// Pause lengths the handlers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackTiming {
    pub startup_ms: u32,
    pub message_ms: u32,
    pub result_ms: u32,
}

impl FeedbackTiming {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            startup_ms: config.startup_delay_ms,
            message_ms: config.message_display_ms,
            result_ms: config.result_display_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    /// Sensor handshake result.  `None` until boot has probed it.
    pub sensor_ready: Option<bool>,

    /// Identity matched this iteration; set by the service, cleared on
    /// leaving `Processing`.
    pub voter: Option<VoterIdentity>,

    /// Submission result for `voter`.
    pub outcome: Option<SubmissionOutcome>,

    /// Feedback to play out after the current step, in order.
    pub commands: heapless::Vec<FeedbackCommand, FEEDBACK_QUEUE_LEN>,

    pub timing: FeedbackTiming,
}

impl FsmContext {
    pub fn new(timing: FeedbackTiming) -> Self {
        Self {
            sensor_ready: None,
            voter: None,
            outcome: None,
            commands: heapless::Vec::new(),
            timing,
        }
    }

    /// Queue a feedback command.  A full queue drops the command.
    pub fn request(&mut self, cmd: FeedbackCommand) {
        if self.commands.push(cmd).is_err() {
            log::warn!("Feedback queue full, dropped {:?}", cmd);
        }
    }

    /// Take every queued command, leaving the queue empty.
    pub fn drain_commands(&mut self) -> heapless::Vec<FeedbackCommand, FEEDBACK_QUEUE_LEN> {
        core::mem::take(&mut self.commands)
    }
}
