//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  STARTING ──[sensor ok]──▶ VOTING_MODE ◀──[outcome set]── PROCESSING
//!     │                          │                              ▲
//!     │                          └────────[voter matched]───────┘
//!     └──[sensor missing]──▶ HALTED (terminal)
//! ```
//!
//! Handlers never touch hardware.  They queue [`FeedbackCommand`]s that
//! the application service plays out after the step.

use super::context::{FeedbackCommand, FsmContext};
use super::{StateDescriptor, StateId};
use crate::app::ports::Beep;
use crate::app::screens::Screen;
use log::{error, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Starting
        StateDescriptor {
            id: StateId::Starting,
            name: "Starting",
            on_enter: None,
            on_exit: None,
            on_update: starting_update,
        },
        // Index 1 — VotingMode
        StateDescriptor {
            id: StateId::VotingMode,
            name: "VotingMode",
            on_enter: Some(voting_enter),
            on_exit: None,
            on_update: voting_update,
        },
        // Index 2 — Processing
        StateDescriptor {
            id: StateId::Processing,
            name: "Processing",
            on_enter: Some(processing_enter),
            on_exit: Some(processing_exit),
            on_update: processing_update,
        },
        // Index 3 — Halted
        StateDescriptor {
            id: StateId::Halted,
            name: "Halted",
            on_enter: Some(halted_enter),
            on_exit: None,
            on_update: halted_update,
        },
    ]
}

/// Queue the idle banner plus its short beep.
///
/// Used on every entry into voting mode and whenever the loop re-arms
/// after a message, so the beep sounds on every redraw.
pub fn request_idle(ctx: &mut FsmContext) {
    ctx.request(FeedbackCommand::Show(Screen::Idle));
    ctx.request(FeedbackCommand::Beep(Beep::Short));
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING
// ═══════════════════════════════════════════════════════════════════════════

fn starting_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.sensor_ready {
        Some(true) => {
            ctx.request(FeedbackCommand::Show(Screen::Boot));
            ctx.request(FeedbackCommand::Hold(ctx.timing.startup_ms));
            Some(StateId::VotingMode)
        }
        Some(false) => Some(StateId::Halted),
        None => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  VOTING MODE
// ═══════════════════════════════════════════════════════════════════════════

fn voting_enter(ctx: &mut FsmContext) {
    request_idle(ctx);
}

fn voting_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.voter.map(|_| StateId::Processing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PROCESSING
// ═══════════════════════════════════════════════════════════════════════════

fn processing_enter(ctx: &mut FsmContext) {
    if let Some(voter) = ctx.voter {
        info!("Processing vote for {}", voter);
        ctx.request(FeedbackCommand::Show(Screen::Processing(voter)));
    }
}

fn processing_update(ctx: &mut FsmContext) -> Option<StateId> {
    let outcome = ctx.outcome?;
    if outcome.is_success() {
        ctx.request(FeedbackCommand::Show(Screen::VoteAccepted));
        ctx.request(FeedbackCommand::Beep(Beep::Short));
    } else {
        ctx.request(FeedbackCommand::Show(Screen::VoteFailed));
        ctx.request(FeedbackCommand::Beep(Beep::Error));
    }
    ctx.request(FeedbackCommand::Hold(ctx.timing.result_ms));
    Some(StateId::VotingMode)
}

fn processing_exit(ctx: &mut FsmContext) {
    ctx.voter = None;
    ctx.outcome = None;
}

// ═══════════════════════════════════════════════════════════════════════════
//  HALTED (no way out)
// ═══════════════════════════════════════════════════════════════════════════

fn halted_enter(ctx: &mut FsmContext) {
    error!("Fingerprint sensor not found, halting");
    ctx.request(FeedbackCommand::Show(Screen::SensorError));
}

fn halted_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}
