//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::BiometricError;
use crate::fsm::StateId;
use crate::protocol::VoterIdentity;
use crate::protocol::submission::SubmissionOutcome;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Sensor handshake failed at boot; the terminal halts.
    SensorMissing(BiometricError),

    /// Scan skipped: minute ceiling reached.
    RateLimited { votes_this_minute: u32 },

    /// A print was captured but is not enrolled.
    AccessDenied,

    /// Capture, conversion or search failed; the loop carries on.
    ScanFault(BiometricError),

    /// A matched vote went through the submission protocol.
    VoteSubmitted {
        voter: VoterIdentity,
        outcome: SubmissionOutcome,
    },

    /// The one-minute rate window rolled over.
    WindowReset,
}
