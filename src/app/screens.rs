//! Fixed display layouts.
//!
//! Voting-loop messages occupy rows 2 and 3 under the idle banner; the
//! idle and boot screens redraw from a clear display.  Enrollment-bridge
//! prompts clear the display and use row 0 only.

use super::ports::FeedbackPort;
use crate::protocol::VoterIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sensor found, about to enter voting mode.
    Boot,
    /// Sensor handshake failed.
    SensorError,
    /// Idle banner, waiting for a finger.
    Idle,
    RateLimited,
    AccessDenied,
    Processing(VoterIdentity),
    VoteAccepted,
    VoteFailed,

    // Enrollment bridge
    PlaceFinger,
    RemoveFinger,
    SameFinger,
    Enrolled,
    EnrollFailed,
    Verified,
    NoMatch,
    ClearingDb,
    BridgeReady,
}

impl Screen {
    pub fn render(self, out: &mut impl FeedbackPort) {
        match self {
            Self::Boot => {
                out.clear();
                out.show(0, "System Ready");
                out.show(1, "Starting voting mode...");
            }
            Self::SensorError => {
                out.clear();
                out.show(0, "Sensor Error!");
                out.show(1, "Check connections");
            }
            Self::Idle => {
                out.clear();
                out.show(0, "=== VOTING MODE ===");
                out.show(1, "Place finger to vote");
                out.show(2, "System is ready");
                out.show(3, "Waiting for voter...");
            }
            Self::RateLimited => lower(out, "Rate limit exceeded", "Please wait..."),
            Self::AccessDenied => lower(out, "Access Denied!", "Print not found"),
            Self::Processing(voter) => {
                let line = format!("Voter ID: {voter}");
                lower(out, &line, "Processing vote...");
            }
            Self::VoteAccepted => lower(out, "Vote Cast Successfully!", "Thank you for voting!"),
            Self::VoteFailed => lower(out, "Vote Failed!", "Please try again"),

            Self::PlaceFinger => prompt(out, "Place finger..."),
            Self::RemoveFinger => prompt(out, "Remove finger..."),
            Self::SameFinger => prompt(out, "Same finger..."),
            Self::Enrolled => prompt(out, "Enrolled OK!"),
            Self::EnrollFailed => prompt(out, "Enroll failed"),
            Self::Verified => prompt(out, "Verified!"),
            Self::NoMatch => prompt(out, "No match"),
            Self::ClearingDb => prompt(out, "Clearing DB..."),
            Self::BridgeReady => prompt(out, "Ready for action"),
        }
    }
}

fn lower(out: &mut impl FeedbackPort, first: &str, second: &str) {
    out.show(2, first);
    out.show(3, second);
}

fn prompt(out: &mut impl FeedbackPort, text: &str) {
    out.clear();
    out.show(0, text);
}
