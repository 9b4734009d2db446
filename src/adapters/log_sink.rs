//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`] as one
//! pipe-separated line to the ESP-IDF logger (UART console in production),
//! so an operator tailing the console can follow the polling session.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::protocol::submission::SubmissionOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    votes_accepted: u32,
    votes_failed: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted submissions since boot.
    pub fn votes_accepted(&self) -> u32 {
        self.votes_accepted
    }

    /// Failed submissions since boot (offline, rejected or transport).
    pub fn votes_failed(&self) -> u32 {
        self.votes_failed
    }
}

fn outcome_label(outcome: &SubmissionOutcome) -> &'static str {
    match outcome {
        SubmissionOutcome::Accepted { .. } => "accepted",
        SubmissionOutcome::Rejected { .. } => "rejected",
        SubmissionOutcome::Offline => "offline",
        SubmissionOutcome::TransportFailed => "transport-failed",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::SensorMissing(e) => {
                error!("SENSOR | handshake failed: {}", e);
            }
            AppEvent::RateLimited { votes_this_minute } => {
                warn!("RATE | ceiling reached, votes_this_minute={}", votes_this_minute);
            }
            AppEvent::AccessDenied => {
                warn!("DENIED | fingerprint not enrolled");
            }
            AppEvent::ScanFault(e) => {
                warn!("SCAN | {}", e);
            }
            AppEvent::VoteSubmitted { voter, outcome } => {
                if outcome.is_success() {
                    self.votes_accepted = self.votes_accepted.saturating_add(1);
                } else {
                    self.votes_failed = self.votes_failed.saturating_add(1);
                }
                let status = match outcome {
                    SubmissionOutcome::Accepted { status } | SubmissionOutcome::Rejected { status } => *status,
                    _ => 0,
                };
                info!(
                    "VOTE | voter={} | result={} | http={} | accepted={} failed={}",
                    voter,
                    outcome_label(outcome),
                    status,
                    self.votes_accepted,
                    self.votes_failed,
                );
            }
            AppEvent::WindowReset => {
                info!("WINDOW | rate window reset");
            }
        }
    }
}
