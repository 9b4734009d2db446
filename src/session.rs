//! Voting session counters, rate limiting and the single scan attempt.
//!
//! Counters are a plain value owned by the application service.  The
//! one-minute window resets lazily: [`SessionCounters::roll_window`] is
//! called once per loop iteration and only then looks at the clock.

use crate::app::ports::{BiometricPort, TemplateBuffer};
use crate::config::StationConfig;
use crate::error::BiometricError;
use crate::protocol::VoterIdentity;

/// Length of the rate-limit window.
pub const RATE_WINDOW_MS: u64 = 60_000;

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Accepted votes since `minute_started_ms`.
    pub votes_this_minute: u32,
    /// Time of the last accepted vote.  `None` until the first one.
    pub last_vote_ms: Option<u64>,
    /// Start of the current rate-limit window.
    pub minute_started_ms: u64,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh window once a full minute has elapsed.
    /// Returns `true` if the counter was reset.
    pub fn roll_window(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.minute_started_ms) >= RATE_WINDOW_MS {
            self.votes_this_minute = 0;
            self.minute_started_ms = now_ms;
            return true;
        }
        false
    }

    /// Account for an accepted vote.  Failed submissions never call this.
    pub fn record_success(&mut self, now_ms: u64) {
        self.votes_this_minute = self.votes_this_minute.saturating_add(1);
        self.last_vote_ms = Some(now_ms);
    }
}

// ---------------------------------------------------------------------------
// Rate limit gate
// ---------------------------------------------------------------------------

/// Verdict of the pre-capture checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Scan may proceed.
    Open,
    /// Minute ceiling reached.
    RateLimited,
    /// Too soon after the last accepted vote.
    CoolingDown { remaining_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_votes_per_minute: u32,
    pub cooldown_ms: u64,
}

impl RateLimitPolicy {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            max_votes_per_minute: config.max_votes_per_minute,
            cooldown_ms: u64::from(config.vote_cooldown_ms),
        }
    }

    /// Ceiling first, then cooldown.
    pub fn gate(&self, counters: &SessionCounters, now_ms: u64) -> Gate {
        if counters.votes_this_minute >= self.max_votes_per_minute {
            return Gate::RateLimited;
        }
        if let Some(last) = counters.last_vote_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.cooldown_ms {
                return Gate::CoolingDown {
                    remaining_ms: self.cooldown_ms - elapsed,
                };
            }
        }
        Gate::Open
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Result of one non-blocking capture → convert → search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    NoFinger,
    /// Image capture or template conversion failed.
    CaptureFailed(BiometricError),
    /// Search completed; the print is not enrolled.
    NoMatch,
    SearchFailed(BiometricError),
    Matched(VoterIdentity),
}

/// One capture attempt against the sensor.  Returns immediately when no
/// finger is present.
pub fn scan(sensor: &mut impl BiometricPort) -> ScanOutcome {
    match sensor.capture_image() {
        Ok(()) => {}
        Err(BiometricError::NoFinger) => return ScanOutcome::NoFinger,
        Err(e) => return ScanOutcome::CaptureFailed(e),
    }
    if let Err(e) = sensor.image_to_template(TemplateBuffer::One) {
        return ScanOutcome::CaptureFailed(e);
    }
    match sensor.search() {
        Ok(Some(voter)) => ScanOutcome::Matched(voter),
        Ok(None) => ScanOutcome::NoMatch,
        Err(e) => ScanOutcome::SearchFailed(e),
    }
}
