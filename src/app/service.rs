//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, the session counters, the rate-limit
//! policy and the vote submitter.  All I/O flows through port traits
//! injected at call sites, so the whole voting loop runs against mocks.
//!
//! ```text
//!  BiometricPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  ClockPort     ──▶ │        AppService        │
//!  FeedbackPort  ◀── │ FSM · Session · Submitter│ ──▶ ConnectivityPort + HttpPort
//!                    └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::StationConfig;
use crate::fsm::context::{FeedbackCommand, FeedbackTiming, FsmContext};
use crate::fsm::states::{build_state_table, request_idle};
use crate::fsm::{Fsm, StateId};
use crate::protocol::VoterIdentity;
use crate::protocol::submission::{SubmissionOutcome, VoteSubmitter};
use crate::session::{self, Gate, RateLimitPolicy, ScanOutcome, SessionCounters};

use super::events::AppEvent;
use super::ports::{BiometricPort, Beep, ClockPort, ConnectivityPort, EventSink, FeedbackPort, HttpPort};
use super::screens::Screen;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    session: SessionCounters,
    policy: RateLimitPolicy,
    submitter: VoteSubmitter,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) and then
    /// [`boot`](Self::boot).
    pub fn new(config: &StationConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Starting),
            ctx: FsmContext::new(FeedbackTiming::from_config(config)),
            session: SessionCounters::new(),
            policy: RateLimitPolicy::from_config(config),
            submitter: VoteSubmitter::from_config(config),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    /// Probe the fingerprint sensor and leave `Starting`.
    ///
    /// On success shows the boot screen, waits the startup delay and arms
    /// the idle screen.  On failure shows the sensor error and halts for
    /// good.  Returns the resulting state.
    pub fn boot(
        &mut self,
        io: &mut (impl BiometricPort + FeedbackPort + ClockPort),
        sink: &mut impl EventSink,
    ) -> StateId {
        match io.verify_sensor() {
            Ok(()) => {
                info!("Fingerprint sensor found");
                self.ctx.sensor_ready = Some(true);
            }
            Err(e) => {
                sink.emit(&AppEvent::SensorMissing(e));
                self.ctx.sensor_ready = Some(false);
            }
        }
        self.step(sink);
        self.apply_feedback(io);
        self.fsm.current_state()
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the voting loop.
    ///
    /// Order: window roll → ceiling → cooldown → capture → submit.  The
    /// submission blocks for the full HTTP round trip.
    pub fn tick(
        &mut self,
        io: &mut (impl BiometricPort + FeedbackPort + ClockPort),
        net: &mut (impl ConnectivityPort + HttpPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        let now = io.now_ms();
        if self.session.roll_window(now) {
            sink.emit(&AppEvent::WindowReset);
        }

        if self.fsm.current_state() != StateId::VotingMode {
            return;
        }

        match self.policy.gate(&self.session, now) {
            Gate::Open => {}
            Gate::RateLimited => {
                sink.emit(&AppEvent::RateLimited {
                    votes_this_minute: self.session.votes_this_minute,
                });
                self.ctx.request(FeedbackCommand::Show(Screen::RateLimited));
                self.ctx.request(FeedbackCommand::Hold(self.ctx.timing.message_ms));
                request_idle(&mut self.ctx);
                self.apply_feedback(io);
                return;
            }
            Gate::CoolingDown { .. } => return,
        }

        match session::scan(io) {
            ScanOutcome::NoFinger => {}
            ScanOutcome::CaptureFailed(e) => {
                warn!("Fingerprint capture failed: {}", e);
                sink.emit(&AppEvent::ScanFault(e));
            }
            ScanOutcome::SearchFailed(e) => {
                warn!("Fingerprint search failed: {}", e);
                sink.emit(&AppEvent::ScanFault(e));
            }
            ScanOutcome::NoMatch => {
                sink.emit(&AppEvent::AccessDenied);
                self.ctx.request(FeedbackCommand::Show(Screen::AccessDenied));
                self.ctx.request(FeedbackCommand::Beep(Beep::Long));
                self.ctx.request(FeedbackCommand::Hold(self.ctx.timing.message_ms));
                request_idle(&mut self.ctx);
                self.apply_feedback(io);
            }
            ScanOutcome::Matched(voter) => self.process_vote(voter, io, net, sink),
        }
    }

    /// Redraw the idle screen (with its beep), e.g. after the enrollment
    /// bridge has used the display.
    pub fn rearm(&mut self, io: &mut (impl FeedbackPort + ClockPort)) {
        if self.fsm.current_state() == StateId::VotingMode {
            request_idle(&mut self.ctx);
            self.apply_feedback(io);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn session(&self) -> &SessionCounters {
        &self.session
    }

    /// Loop iterations executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn process_vote(
        &mut self,
        voter: VoterIdentity,
        io: &mut (impl FeedbackPort + ClockPort),
        net: &mut (impl ConnectivityPort + HttpPort),
        sink: &mut impl EventSink,
    ) {
        self.ctx.voter = Some(voter);
        self.step(sink);
        self.apply_feedback(io);

        let outcome = self.submitter.submit(voter, io.now_ms(), net);
        if outcome.is_success() {
            self.session.record_success(io.now_ms());
        }
        log_outcome(voter, outcome);
        sink.emit(&AppEvent::VoteSubmitted { voter, outcome });

        self.ctx.outcome = Some(outcome);
        self.step(sink);
        self.apply_feedback(io);
    }

    /// Step the FSM once and report a state change.
    fn step(&mut self, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        let to = self.fsm.step(&mut self.ctx);
        if from != to {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }

    /// Play queued feedback commands through the ports, in order.
    fn apply_feedback(&mut self, io: &mut (impl FeedbackPort + ClockPort)) {
        for cmd in self.ctx.drain_commands() {
            match cmd {
                FeedbackCommand::Show(screen) => screen.render(io),
                FeedbackCommand::Beep(beep) => io.beep(beep),
                FeedbackCommand::Hold(ms) => io.delay_ms(ms),
            }
        }
    }
}

fn log_outcome(voter: VoterIdentity, outcome: SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Accepted { status } => info!("Vote for {} recorded (HTTP {})", voter, status),
        SubmissionOutcome::Rejected { status } => warn!("Vote for {} rejected (HTTP {})", voter, status),
        SubmissionOutcome::Offline => warn!("Vote for {} failed: offline", voter),
        SubmissionOutcome::TransportFailed => warn!("Vote for {} failed: transport error", voter),
    }
}
