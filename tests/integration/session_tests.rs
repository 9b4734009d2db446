//! Integration tests for the voting loop: AppService → FSM → ports.
//!
//! Every scenario drives the real service against the recording mocks in
//! `mock_hw.rs` and asserts on what a voter would see and hear, what went
//! out on the wire and how the session counters moved.

use crate::mock_hw::{LogSink, MockNet, MockTerminal};

use biovote::app::events::AppEvent;
use biovote::app::ports::Beep;
use biovote::app::service::AppService;
use biovote::config::StationConfig;
use biovote::error::HttpError;
use biovote::fsm::StateId;
use biovote::protocol::submission::SubmissionOutcome;

fn booted(config: &StationConfig) -> (AppService, MockTerminal, LogSink) {
    let mut app = AppService::new(config);
    let mut io = MockTerminal::new();
    let mut sink = LogSink::new();
    app.start(&mut sink);
    assert_eq!(app.boot(&mut io, &mut sink), StateId::VotingMode);
    io.reset_record();
    (app, io, sink)
}

fn quick_config() -> StationConfig {
    StationConfig {
        startup_delay_ms: 0,
        message_display_ms: 0,
        result_display_ms: 0,
        vote_cooldown_ms: 0,
        ..StationConfig::default()
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_shows_ready_then_idle() {
    let config = StationConfig::default();
    let mut app = AppService::new(&config);
    let mut io = MockTerminal::new();
    let mut sink = LogSink::new();

    app.start(&mut sink);
    assert_eq!(app.state(), StateId::Starting);
    assert_eq!(app.boot(&mut io, &mut sink), StateId::VotingMode);

    assert_eq!(io.rows[0], (0, "System Ready".to_string()));
    assert!(io.shown("=== VOTING MODE ==="));
    assert_eq!(io.delays, [config.startup_delay_ms]);
    assert_eq!(io.beeps, [Beep::Short]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::StateChanged { to: StateId::VotingMode, .. })),
        1
    );
}

#[test]
fn missing_sensor_halts_for_good() {
    let config = StationConfig::default();
    let mut app = AppService::new(&config);
    let mut io = MockTerminal::new();
    io.sensor_present = false;
    let mut net = MockNet::online();
    let mut sink = LogSink::new();

    app.start(&mut sink);
    assert_eq!(app.boot(&mut io, &mut sink), StateId::Halted);
    assert!(io.shown("Sensor Error!"));
    assert!(io.shown("Check connections"));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorMissing(_))), 1);

    io.present_enrolled(7);
    for _ in 0..5 {
        app.tick(&mut io, &mut net, &mut sink);
    }
    assert_eq!(app.state(), StateId::Halted);
    assert_eq!(io.captures_attempted(), 0);
    assert!(net.requests.is_empty());
}

// ── Votes ─────────────────────────────────────────────────────

#[test]
fn enrolled_voter_online_is_accepted() {
    let config = StationConfig::default();
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();
    net.reply(200, r#"{"success":true}"#);

    io.present_enrolled(7);
    app.tick(&mut io, &mut net, &mut sink);

    assert_eq!(net.requests.len(), 1);
    let req = &net.requests[0];
    assert_eq!(req.url, "http://your-blockchain-server.com/api/vote");
    assert!(req.body.starts_with(r#"{"voter_id":"V7","timestamp":"#));
    assert!(req.body.ends_with(r#""device_id":"ESP32_VOTING_001"}"#));

    assert!(io.shown("Voter ID: V7"));
    assert!(io.shown("Vote Cast Successfully!"));
    assert_eq!(io.beeps, [Beep::Short, Beep::Short]);
    assert!(io.delays.contains(&config.result_display_ms));

    assert_eq!(app.state(), StateId::VotingMode);
    assert_eq!(app.session().votes_this_minute, 1);
    assert!(app.session().last_vote_ms.is_some());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::VoteSubmitted {
                outcome: SubmissionOutcome::Accepted { status: 200 },
                ..
            }
        )),
        1
    );
}

#[test]
fn offline_vote_fails_without_request() {
    let (mut app, mut io, mut sink) = booted(&StationConfig::default());
    let mut net = MockNet::offline();

    io.present_enrolled(7);
    app.tick(&mut io, &mut net, &mut sink);

    assert!(net.requests.is_empty());
    assert!(io.shown("Vote Failed!"));
    assert!(io.shown("Please try again"));
    assert_eq!(io.beeps, [Beep::Error, Beep::Short]);
    assert_eq!(app.session().votes_this_minute, 0);
    assert_eq!(app.session().last_vote_ms, None);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::VoteSubmitted {
                outcome: SubmissionOutcome::Offline,
                ..
            }
        )),
        1
    );
}

#[test]
fn unknown_print_is_denied() {
    let config = StationConfig::default();
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();

    io.present_unknown();
    app.tick(&mut io, &mut net, &mut sink);

    assert!(io.shown("Access Denied!"));
    assert!(io.shown("Print not found"));
    assert_eq!(io.beeps, [Beep::Long, Beep::Short]);
    assert_eq!(io.delays, [config.message_display_ms]);
    assert_eq!(io.last_row(0), Some("=== VOTING MODE ==="));
    assert!(net.requests.is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AccessDenied)), 1);
}

#[test]
fn no_finger_is_silent() {
    let (mut app, mut io, mut sink) = booted(&StationConfig::default());
    let mut net = MockNet::online();

    for _ in 0..10 {
        app.tick(&mut io, &mut net, &mut sink);
    }
    assert_eq!(io.captures_attempted(), 10);
    assert!(io.rows.is_empty());
    assert!(io.beeps.is_empty());
    assert_eq!(app.tick_count(), 10);
}

#[test]
fn two_consecutive_failures_leave_counters_alone() {
    let (mut app, mut io, mut sink) = booted(&StationConfig::default());
    let mut net = MockNet::online();
    net.reply(500, "internal error");
    net.fail(HttpError::Connect(-1));

    io.present_enrolled(3);
    app.tick(&mut io, &mut net, &mut sink);
    io.present_enrolled(3);
    app.tick(&mut io, &mut net, &mut sink);

    assert_eq!(net.requests.len(), 2);
    assert_eq!(app.session().votes_this_minute, 0);
    assert_eq!(app.session().last_vote_ms, None);
    assert_eq!(io.beeps, [Beep::Error, Beep::Short, Beep::Error, Beep::Short]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::VoteSubmitted {
                outcome: SubmissionOutcome::Rejected { status: 500 },
                ..
            }
        )),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::VoteSubmitted {
                outcome: SubmissionOutcome::TransportFailed,
                ..
            }
        )),
        1
    );
}

// ── Rate limiting ─────────────────────────────────────────────

#[test]
fn cooldown_skips_the_scan() {
    let config = StationConfig {
        vote_cooldown_ms: 10_000,
        result_display_ms: 0,
        ..StationConfig::default()
    };
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();

    io.present_enrolled(1);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(app.session().votes_this_minute, 1);

    io.present_enrolled(2);
    let before = io.captures_attempted();
    io.advance(9_999);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(io.captures_attempted(), before);

    io.advance(1);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(io.captures_attempted(), before + 1);
    assert_eq!(app.session().votes_this_minute, 2);
}

#[test]
fn sixty_votes_reach_the_ceiling() {
    let config = quick_config();
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();

    for slot in 1..=60 {
        io.present_enrolled(slot);
        app.tick(&mut io, &mut net, &mut sink);
    }
    assert_eq!(app.session().votes_this_minute, 60);
    assert_eq!(net.requests.len(), 60);

    io.present_enrolled(61);
    let captures = io.captures_attempted();
    app.tick(&mut io, &mut net, &mut sink);

    assert_eq!(io.captures_attempted(), captures);
    assert_eq!(net.requests.len(), 60);
    assert_eq!(app.session().votes_this_minute, 60);
    assert!(io.shown("Rate limit exceeded"));
    assert!(io.shown("Please wait..."));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RateLimited { votes_this_minute: 60 })),
        1
    );
}

#[test]
fn window_rollover_reopens_scanning() {
    let config = StationConfig {
        max_votes_per_minute: 2,
        ..quick_config()
    };
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();

    io.present_enrolled(1);
    app.tick(&mut io, &mut net, &mut sink);
    io.present_enrolled(2);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(app.session().votes_this_minute, 2);

    io.present_enrolled(3);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(net.requests.len(), 2);

    io.advance(60_000);
    app.tick(&mut io, &mut net, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::WindowReset)), 1);
    assert_eq!(net.requests.len(), 3);
    assert_eq!(app.session().votes_this_minute, 1);
}

#[test]
fn failed_votes_never_count_toward_ceiling() {
    let config = StationConfig {
        max_votes_per_minute: 1,
        ..quick_config()
    };
    let (mut app, mut io, mut sink) = booted(&config);
    let mut net = MockNet::online();
    for _ in 0..3 {
        net.reply(503, "");
    }

    for _ in 0..3 {
        io.present_enrolled(4);
        app.tick(&mut io, &mut net, &mut sink);
    }
    assert_eq!(net.requests.len(), 3);
    assert_eq!(app.session().votes_this_minute, 0);
    assert!(!io.shown("Rate limit exceeded"));
}

// ── Re-arm ────────────────────────────────────────────────────

#[test]
fn rearm_redraws_idle_only_in_voting_mode() {
    let (mut app, mut io, _sink) = booted(&StationConfig::default());
    app.rearm(&mut io);
    assert_eq!(io.last_row(0), Some("=== VOTING MODE ==="));
    assert_eq!(io.beeps, [Beep::Short]);

    let mut halted = AppService::new(&StationConfig::default());
    let mut io2 = MockTerminal::new();
    io2.sensor_present = false;
    let mut sink2 = LogSink::new();
    halted.start(&mut sink2);
    halted.boot(&mut io2, &mut sink2);
    io2.reset_record();
    halted.rearm(&mut io2);
    assert!(io2.rows.is_empty());
    assert!(io2.beeps.is_empty());
}
