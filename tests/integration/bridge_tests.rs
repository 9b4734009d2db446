//! Integration tests for the enrollment bridge: console line → engine →
//! sensor → JSON response line.

use crate::mock_hw::{LogSink, MemTransport, MockNet, MockTerminal, SensorCall};

use biovote::app::ports::TemplateBuffer;
use biovote::app::service::AppService;
use biovote::bridge::codec::MAX_LINE_LEN;
use biovote::bridge::engine::BridgeEngine;
use biovote::config::StationConfig;
use biovote::error::BiometricError;
use biovote::fsm::StateId;
use biovote::protocol::MAX_TEMPLATE_SLOT;

const FINGER_TIMEOUT_MS: u32 = 10_000;

fn engine(input: &str) -> BridgeEngine<MemTransport> {
    let mut t = MemTransport::new();
    t.feed(input);
    BridgeEngine::new(t, FINGER_TIMEOUT_MS)
}

// ── Enroll ────────────────────────────────────────────────────

#[test]
fn enroll_runs_two_captures_and_stores() {
    let mut bridge = engine("{\"action\":\"ENROLL_BIOMETRIC\",\"voterId\":\"VOTER-1\",\"id\":5}\n");
    let mut io = MockTerminal::new();
    io.captures.extend([Ok(()), Err(BiometricError::NoFinger), Ok(())]);

    assert_eq!(bridge.poll(&mut io), 1);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"success","message":"Fingerprint enrolled","voterId":"VOTER-1","id":5}"#]
    );
    assert_eq!(
        io.sensor_calls,
        [
            SensorCall::Capture,
            SensorCall::ToTemplate(TemplateBuffer::One),
            SensorCall::Capture,
            SensorCall::Capture,
            SensorCall::ToTemplate(TemplateBuffer::Two),
            SensorCall::CreateModel,
            SensorCall::Store(5),
        ]
    );
    let prompts: Vec<&str> = io.rows.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(
        prompts,
        ["Place finger...", "Remove finger...", "Same finger...", "Enrolled OK!"]
    );
    assert!(io.delays.contains(&2_000));
}

#[test]
fn enroll_times_out_without_finger() {
    let mut bridge = engine("{\"action\":\"ENROLL_BIOMETRIC\",\"voterId\":\"VOTER-1\",\"id\":5}\n");
    let mut io = MockTerminal::new();

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"error","error":"Enrollment failed","voterId":"VOTER-1"}"#]
    );
    assert!(io.now_ms >= u64::from(FINGER_TIMEOUT_MS));
    assert!(!io.sensor_calls.iter().any(|c| matches!(c, SensorCall::Store(_))));
    assert_eq!(io.last_row(0), Some("Enroll failed"));
}

#[test]
fn enroll_model_mismatch_is_reported() {
    let mut bridge = engine("{\"action\":\"ENROLL_BIOMETRIC\",\"id\":9}\n");
    let mut io = MockTerminal::new();
    io.captures.extend([Ok(()), Err(BiometricError::NoFinger), Ok(())]);
    io.model_result = Some(BiometricError::EnrollMismatch);

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"error","error":"Enrollment failed"}"#]
    );
    assert!(!io.sensor_calls.contains(&SensorCall::Store(9)));
}

#[test]
fn enroll_rejects_out_of_range_slots() {
    for cmd in [
        r#"{"action":"ENROLL_BIOMETRIC","voterId":"X","id":0}"#,
        r#"{"action":"ENROLL_BIOMETRIC","voterId":"X","id":201}"#,
        r#"{"action":"ENROLL_BIOMETRIC","voterId":"X"}"#,
    ] {
        let mut bridge = engine(&format!("{cmd}\n"));
        let mut io = MockTerminal::new();
        assert_eq!(bridge.poll(&mut io), 1);
        assert_eq!(
            bridge.transport().lines(),
            [r#"{"type":"error","error":"Invalid template id","voterId":"X"}"#],
            "{cmd}"
        );
        assert!(io.sensor_calls.is_empty());
    }
}

#[test]
fn highest_enrollable_slot_is_found_by_verify() {
    let cmd = format!(
        "{{\"action\":\"ENROLL_BIOMETRIC\",\"voterId\":\"V-X\",\"id\":{MAX_TEMPLATE_SLOT}}}\n\
         {{\"action\":\"VERIFY_BIOMETRIC\",\"voterId\":\"V-X\"}}\n"
    );
    let mut bridge = engine(&cmd);
    let mut io = MockTerminal::new();
    io.captures.extend([Ok(()), Err(BiometricError::NoFinger), Ok(())]);
    io.present_enrolled(MAX_TEMPLATE_SLOT);

    assert_eq!(bridge.poll(&mut io), 2);
    assert!(io.sensor_calls.contains(&SensorCall::Store(MAX_TEMPLATE_SLOT)));
    assert_eq!(
        bridge.transport().lines(),
        [
            format!(r#"{{"type":"success","message":"Fingerprint enrolled","voterId":"V-X","id":{MAX_TEMPLATE_SLOT}}}"#),
            format!(r#"{{"type":"success","message":"Fingerprint verified","voterId":"V-X","id":{MAX_TEMPLATE_SLOT}}}"#),
        ]
    );
}

// ── Verify ────────────────────────────────────────────────────

#[test]
fn verify_reports_matched_slot() {
    let mut bridge = engine("{\"action\":\"VERIFY_BIOMETRIC\",\"voterId\":\"V-1\"}\n");
    let mut io = MockTerminal::new();
    io.present_enrolled(12);

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"success","message":"Fingerprint verified","voterId":"V-1","id":12}"#]
    );
    assert_eq!(io.last_row(0), Some("Verified!"));
}

#[test]
fn verify_without_match() {
    let mut bridge = engine("{\"action\":\"VERIFY_BIOMETRIC\",\"voterId\":\"V-1\"}\n");
    let mut io = MockTerminal::new();
    io.present_unknown();

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"error","error":"No match found","voterId":"V-1"}"#]
    );
    assert_eq!(io.last_row(0), Some("No match"));
}

#[test]
fn verify_sensor_fault() {
    let mut bridge = engine("{\"action\":\"VERIFY_BIOMETRIC\"}\n");
    let mut io = MockTerminal::new();
    io.captures.push_back(Err(BiometricError::Communication));

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"error","error":"Verification failed"}"#]
    );
}

// ── Clear ─────────────────────────────────────────────────────

#[test]
fn clear_database() {
    let mut bridge = engine("{\"action\":\"CLEAR_BIOMETRIC_DB\"}\n");
    let mut io = MockTerminal::new();

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"success","message":"All fingerprints cleared"}"#]
    );
    assert_eq!(io.sensor_calls, [SensorCall::Clear]);
    let prompts: Vec<&str> = io.rows.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(prompts, ["Clearing DB...", "Ready for action"]);
}

#[test]
fn clear_database_failure() {
    let mut bridge = engine("{\"action\":\"CLEAR_BIOMETRIC_DB\"}\n");
    let mut io = MockTerminal::new();
    io.clear_result = Some(BiometricError::ClearFailed);

    bridge.poll(&mut io);

    assert_eq!(
        bridge.transport().lines(),
        [r#"{"type":"error","error":"Failed to clear DB"}"#]
    );
}

// ── Framing ───────────────────────────────────────────────────

#[test]
fn garbage_and_unknown_actions_are_ignored() {
    let mut bridge = engine(
        "not json\n{\"action\":\"REBOOT\"}\n{\"voterId\":\"x\"}\n{\"action\":\"CLEAR_BIOMETRIC_DB\"}\n",
    );
    let mut io = MockTerminal::new();

    assert_eq!(bridge.poll(&mut io), 1);
    assert_eq!(bridge.transport().lines().len(), 1);
    assert_eq!(io.sensor_calls, [SensorCall::Clear]);
}

#[test]
fn commands_split_across_reads() {
    let mut bridge = engine("{\"action\":\"CLEAR_BIOMETRIC_DB\"}\r\n{\"action\":\"CLEAR_BIOMETRIC_DB\"}\n");
    bridge.transport_mut().read_chunk = 3;
    let mut io = MockTerminal::new();

    assert_eq!(bridge.poll(&mut io), 2);
    assert_eq!(io.sensor_calls, [SensorCall::Clear, SensorCall::Clear]);
}

#[test]
fn oversized_line_is_dropped() {
    let long = format!("{{\"action\":\"CLEAR_BIOMETRIC_DB\",\"pad\":\"{}\"}}\n", "x".repeat(MAX_LINE_LEN));
    let mut bridge = engine(&format!("{long}{{\"action\":\"VERIFY_BIOMETRIC\"}}\n"));
    let mut io = MockTerminal::new();
    io.present_enrolled(1);

    assert_eq!(bridge.poll(&mut io), 1);
    assert!(!io.sensor_calls.contains(&SensorCall::Clear));
    assert_eq!(bridge.transport().lines().len(), 1);
}

#[test]
fn idle_console_does_nothing() {
    let mut bridge = engine("");
    let mut io = MockTerminal::new();
    assert_eq!(bridge.poll(&mut io), 0);
    assert!(io.sensor_calls.is_empty());
    assert!(bridge.transport().output.is_empty());
}

// ── Interaction with the voting loop ──────────────────────────

#[test]
fn bridge_leaves_session_untouched_and_idle_is_rearmed() {
    let config = StationConfig::default();
    let mut app = AppService::new(&config);
    let mut io = MockTerminal::new();
    let mut net = MockNet::online();
    let mut sink = LogSink::new();
    app.start(&mut sink);
    app.boot(&mut io, &mut sink);

    io.present_enrolled(4);
    app.tick(&mut io, &mut net, &mut sink);
    let session = *app.session();
    assert_eq!(session.votes_this_minute, 1);

    let mut bridge = engine("{\"action\":\"VERIFY_BIOMETRIC\",\"voterId\":\"V-4\"}\n");
    io.present_enrolled(4);
    io.reset_record();
    if bridge.poll(&mut io) > 0 {
        app.rearm(&mut io);
    }

    assert_eq!(*app.session(), session);
    assert_eq!(app.state(), StateId::VotingMode);
    assert_eq!(io.last_row(0), Some("=== VOTING MODE ==="));
    assert_eq!(net.requests.len(), 1);
}
