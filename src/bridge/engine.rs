//! Enrollment bridge engine.
//!
//! Reads newline-delimited JSON commands from the admin console, runs
//! them against the fingerprint sensor and answers with one JSON line
//! each.  The voting loop calls [`BridgeEngine::poll`] between
//! iterations; a command blocks the loop until it completes.  Every wait
//! for a finger is bounded by the configured fingerprint timeout.
//!
//! The bridge never touches the voting session counters.

use log::{info, warn};

use super::codec::LineDecoder;
use super::commands::{
    BridgeCommand, BridgeResponse, ERR_BAD_ID, ERR_CLEAR, ERR_ENROLL, ERR_NO_MATCH, ERR_VERIFY, MAX_TEMPLATE_ID,
    MSG_CLEARED, MSG_ENROLLED, MSG_VERIFIED, ParseError,
};
use super::transport::{Transport, write_all};
use crate::app::ports::{BiometricPort, ClockPort, FeedbackPort, TemplateBuffer};
use crate::app::screens::Screen;
use crate::error::BiometricError;

/// Sensor poll interval while waiting for a finger to arrive or leave.
const FINGER_POLL_MS: u32 = 50;

/// Pause after "Remove finger..." before checking that it left.
const REMOVE_FINGER_PAUSE_MS: u32 = 2_000;

/// Bytes pulled from the transport per read.
const READ_CHUNK: usize = 64;

pub struct BridgeEngine<T: Transport> {
    transport: T,
    decoder: LineDecoder,
    finger_timeout_ms: u64,
}

impl<T: Transport> BridgeEngine<T> {
    pub fn new(transport: T, finger_timeout_ms: u32) -> Self {
        Self {
            transport,
            decoder: LineDecoder::new(),
            finger_timeout_ms: u64::from(finger_timeout_ms),
        }
    }

    /// Drain pending console input and run every complete command.
    /// Returns how many commands ran.
    pub fn poll(&mut self, hw: &mut (impl BiometricPort + FeedbackPort + ClockPort)) -> usize {
        let mut handled = 0;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match self.transport.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n.min(READ_CHUNK),
                Err(e) => {
                    warn!("Bridge read failed: {:?}", e);
                    break;
                }
            };
            for &byte in &chunk[..n] {
                let Some(line) = self.decoder.push(byte) else {
                    continue;
                };
                match BridgeCommand::parse(line) {
                    Ok(cmd) => {
                        let response = self.execute(cmd, hw);
                        self.respond(&response);
                        handled += 1;
                    }
                    Err(ParseError::Malformed) => warn!("Bridge: malformed command ignored"),
                    Err(ParseError::UnknownAction(action)) => warn!("Bridge: unknown action '{}' ignored", action),
                }
            }
        }
        handled
    }

    /// Run one command to completion and produce its response.
    pub fn execute(
        &mut self,
        cmd: BridgeCommand,
        hw: &mut (impl BiometricPort + FeedbackPort + ClockPort),
    ) -> BridgeResponse {
        match cmd {
            BridgeCommand::Enroll { voter_id, id } => {
                let slot = match id {
                    Some(id) if (1..=MAX_TEMPLATE_ID).contains(&id) => id as u16,
                    _ => {
                        warn!("Bridge: enroll with invalid template id {:?}", id);
                        return BridgeResponse::error(ERR_BAD_ID, voter_id);
                    }
                };
                info!("Bridge: enrolling slot {} for {:?}", slot, voter_id);
                match self.enroll(slot, hw) {
                    Ok(()) => {
                        Screen::Enrolled.render(hw);
                        BridgeResponse::success(MSG_ENROLLED, voter_id, Some(slot))
                    }
                    Err(e) => {
                        warn!("Bridge: enrollment into slot {} failed: {}", slot, e);
                        Screen::EnrollFailed.render(hw);
                        BridgeResponse::error(ERR_ENROLL, voter_id)
                    }
                }
            }
            BridgeCommand::Verify { voter_id } => match self.verify(hw) {
                Ok(Some(voter)) => {
                    Screen::Verified.render(hw);
                    BridgeResponse::success(MSG_VERIFIED, voter_id, Some(voter.slot()))
                }
                Ok(None) => {
                    Screen::NoMatch.render(hw);
                    BridgeResponse::error(ERR_NO_MATCH, voter_id)
                }
                Err(e) => {
                    warn!("Bridge: verification failed: {}", e);
                    Screen::NoMatch.render(hw);
                    BridgeResponse::error(ERR_VERIFY, voter_id)
                }
            },
            BridgeCommand::ClearDatabase => {
                Screen::ClearingDb.render(hw);
                let response = match hw.clear_templates() {
                    Ok(()) => {
                        info!("Bridge: template library cleared");
                        BridgeResponse::success(MSG_CLEARED, None, None)
                    }
                    Err(e) => {
                        warn!("Bridge: clearing templates failed: {}", e);
                        BridgeResponse::error(ERR_CLEAR, None)
                    }
                };
                Screen::BridgeReady.render(hw);
                response
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn enroll(
        &self,
        slot: u16,
        hw: &mut (impl BiometricPort + FeedbackPort + ClockPort),
    ) -> Result<(), BiometricError> {
        Screen::PlaceFinger.render(hw);
        self.wait_for_finger(hw)?;
        hw.image_to_template(TemplateBuffer::One)?;

        Screen::RemoveFinger.render(hw);
        hw.delay_ms(REMOVE_FINGER_PAUSE_MS);
        self.wait_for_removal(hw)?;

        Screen::SameFinger.render(hw);
        self.wait_for_finger(hw)?;
        hw.image_to_template(TemplateBuffer::Two)?;

        hw.create_model()?;
        hw.store_model(slot)
    }

    fn verify(
        &self,
        hw: &mut (impl BiometricPort + FeedbackPort + ClockPort),
    ) -> Result<Option<crate::protocol::VoterIdentity>, BiometricError> {
        Screen::PlaceFinger.render(hw);
        self.wait_for_finger(hw)?;
        hw.image_to_template(TemplateBuffer::One)?;
        hw.search()
    }

    /// Poll until an image is captured, a hard error occurs or the
    /// timeout passes.
    fn wait_for_finger(&self, hw: &mut (impl BiometricPort + ClockPort)) -> Result<(), BiometricError> {
        let start = hw.now_ms();
        loop {
            match hw.capture_image() {
                Ok(()) => return Ok(()),
                Err(BiometricError::NoFinger) => {
                    if hw.now_ms().saturating_sub(start) >= self.finger_timeout_ms {
                        return Err(BiometricError::Timeout);
                    }
                    hw.delay_ms(FINGER_POLL_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll until the sensor reports no finger, or the timeout passes.
    fn wait_for_removal(&self, hw: &mut (impl BiometricPort + ClockPort)) -> Result<(), BiometricError> {
        let start = hw.now_ms();
        loop {
            match hw.capture_image() {
                Err(BiometricError::NoFinger) => return Ok(()),
                _ if hw.now_ms().saturating_sub(start) >= self.finger_timeout_ms => {
                    return Err(BiometricError::Timeout);
                }
                _ => hw.delay_ms(FINGER_POLL_MS),
            }
        }
    }

    fn respond(&mut self, response: &BridgeResponse) {
        match response.to_line() {
            Ok(line) => {
                if let Err(e) = write_all(&mut self.transport, &line) {
                    warn!("Bridge: response write failed: {:?}", e);
                }
            }
            Err(e) => warn!("Bridge: response encoding failed: {}", e),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
