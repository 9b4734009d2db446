//! Mock terminal, network and console for integration tests.
//!
//! Records every display write, beep, delay and sensor call so tests can
//! assert on the full history without real peripherals.  The clock only
//! moves when something delays or a test advances it.

use std::collections::VecDeque;

use biovote::app::events::AppEvent;
use biovote::app::ports::{
    Beep, BiometricPort, ClockPort, ConnectivityPort, EventSink, FeedbackPort, HttpPort, HttpResponse,
    TemplateBuffer,
};
use biovote::bridge::transport::Transport;
use biovote::error::{BiometricError, HttpError};
use biovote::protocol::VoterIdentity;

// ── Terminal (sensor + panel + clock) ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorCall {
    Verify,
    Capture,
    ToTemplate(TemplateBuffer),
    Search,
    CreateModel,
    Store(u16),
    Clear,
}

#[derive(Default)]
pub struct MockTerminal {
    // Sensor script
    pub sensor_present: bool,
    pub captures: VecDeque<Result<(), BiometricError>>,
    pub searches: VecDeque<Result<Option<VoterIdentity>, BiometricError>>,
    pub model_result: Option<BiometricError>,
    pub clear_result: Option<BiometricError>,
    pub sensor_calls: Vec<SensorCall>,

    // Panel record
    pub rows: Vec<(u8, String)>,
    pub clears: usize,
    pub beeps: Vec<Beep>,

    // Clock
    pub now_ms: u64,
    pub delays: Vec<u32>,
}

#[allow(dead_code)]
impl MockTerminal {
    pub fn new() -> Self {
        Self {
            sensor_present: true,
            ..Self::default()
        }
    }

    /// Queue a finger that matches `slot`.
    pub fn present_enrolled(&mut self, slot: u16) {
        self.captures.push_back(Ok(()));
        self.searches.push_back(Ok(Some(VoterIdentity(slot))));
    }

    /// Queue a finger the library does not know.
    pub fn present_unknown(&mut self) {
        self.captures.push_back(Ok(()));
        self.searches.push_back(Ok(None));
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn shown(&self, text: &str) -> bool {
        self.rows.iter().any(|(_, t)| t == text)
    }

    pub fn last_row(&self, row: u8) -> Option<&str> {
        self.rows.iter().rev().find(|(r, _)| *r == row).map(|(_, t)| t.as_str())
    }

    pub fn captures_attempted(&self) -> usize {
        self.sensor_calls.iter().filter(|c| **c == SensorCall::Capture).count()
    }

    pub fn reset_record(&mut self) {
        self.rows.clear();
        self.clears = 0;
        self.beeps.clear();
        self.delays.clear();
        self.sensor_calls.clear();
    }
}

impl BiometricPort for MockTerminal {
    fn verify_sensor(&mut self) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::Verify);
        if self.sensor_present {
            Ok(())
        } else {
            Err(BiometricError::Communication)
        }
    }

    fn capture_image(&mut self) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::Capture);
        self.captures.pop_front().unwrap_or(Err(BiometricError::NoFinger))
    }

    fn image_to_template(&mut self, buffer: TemplateBuffer) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::ToTemplate(buffer));
        Ok(())
    }

    fn search(&mut self) -> Result<Option<VoterIdentity>, BiometricError> {
        self.sensor_calls.push(SensorCall::Search);
        self.searches.pop_front().unwrap_or(Ok(None))
    }

    fn create_model(&mut self) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::CreateModel);
        self.model_result.map_or(Ok(()), Err)
    }

    fn store_model(&mut self, slot: u16) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::Store(slot));
        Ok(())
    }

    fn clear_templates(&mut self) -> Result<(), BiometricError> {
        self.sensor_calls.push(SensorCall::Clear);
        self.clear_result.map_or(Ok(()), Err)
    }
}

impl FeedbackPort for MockTerminal {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn show(&mut self, row: u8, text: &str) {
        self.rows.push((row, text.to_string()));
    }

    fn beep(&mut self, beep: Beep) {
        self.beeps.push(beep);
    }
}

impl ClockPort for MockTerminal {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_ms += u64::from(ms);
    }
}

// ── Network ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub struct MockNet {
    pub online: bool,
    pub replies: VecDeque<Result<HttpResponse, HttpError>>,
    pub requests: Vec<Request>,
}

#[allow(dead_code)]
impl MockNet {
    pub fn online() -> Self {
        Self {
            online: true,
            replies: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            ..Self::online()
        }
    }

    pub fn reply(&mut self, status: u16, body: &str) {
        self.replies.push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&mut self, err: HttpError) {
        self.replies.push_back(Err(err));
    }
}

impl ConnectivityPort for MockNet {
    fn is_connected(&self) -> bool {
        self.online
    }
}

impl HttpPort for MockNet {
    fn post(&mut self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, HttpError> {
        self.requests.push(Request {
            url: url.to_string(),
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        self.replies.pop_front().unwrap_or(Ok(HttpResponse {
            status: 200,
            body: String::new(),
        }))
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Console transport ─────────────────────────────────────────

#[derive(Default)]
pub struct MemTransport {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    /// Bytes handed out per read, to exercise chunk boundaries.
    pub read_chunk: usize,
}

#[allow(dead_code)]
impl MemTransport {
    pub fn new() -> Self {
        Self {
            read_chunk: usize::MAX,
            ..Self::default()
        }
    }

    pub fn feed(&mut self, text: &str) {
        self.input.extend(text.bytes());
    }

    /// Output split into lines, terminators removed.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.output)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Transport for MemTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.input.len()).min(self.read_chunk);
        for slot in buf.iter_mut().take(n) {
            *slot = self.input.pop_front().unwrap_or(0);
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
