//! Hardware adapters — bridge the concrete drivers to the domain ports.
//!
//! [`FeedbackPanel`] joins the LCD and the buzzer behind [`FeedbackPort`];
//! display bus faults are logged here and never reach the domain.
//! [`Terminal`] bundles sensor, panel and clock into the single `io`
//! handle that `AppService` and the enrollment bridge take.  On non-espidf
//! targets the same adapters run over mock buses in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{Beep, BiometricPort, ClockPort, FeedbackPort, TemplateBuffer};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::lcd::Lcd;
use crate::error::BiometricError;
use crate::protocol::VoterIdentity;

// ── Feedback panel ────────────────────────────────────────────

pub struct FeedbackPanel<I2C: I2c, P: OutputPin, D1: DelayNs, D2: DelayNs> {
    lcd: Lcd<I2C, D1>,
    buzzer: Buzzer<P, D2>,
    display_faults: u32,
}

impl<I2C: I2c, P: OutputPin, D1: DelayNs, D2: DelayNs> FeedbackPanel<I2C, P, D1, D2> {
    pub fn new(lcd: Lcd<I2C, D1>, buzzer: Buzzer<P, D2>) -> Self {
        Self {
            lcd,
            buzzer,
            display_faults: 0,
        }
    }

    /// Bus errors swallowed since boot.
    pub fn display_faults(&self) -> u32 {
        self.display_faults
    }

    fn note_fault(&mut self, what: &str) {
        self.display_faults = self.display_faults.saturating_add(1);
        warn!("LCD: {} failed ({} faults so far)", what, self.display_faults);
    }
}

impl<I2C: I2c, P: OutputPin, D1: DelayNs, D2: DelayNs> FeedbackPort for FeedbackPanel<I2C, P, D1, D2> {
    fn clear(&mut self) {
        if self.lcd.clear().is_err() {
            self.note_fault("clear");
        }
    }

    fn show(&mut self, row: u8, text: &str) {
        if self.lcd.write_row(row, text).is_err() {
            self.note_fault("row write");
        }
    }

    fn beep(&mut self, beep: Beep) {
        self.buzzer.beep(beep);
    }
}

// ── Terminal bundle ───────────────────────────────────────────

/// Sensor + panel + clock as one `io` handle.
pub struct Terminal<S, F, C> {
    sensor: S,
    panel: F,
    clock: C,
}

impl<S: BiometricPort, F: FeedbackPort, C: ClockPort> Terminal<S, F, C> {
    pub fn new(sensor: S, panel: F, clock: C) -> Self {
        Self { sensor, panel, clock }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn panel(&self) -> &F {
        &self.panel
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<S: BiometricPort, F, C> BiometricPort for Terminal<S, F, C> {
    fn verify_sensor(&mut self) -> Result<(), BiometricError> {
        self.sensor.verify_sensor()
    }

    fn capture_image(&mut self) -> Result<(), BiometricError> {
        self.sensor.capture_image()
    }

    fn image_to_template(&mut self, buffer: TemplateBuffer) -> Result<(), BiometricError> {
        self.sensor.image_to_template(buffer)
    }

    fn search(&mut self) -> Result<Option<VoterIdentity>, BiometricError> {
        self.sensor.search()
    }

    fn create_model(&mut self) -> Result<(), BiometricError> {
        self.sensor.create_model()
    }

    fn store_model(&mut self, slot: u16) -> Result<(), BiometricError> {
        self.sensor.store_model(slot)
    }

    fn clear_templates(&mut self) -> Result<(), BiometricError> {
        self.sensor.clear_templates()
    }
}

impl<S, F: FeedbackPort, C> FeedbackPort for Terminal<S, F, C> {
    fn clear(&mut self) {
        self.panel.clear();
    }

    fn show(&mut self, row: u8, text: &str) {
        self.panel.show(row, text);
    }

    fn beep(&mut self, beep: Beep) {
        self.panel.beep(beep);
    }
}

impl<S, F, C: ClockPort> ClockPort for Terminal<S, F, C> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}
