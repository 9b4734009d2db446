//! Active buzzer on a single GPIO.
//!
//! Beeps are blocking: the pin is driven high, held for the beep's
//! duration and driven low again.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::Beep;
use crate::config::StationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepDurations {
    pub short_ms: u32,
    pub error_ms: u32,
    pub long_ms: u32,
}

impl BeepDurations {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            short_ms: config.beep_short_ms,
            error_ms: config.beep_error_ms,
            long_ms: config.beep_long_ms,
        }
    }

    pub fn duration_ms(&self, beep: Beep) -> u32 {
        match beep {
            Beep::Short => self.short_ms,
            Beep::Error => self.error_ms,
            Beep::Long => self.long_ms,
        }
    }
}

pub struct Buzzer<PIN: OutputPin, D: DelayNs> {
    pin: PIN,
    delay: D,
    durations: BeepDurations,
}

impl<PIN: OutputPin, D: DelayNs> Buzzer<PIN, D> {
    pub fn new(mut pin: PIN, delay: D, durations: BeepDurations) -> Self {
        if pin.set_low().is_err() {
            warn!("Buzzer: failed to drive pin low at init");
        }
        Self { pin, delay, durations }
    }

    pub fn beep(&mut self, beep: Beep) {
        let ms = self.durations.duration_ms(beep);
        if self.pin.set_high().is_err() {
            warn!("Buzzer: failed to drive pin high");
            return;
        }
        self.delay.delay_ms(ms);
        if self.pin.set_low().is_err() {
            warn!("Buzzer: failed to release pin");
        }
    }

    pub fn durations(&self) -> BeepDurations {
        self.durations
    }
}
