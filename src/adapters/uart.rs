//! UART transport adapter.
//!
//! Wraps an ESP-IDF `UartDriver` as a [`Transport`] so the AS608 driver
//! (UART2) and the enrollment bridge (console UART) share one byte-channel
//! abstraction.  Reads never block.

use esp_idf_svc::hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::bridge::transport::Transport;

pub struct UartTransport {
    uart: UartDriver<'static>,
}

impl UartTransport {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.uart.wait_tx_done(BLOCK)
    }
}
