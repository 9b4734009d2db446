//! HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack exposes the controller in 4-bit mode:
//!
//! ```text
//!  PCF8574 bit:  7   6   5   4   3    2   1   0
//!  LCD line:     D7  D6  D5  D4  BL   EN  RW  RS
//! ```
//!
//! Every byte is sent as two nibbles, each latched by pulsing EN.  Row
//! writes blank the full row before writing so shorter text never leaves
//! residue from a longer previous message.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::DisplayError;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2-line, 5x8
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row on 16x2 / 20x4 modules.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Longest row any supported module has.
pub const MAX_COLUMNS: usize = 40;

/// Clamp a requested row into `0..rows`.
pub fn clamp_row(row: u8, rows: u8) -> u8 {
    row.min(rows.saturating_sub(1))
}

/// DDRAM address of column 0 of `row` (clamped).
pub fn row_address(row: u8, rows: u8) -> u8 {
    let row = usize::from(clamp_row(row, rows)).min(ROW_OFFSETS.len() - 1);
    ROW_OFFSETS[row]
}

/// Bytes written for `text` on a `columns`-wide row: truncated to the
/// width, non-ASCII characters replaced by `?`.
pub fn format_row(text: &str, columns: u8) -> heapless::Vec<u8, MAX_COLUMNS> {
    let width = usize::from(columns).min(MAX_COLUMNS);
    text.chars()
        .take(width)
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .collect()
}

pub struct Lcd<I2C: I2c, D: DelayNs> {
    i2c: I2C,
    delay: D,
    address: u8,
    columns: u8,
    rows: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8, columns: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            columns,
            rows,
        }
    }

    /// Power-on initialisation into 4-bit mode.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        self.expander_write(0)?;

        // Three times 0x3 to reach a known 8-bit state, then switch to 4-bit.
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;

        self.command(CMD_FUNCTION_SET)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE)
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Blank `row`, then write `text` from column 0.
    pub fn write_row(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let addr = row_address(row, self.rows);

        self.command(CMD_SET_DDRAM | addr)?;
        for _ in 0..self.columns {
            self.data(b' ')?;
        }

        self.command(CMD_SET_DDRAM | addr)?;
        for byte in format_row(text, self.columns) {
            self.data(byte)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // ── Internal ──────────────────────────────────────────────

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0)
    }

    fn data(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, RS)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble((value << 4) & 0xF0, mode)
    }

    /// Latch the upper four bits of `nibble` with an EN pulse.
    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let bits = (nibble & 0xF0) | mode;
        self.expander_write(bits | EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[bits | BACKLIGHT])
            .map_err(|_| DisplayError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Records every byte written to the expander.
    #[derive(Default)]
    struct Bus {
        writes: Vec<u8>,
        fail: bool,
    }

    impl ErrorType for Bus {
        type Error = ErrorKind;
    }

    impl I2c for Bus {
        fn transaction(&mut self, _address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.extend_from_slice(bytes);
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Reassemble the bytes the controller latched (on EN falling edges).
    fn latched(writes: &[u8]) -> Vec<(bool, u8)> {
        let nibbles: Vec<(bool, u8)> = writes
            .windows(2)
            .filter(|w| w[0] & EN != 0 && w[1] & EN == 0)
            .map(|w| (w[1] & RS != 0, w[1] & 0xF0))
            .collect();
        nibbles.chunks(2).filter(|c| c.len() == 2).map(|c| (c[0].0, c[0].1 | (c[1].1 >> 4))).collect()
    }

    #[test]
    fn row_addresses_for_20x4() {
        assert_eq!(row_address(0, 4), 0x00);
        assert_eq!(row_address(1, 4), 0x40);
        assert_eq!(row_address(2, 4), 0x14);
        assert_eq!(row_address(3, 4), 0x54);
    }

    #[test]
    fn rows_are_clamped() {
        assert_eq!(clamp_row(9, 4), 3);
        assert_eq!(row_address(9, 4), 0x54);
        assert_eq!(row_address(3, 2), 0x40);
    }

    #[test]
    fn long_text_is_truncated() {
        assert_eq!(format_row("Vote Cast Successfully!", 20).as_slice(), b"Vote Cast Successful");
        assert_eq!(format_row("short", 20).as_slice(), b"short");
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(format_row("caf\u{e9}", 20).as_slice(), b"caf?");
    }

    #[test]
    fn write_row_blanks_then_writes() {
        let mut lcd = Lcd::new(Bus::default(), NoDelay, 0x27, 4, 2);
        lcd.write_row(1, "ab").unwrap();
        let (bus, _) = lcd.release();
        let bytes = latched(&bus.writes);
        assert_eq!(
            bytes,
            [
                (false, 0xC0),
                (true, b' '),
                (true, b' '),
                (true, b' '),
                (true, b' '),
                (false, 0xC0),
                (true, b'a'),
                (true, b'b'),
            ]
        );
    }

    #[test]
    fn backlight_stays_on() {
        let mut lcd = Lcd::new(Bus::default(), NoDelay, 0x27, 20, 4);
        lcd.clear().unwrap();
        let (bus, _) = lcd.release();
        assert!(bus.writes.iter().all(|b| b & BACKLIGHT != 0));
    }

    #[test]
    fn bus_failure_is_reported() {
        let mut lcd = Lcd::new(Bus { writes: Vec::new(), fail: true }, NoDelay, 0x27, 20, 4);
        assert_eq!(lcd.init(), Err(DisplayError::Bus));
    }
}
