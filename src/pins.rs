//! GPIO / peripheral pin assignments for the voting terminal board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// AS608 fingerprint sensor (UART2)
// ---------------------------------------------------------------------------

/// ESP32 RX ← sensor TX.
pub const FINGERPRINT_RX_GPIO: i32 = 16;
/// ESP32 TX → sensor RX.
pub const FINGERPRINT_TX_GPIO: i32 = 17;
/// UART peripheral number used for the sensor.
pub const FINGERPRINT_UART: u8 = 2;

// ---------------------------------------------------------------------------
// Character LCD (HD44780 behind a PCF8574 I²C backpack)
// ---------------------------------------------------------------------------

pub const LCD_SDA_GPIO: i32 = 21;
pub const LCD_SCL_GPIO: i32 = 22;
/// 7-bit I²C address of the backpack.
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const LCD_I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Serial console (enrollment bridge)
// ---------------------------------------------------------------------------

/// Console UART (USB-serial bridge on the dev board).
pub const CONSOLE_UART: u8 = 0;
pub const CONSOLE_BAUD: u32 = 115_200;
pub const CONSOLE_TX_GPIO: i32 = 1;
pub const CONSOLE_RX_GPIO: i32 = 3;
