//! BioVote Terminal Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  As608 (UART2)     FeedbackPanel     SystemClock  LogEventSink │
//! │  (Biometric)       (LCD + buzzer)    (Clock)      (EventSink)  │
//! │  WifiAdapter + HttpClient            BridgeEngine (console)    │
//! │  (Connectivity + Http)                                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Session counters · Vote submitter               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use biovote::adapters::device_id;
use biovote::adapters::hardware::{FeedbackPanel, Terminal};
use biovote::adapters::http::{HttpClient, NetworkAdapter};
use biovote::adapters::log_sink::LogEventSink;
use biovote::adapters::time::SystemClock;
use biovote::adapters::uart::UartTransport;
use biovote::adapters::wifi::WifiAdapter;
use biovote::app::ports::ClockPort;
use biovote::app::service::AppService;
use biovote::bridge::engine::BridgeEngine;
use biovote::config::StationConfig;
use biovote::drivers::buzzer::{BeepDurations, Buzzer};
use biovote::drivers::fingerprint::As608;
use biovote::drivers::lcd::Lcd;
use biovote::fsm::StateId;
use biovote::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let mut config = StationConfig::default();
    log::set_max_level(config.log_level.to_filter());

    info!("╔══════════════════════════════════════╗");
    info!("║  BioVote terminal v{}             ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Identity + configuration ───────────────────────────
    let dev_id = device_id::resolve_device_id(&mut config, &device_id::read_mac());
    info!("Device ID: {}", dev_id);
    config.validate()?;
    info!("Endpoint: {}", config.endpoint_url());

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 3. Display + buzzer ───────────────────────────────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::LCD_I2C_FREQ_HZ)),
    )?;
    let mut lcd = Lcd::new(i2c, Ets, pins::LCD_I2C_ADDR, config.lcd_columns, config.lcd_rows);
    if let Err(e) = lcd.init() {
        // The terminal still votes without a display; faults are logged per write.
        warn!("LCD init failed: {}", e);
    }
    let buzzer_pin = PinDriver::output(peripherals.pins.gpio18)?;
    let buzzer = Buzzer::new(buzzer_pin, FreeRtos, BeepDurations::from_config(&config));
    let panel = FeedbackPanel::new(lcd, buzzer);

    // ── 4. Network ────────────────────────────────────────────
    let mut wifi = WifiAdapter::new(config.wifi_timeout_ms);
    wifi.attach(EspWifi::new(peripherals.modem, sysloop, Some(nvs))?);
    match wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi unavailable ({}); votes will fail until the link is up", e);
            }
        }
        Err(e) => warn!("WiFi credentials rejected: {}", e),
    }
    let mut net = NetworkAdapter::new(wifi, HttpClient::new(config.http_timeout_ms));

    // ── 5. Fingerprint sensor ─────────────────────────────────
    let sensor_uart = UartDriver::new(
        peripherals.uart2,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.fingerprint_baudrate)),
    )?;
    let sensor = As608::new(UartTransport::new(sensor_uart), FreeRtos);

    let mut io = Terminal::new(sensor, panel, SystemClock::new());
    let mut sink = LogEventSink::new();

    // ── 6. Enrollment bridge on the console UART ──────────────
    let console_uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio1,
        peripherals.pins.gpio3,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(pins::CONSOLE_BAUD)),
    )?;
    let mut bridge = BridgeEngine::new(UartTransport::new(console_uart), config.fingerprint_timeout_ms);

    // ── 7. App service ────────────────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut sink);
    if app.boot(&mut io, &mut sink) == StateId::Halted {
        error!("Fingerprint sensor not found; terminal halted");
        loop {
            io.delay_ms(1_000);
        }
    }

    info!("Terminal ready. Entering voting loop.");

    // ── 8. Voting loop ────────────────────────────────────────
    loop {
        if bridge.poll(&mut io) > 0 {
            app.rearm(&mut io);
        }
        app.tick(&mut io, &mut net, &mut sink);
        io.delay_ms(config.main_loop_delay_ms);
    }
}
