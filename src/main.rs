//! Tri-colour Indicator Firmware: main entry point
//!
//! Hexagonal architecture with interrupt-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ExpanderBus     UptimeClock    TriggerTimer    LogEventSink   │
//! │  (BusTransport)  (ClockSource)  (TimerPort)     (EventSink)    │
//! │  StatusLed ──▶ ActuatorController (IndicatorPort)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ControlService (pure logic)                 │    │
//! │  │  TimeTriggerScheduler · InputEventDecoder              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GPIO ISR / esp_timer ──▶ pending mask ──▶ host loop           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use tricolor::actuator::ActuatorController;
use tricolor::adapters::config_store::ConfigStore;
use tricolor::adapters::expander_bus::{ExpanderBus, RetryPolicy, init_expander};
use tricolor::adapters::log_sink::LogEventSink;
use tricolor::adapters::time::UptimeClock;
use tricolor::app::service::ControlService;
use tricolor::config::SystemConfig;
use tricolor::drivers::hw_init;
use tricolor::drivers::hw_timer::TriggerTimer;
use tricolor::drivers::status_led::StatusLed;
use tricolor::drivers::watchdog::{WATCHDOG_TIMEOUT_MS, Watchdog};
use tricolor::events::{self, Event};
use tricolor::pins;

/// Host-loop idle sleep between drains.
const LOOP_SLEEP_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Tricolor v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Configuration ──────────────────────────────────────
    let config = match EspDefaultNvsPartition::take()
        .map_err(|_| tricolor::error::Error::Init("NVS partition unavailable"))
        .and_then(ConfigStore::open)
    {
        Ok(store) => store.load_or_default(),
        Err(e) => {
            warn!("Config store unavailable ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    let mut service = ControlService::new(&config)?;

    // ── 3. Indicator outputs ──────────────────────────────────
    // SAFETY: each GPIO number in `pins` is used exactly once.
    let (red, green, blue) = unsafe {
        (
            AnyOutputPin::new(pins::LED_R_GPIO),
            AnyOutputPin::new(pins::LED_G_GPIO),
            AnyOutputPin::new(pins::LED_B_GPIO),
        )
    };
    let indicator = ActuatorController::new(StatusLed::new(
        PinDriver::output(red)?,
        PinDriver::output(green)?,
        PinDriver::output(blue)?,
    ));
    if let Err(e) = indicator.init() {
        error!("Indicator init failed: {}", e);
    }

    // ── 4. Expander bus ───────────────────────────────────────
    // SAFETY: see above.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c_config = I2cConfig::new()
        .baudrate(Hertz(pins::I2C_BAUDRATE_HZ))
        .timeout(core::time::Duration::from_millis(u64::from(config.bus_timeout_ms)).into());
    let mut bus = ExpanderBus::new(I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?);
    let mut delay = Delay::new_default();

    let retry = RetryPolicy {
        attempts: config.bus_retry_attempts,
        backoff_ms: config.bus_retry_backoff_ms,
    };
    if let Err(e) = init_expander(&mut bus, &mut delay, config.expander_address, retry) {
        // Inputs stay dead until reset; schedule still runs.
        error!("Expander init failed: {}, continuing without inputs", e);
    }

    // ── 5. Interrupt + timer ──────────────────────────────────
    hw_init::init_interrupt_input()?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, continuing without inputs", e);
    }
    let mut timer = TriggerTimer::new().map_err(tricolor::error::Error::from)?;
    let watchdog = Watchdog::subscribe(WATCHDOG_TIMEOUT_MS);

    // ── 6. Start ──────────────────────────────────────────────
    let clock = UptimeClock::new();
    let mut sink = LogEventSink::new();
    service.start(&indicator, &mut timer, &mut sink);

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    loop {
        events::drain_events(|event| match event {
            Event::ExpanderInterrupt => {
                service.on_expander_interrupt(&mut bus, &mut delay, &indicator, &mut sink);
            }
            Event::TriggerTick => {
                service.on_trigger_tick(&clock, &indicator, &mut timer, &mut sink);
            }
        });

        service.poll_rearm(&mut timer, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_SLEEP_MS);
    }
}
