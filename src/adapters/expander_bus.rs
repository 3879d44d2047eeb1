//! I/O expander bus adapter.
//!
//! [`ExpanderBus`] wraps any `embedded_hal::i2c::I2c` implementation
//! (the ESP-IDF `I2cDriver` on the device, a mock in tests) and exposes it
//! as a [`BusTransport`]. Transfer timeouts are enforced by the underlying
//! driver configuration.
//!
//! Startup also lives here: [`init_expander`] writes the expander's
//! configuration registers, retrying each write with exponential backoff.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{info, warn};

use crate::app::ports::BusTransport;
use crate::error::BusError;

/// Expander configuration writes, applied in order at startup.
///
/// 1. interrupt-mask / edge configuration
/// 2. port0 direction (rotary inputs)
/// 3. port1 direction + pull-ups (buttons)
pub const INIT_SEQUENCE: [&[u8]; 3] = [&[0x10, 0x3B], &[0x18, 0x00], &[0x1B, 0xFF, 0x00]];

/// Concrete [`BusTransport`] over an embedded-hal I2C bus.
pub struct ExpanderBus<I> {
    i2c: I,
}

impl<I: I2c> ExpanderBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give the underlying bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> BusTransport for ExpanderBus<I> {
    fn transaction(&mut self, addr: u8, tx: &[u8], rx: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .write_read(addr, tx, rx)
            .map_err(|e| BusError::from(e.kind()))
    }

    fn write(&mut self, addr: u8, tx: &[u8]) -> Result<(), BusError> {
        self.i2c.write(addr, tx).map_err(|e| BusError::from(e.kind()))
    }
}

// ── Retry ─────────────────────────────────────────────────────

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub attempts: u8,
    /// Delay after the first failure; doubled after each further failure.
    pub backoff_ms: u32,
}

impl RetryPolicy {
    /// Longest single backoff step.
    pub const MAX_BACKOFF_MS: u32 = 100;

    fn backoff_for(&self, failure: u8) -> u32 {
        let factor = 1u32 << u32::from(failure.min(16));
        self.backoff_ms.saturating_mul(factor).min(Self::MAX_BACKOFF_MS)
    }
}

/// Write `bytes` to `addr`, retrying per `policy`. Returns the last error
/// once every attempt has failed.
pub fn write_with_retry(
    bus: &mut impl BusTransport,
    delay: &mut impl DelayNs,
    addr: u8,
    bytes: &[u8],
    policy: RetryPolicy,
) -> Result<(), BusError> {
    let attempts = policy.attempts.max(1);
    let mut last = BusError::Other;

    for attempt in 0..attempts {
        match bus.write(addr, bytes) {
            Ok(()) => return Ok(()),
            Err(e) => {
                last = e;
                if attempt + 1 < attempts {
                    delay.delay_ms(policy.backoff_for(attempt));
                }
            }
        }
    }

    warn!(
        "ExpanderBus: write {:02X?} to 0x{:02X} failed after {} attempts: {}",
        bytes, addr, attempts, last
    );
    Err(last)
}

/// Apply [`INIT_SEQUENCE`] to the expander at `addr`.
///
/// Stops at the first write that exhausts its retries.
pub fn init_expander(
    bus: &mut impl BusTransport,
    delay: &mut impl DelayNs,
    addr: u8,
    policy: RetryPolicy,
) -> Result<(), BusError> {
    for bytes in INIT_SEQUENCE {
        write_with_retry(bus, delay, addr, bytes, policy)?;
    }
    info!("ExpanderBus: expander 0x{:02X} configured", addr);
    Ok(())
}
