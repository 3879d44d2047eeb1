//! Port traits: the boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (expander bus, clock, LED pins, tick timer, event sinks)
//! implement these traits. The [`ControlService`](super::service::ControlService)
//! consumes them via generics injected at call sites, so the scheduler and
//! decoder never touch hardware directly.

use crate::actuator::{IndicatorState, LedChannel, RequestSource, Transition};
use crate::error::{ActuatorError, BusError, OutputError, TimerError};

// ───────────────────────────────────────────────────────────────
// Bus transport (driven adapter: domain ↔ I/O expander)
// ───────────────────────────────────────────────────────────────

/// Blocking, bounded-time transactions against a device on the shared bus.
pub trait BusTransport {
    /// Write `tx`, then read exactly `rx.len()` bytes, as one transaction.
    fn transaction(&mut self, addr: u8, tx: &[u8], rx: &mut [u8]) -> Result<(), BusError>;

    /// Write-only transaction.
    fn write(&mut self, addr: u8, tx: &[u8]) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Clock source
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait ClockSource {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Indicator outputs (driven adapter: domain → LED pins)
// ───────────────────────────────────────────────────────────────

/// Raw per-channel writes. Only [`ActuatorController`] calls this.
///
/// [`ActuatorController`]: crate::actuator::ActuatorController
pub trait IndicatorOutputs {
    fn set_channel(&mut self, channel: LedChannel, on: bool) -> Result<(), OutputError>;
}

/// State-level requests. Implemented by the actuator controller; the
/// scheduler and decoder depend on this rather than on the controller type.
pub trait IndicatorPort {
    fn request(
        &self,
        state: IndicatorState,
        source: RequestSource,
    ) -> Result<Transition, ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Tick timer
// ───────────────────────────────────────────────────────────────

/// One-shot timer that raises [`Event::TriggerTick`](crate::events::Event::TriggerTick)
/// when it expires. Re-armed by the service after every expiry.
pub trait TimerPort {
    fn arm_once(&mut self, delay_ms: u32) -> Result<(), TimerError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
