//! Control service: the core that the host loop drives.
//!
//! [`ControlService`] owns the trigger scheduler and the input decoder and
//! routes both to the shared indicator. It exposes one handler per event
//! source; all I/O flows through port traits injected at call sites.
//!
//! ```text
//!  ClockSource ──▶ ┌─────────────────────────┐
//!  TimerPort   ◀──▶│      ControlService     │──▶ EventSink
//!  BusTransport──▶ │  Scheduler · Decoder    │
//!                  └────────────┬────────────┘
//!                               ▼
//!                         IndicatorPort
//! ```

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::actuator::{IndicatorState, RequestSource, Transition};
use crate::config::SystemConfig;
use crate::error::{ActuatorError, Error};
use crate::input::{DecodeOutcome, InputEventDecoder};
use crate::scheduler::{MAX_TRIGGERS, TickOutcome, TimeTriggerScheduler};

use super::events::AppEvent;
use super::ports::{BusTransport, ClockSource, EventSink, IndicatorPort, TimerPort};

/// Running counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub ticks: u32,
    pub daily_resets: u32,
    pub triggers_fired: u32,
    pub interrupts: u32,
    pub bus_faults: u32,
    pub clock_faults: u32,
    pub actuator_faults: u32,
    pub rearm_failures: u32,
}

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

pub struct ControlService {
    scheduler: TimeTriggerScheduler,
    decoder: InputEventDecoder,
    tick_interval_ms: u32,
    first_tick_delay_ms: u32,
    rearm_pending: bool,
    stats: ServiceStats,
}

impl ControlService {
    /// Build the scheduler and decoder from a validated configuration.
    pub fn new(config: &SystemConfig) -> Result<Self, Error> {
        config.validate()?;
        let scheduler = TimeTriggerScheduler::new(
            &config.triggers,
            config.trigger_state,
            config.clock_offset_minutes,
        )?;
        let decoder = InputEventDecoder::new(
            config.expander_address,
            config.input_settle_ms,
            &config.palette,
            config.button_actions,
        )?;

        Ok(Self {
            scheduler,
            decoder,
            tick_interval_ms: config.tick_interval_ms,
            first_tick_delay_ms: config.first_tick_delay_ms,
            rearm_pending: false,
            stats: ServiceStats::default(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Blank the indicator and arm the first scheduler tick.
    pub fn start(
        &mut self,
        indicator: &impl IndicatorPort,
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        let state = match indicator.request(IndicatorState::Off, RequestSource::Boot) {
            Ok(t) => t.to,
            Err(e) => {
                self.stats.actuator_faults += 1;
                sink.emit(&AppEvent::ActuatorFault(e));
                IndicatorState::Off
            }
        };
        sink.emit(&AppEvent::Started(state));
        info!(
            "ControlService started: {} trigger(s), tick every {}ms",
            self.scheduler.entries().len(),
            self.tick_interval_ms
        );
        self.arm(timer, self.first_tick_delay_ms, sink);
    }

    // ── Timer path ────────────────────────────────────────────

    /// Handle a scheduler timer expiry.
    ///
    /// The timer is re-armed before the tick runs, so it keeps running
    /// whether or not anything fires or the clock is rejected.
    pub fn on_trigger_tick(
        &mut self,
        clock: &impl ClockSource,
        indicator: &impl IndicatorPort,
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> Option<TickOutcome> {
        self.arm(timer, self.tick_interval_ms, sink);
        self.stats.ticks += 1;

        let observed = Observed::new(indicator);
        let outcome = match self.scheduler.tick(clock, &observed) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.clock_faults += 1;
                sink.emit(&AppEvent::ClockFault(e));
                return None;
            }
        };

        if outcome.daily_reset {
            self.stats.daily_resets += 1;
            sink.emit(&AppEvent::DailyReset(outcome.time));
        }
        for &index in &outcome.fired {
            self.stats.triggers_fired += 1;
            sink.emit(&AppEvent::TriggerFired {
                index,
                entry: self.scheduler.entries()[index],
            });
        }
        observed.flush(&mut self.stats, sink);
        Some(outcome)
    }

    /// Retry a failed re-arm. Call from every host loop iteration.
    pub fn poll_rearm(&mut self, timer: &mut impl TimerPort, sink: &mut impl EventSink) {
        if self.rearm_pending {
            self.arm(timer, self.tick_interval_ms, sink);
        }
    }

    fn arm(&mut self, timer: &mut impl TimerPort, delay_ms: u32, sink: &mut impl EventSink) {
        match timer.arm_once(delay_ms) {
            Ok(()) => self.rearm_pending = false,
            Err(e) => {
                if !self.rearm_pending {
                    error!("ControlService: tick timer arm failed: {}", e);
                    sink.emit(&AppEvent::TimerFault(e));
                }
                self.stats.rearm_failures += 1;
                self.rearm_pending = true;
            }
        }
    }

    // ── Interrupt path ────────────────────────────────────────

    /// Handle an expander interrupt: one read, one decode, at most one
    /// indicator request.
    pub fn on_expander_interrupt(
        &mut self,
        bus: &mut impl BusTransport,
        delay: &mut impl DelayNs,
        indicator: &impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Option<DecodeOutcome> {
        self.stats.interrupts += 1;

        let observed = Observed::new(indicator);
        let outcome = match self.decoder.on_interrupt(bus, delay, &observed) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.bus_faults += 1;
                sink.emit(&AppEvent::BusFault(e));
                return None;
            }
        };

        sink.emit(&AppEvent::InputDecoded {
            frame: outcome.frame,
            event: outcome.event,
            position: self.decoder.position().value(),
        });
        observed.flush(&mut self.stats, sink);
        Some(outcome)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    pub fn scheduler(&self) -> &TimeTriggerScheduler {
        &self.scheduler
    }

    pub fn decoder(&self) -> &InputEventDecoder {
        &self.decoder
    }

    /// `true` while the tick timer is waiting for a successful re-arm.
    pub fn rearm_pending(&self) -> bool {
        self.rearm_pending
    }
}

// ───────────────────────────────────────────────────────────────
// Request observer
// ───────────────────────────────────────────────────────────────

/// Pass-through [`IndicatorPort`] that remembers each result so the
/// service can report transitions after the scheduler or decoder returns.
struct Observed<'a, I> {
    inner: &'a I,
    results: RefCell<heapless::Vec<Result<Transition, ActuatorError>, MAX_TRIGGERS>>,
}

impl<'a, I: IndicatorPort> Observed<'a, I> {
    fn new(inner: &'a I) -> Self {
        Self {
            inner,
            results: RefCell::new(heapless::Vec::new()),
        }
    }

    fn flush(self, stats: &mut ServiceStats, sink: &mut impl EventSink) {
        for result in self.results.into_inner() {
            match result {
                Ok(t) => sink.emit(&AppEvent::IndicatorChanged(t)),
                Err(e) => {
                    stats.actuator_faults += 1;
                    sink.emit(&AppEvent::ActuatorFault(e));
                }
            }
        }
    }
}

impl<I: IndicatorPort> IndicatorPort for Observed<'_, I> {
    fn request(
        &self,
        state: IndicatorState,
        source: RequestSource,
    ) -> Result<Transition, ActuatorError> {
        let result = self.inner.request(state, source);
        // At most MAX_TRIGGERS requests per tick; extra results only go unreported.
        let _ = self.results.borrow_mut().push(result);
        result
    }
}
