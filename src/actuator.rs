//! Indicator actuator controller.
//!
//! [`ActuatorController`] is the single owner of the physical indicator
//! outputs and the single source of truth for the applied
//! [`IndicatorState`]. Both the scheduler (timer path) and the input
//! decoder (interrupt path) go through [`IndicatorPort::request`]; nothing
//! else writes the LED pins.
//!
//! ```text
//!  TimeTriggerScheduler ──┐
//!                         ├──▶ request() ──▶ critical section ──▶ R/G/B pins
//!  InputEventDecoder ─────┘
//! ```
//!
//! Every request runs to completion inside a critical section, so two
//! contexts racing on the indicator are totally ordered and the last
//! applied request wins. Within a request, de-asserted channels are driven
//! low before the new channel is driven high: no two colours are ever lit
//! at the same instant.

use core::cell::RefCell;

use critical_section::Mutex;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{IndicatorOutputs, IndicatorPort};
use crate::error::{ActuatorError, OutputError};

/// One physical LED channel of the tri-colour indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedChannel {
    Red,
    Green,
    /// Third channel; fitted with a yellow LED on some boards.
    Blue,
}

impl LedChannel {
    pub const ALL: [LedChannel; 3] = [LedChannel::Red, LedChannel::Green, LedChannel::Blue];
}

/// Mutually exclusive output combinations the indicator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorState {
    Off,
    Green,
    Blue,
    Red,
    /// Red raised by a time trigger; cleared by the acknowledge button.
    Alert,
}

impl IndicatorState {
    /// The one channel this state asserts, if any.
    pub const fn lit_channel(self) -> Option<LedChannel> {
        match self {
            Self::Off => None,
            Self::Green => Some(LedChannel::Green),
            Self::Blue => Some(LedChannel::Blue),
            Self::Red | Self::Alert => Some(LedChannel::Red),
        }
    }

    pub const fn is_alert(self) -> bool {
        matches!(self, Self::Alert)
    }
}

/// Who asked for a state change. Carried into logs and [`Transition`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Boot,
    Schedule,
    Rotary,
    Button(u8),
}

/// Result of an applied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: IndicatorState,
    pub to: IndicatorState,
    pub source: RequestSource,
}

struct Inner<O> {
    outputs: O,
    state: IndicatorState,
    applied: u32,
}

/// Serialized owner of the indicator outputs.
pub struct ActuatorController<O> {
    inner: Mutex<RefCell<Inner<O>>>,
}

impl<O: IndicatorOutputs> ActuatorController<O> {
    /// Take ownership of the outputs. The pins are not touched until
    /// [`init`](Self::init) or the first request.
    pub fn new(outputs: O) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                outputs,
                state: IndicatorState::Off,
                applied: 0,
            })),
        }
    }

    /// Drive every channel low and record `Off`.
    pub fn init(&self) -> Result<(), ActuatorError> {
        self.request(IndicatorState::Off, RequestSource::Boot)
            .map(|_| ())
    }

    /// Currently applied state.
    pub fn state(&self) -> IndicatorState {
        critical_section::with(|cs| self.inner.borrow_ref(cs).state)
    }

    /// Number of requests applied successfully since construction.
    pub fn applied_count(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).applied)
    }

    /// Run `f` against the owned outputs (diagnostics and tests).
    pub fn with_outputs<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs).outputs))
    }

    fn apply(
        inner: &mut Inner<O>,
        next: IndicatorState,
        source: RequestSource,
    ) -> Result<Transition, OutputError> {
        let target = next.lit_channel();
        let mut result = Ok(());

        for channel in LedChannel::ALL {
            if Some(channel) != target {
                result = inner.outputs.set_channel(channel, false);
                if result.is_err() {
                    break;
                }
            }
        }
        if let (Ok(()), Some(channel)) = (result, target) {
            result = inner.outputs.set_channel(channel, true);
        }

        if let Err(e) = result {
            Self::restore(inner);
            return Err(e);
        }

        let from = inner.state;
        inner.state = next;
        inner.applied = inner.applied.wrapping_add(1);
        Ok(Transition {
            from,
            to: next,
            source,
        })
    }

    /// Best-effort return to the levels of the last applied state.
    fn restore(inner: &mut Inner<O>) {
        let lit = inner.state.lit_channel();
        for channel in LedChannel::ALL {
            if Some(channel) != lit {
                let _ = inner.outputs.set_channel(channel, false);
            }
        }
        if let Some(channel) = lit {
            let _ = inner.outputs.set_channel(channel, true);
        }
    }
}

impl<O: IndicatorOutputs> IndicatorPort for ActuatorController<O> {
    fn request(
        &self,
        state: IndicatorState,
        source: RequestSource,
    ) -> Result<Transition, ActuatorError> {
        let result =
            critical_section::with(|cs| Self::apply(&mut self.inner.borrow_ref_mut(cs), state, source));

        match result {
            Ok(t) => {
                debug!("Actuator: {:?} -> {:?} ({:?})", t.from, t.to, t.source);
                Ok(t)
            }
            Err(e) => {
                warn!("Actuator: {:?} request from {:?} failed: {}", state, source, e);
                Err(e.into())
            }
        }
    }
}
