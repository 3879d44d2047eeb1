//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::actuator::{IndicatorState, Transition};
use crate::error::{ActuatorError, BusError, ClockError, TimerError};
use crate::input::{LogicalInputEvent, RawInputFrame};
use crate::scheduler::{TriggerEntry, WallTime};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial indicator state).
    Started(IndicatorState),

    /// Trigger flags were cleared for a new day.
    DailyReset(WallTime),

    /// A daily trigger fired.
    TriggerFired { index: usize, entry: TriggerEntry },

    /// An expander frame was read and decoded.
    InputDecoded {
        frame: RawInputFrame,
        event: LogicalInputEvent,
        position: u8,
    },

    /// The indicator changed state.
    IndicatorChanged(Transition),

    /// An indicator request could not be applied.
    ActuatorFault(ActuatorError),

    /// An input read failed; the event was dropped.
    BusFault(BusError),

    /// A tick was skipped because the clock could not be trusted.
    ClockFault(ClockError),

    /// The tick timer could not be re-armed; retried from the host loop.
    TimerFault(TimerError),
}
