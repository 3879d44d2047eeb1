//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | indicator={:?}", state);
            }
            AppEvent::DailyReset(time) => {
                info!("TRIG  | daily reset at {}", time);
            }
            AppEvent::TriggerFired { index, entry } => {
                info!(
                    "TRIG  | #{} fired ({:02}:{:02})",
                    index, entry.hour, entry.minute
                );
            }
            AppEvent::InputDecoded {
                frame,
                event,
                position,
            } => {
                info!(
                    "INPUT | p0=0x{:02X} p1=0x{:02X} | {:?} | pos={}",
                    frame.port0, frame.port1, event, position
                );
            }
            AppEvent::IndicatorChanged(t) => {
                info!("LED   | {:?} -> {:?} ({:?})", t.from, t.to, t.source);
            }
            AppEvent::ActuatorFault(e) => warn!("FAULT | indicator: {}", e),
            AppEvent::BusFault(e) => warn!("FAULT | expander bus: {}", e),
            AppEvent::ClockFault(e) => warn!("FAULT | clock: {}", e),
            AppEvent::TimerFault(e) => warn!("FAULT | tick timer: {}", e),
        }
    }
}
