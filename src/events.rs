//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - the expander interrupt line (GPIO ISR)
//! - the scheduler's one-shot timer (esp_timer task)
//!
//! and consumed by the host loop, which drains them in priority order and
//! runs the matching handler outside interrupt context.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO ISR    │────▶│ Pending mask │────▶│  Host loop   │
//! │ Timer cb    │────▶│ (lock-free)  │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue is a bitmask rather than a ring: two producers in different
//! contexts can raise concurrently with a single `fetch_or`, and repeated
//! raises of the same event before a drain coalesce into one. Coalescing is
//! fine for both events: the decoder re-reads the expander's current state,
//! and the scheduler derives time from the clock rather than counting ticks.

use core::sync::atomic::{AtomicU32, Ordering};

/// System event types. Lower discriminant = handled first when several
/// are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Expander raised its interrupt line.
    ExpanderInterrupt = 0,
    /// Scheduler tick timer expired.
    TriggerTick = 1,
}

impl Event {
    const ALL: [Event; 2] = [Event::ExpanderInterrupt, Event::TriggerTick];

    const fn bit(self) -> u32 {
        1 << self as u8
    }
}

static PENDING: AtomicU32 = AtomicU32::new(0);

/// Mark an event pending. Safe to call from ISR context (lock-free).
pub fn raise(event: Event) {
    PENDING.fetch_or(event.bit(), Ordering::Release);
}

/// Take every pending event and hand each to `handler`, highest priority
/// first. Events raised while handlers run are kept for the next drain.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    let pending = PENDING.swap(0, Ordering::AcqRel);
    for event in Event::ALL {
        if pending & event.bit() != 0 {
            handler(event);
        }
    }
}

/// Check if any event is pending.
pub fn is_pending() -> bool {
    PENDING.load(Ordering::Acquire) != 0
}
