//! Time-of-day trigger scheduler.
//!
//! Owns a fixed table of daily `(hour, minute)` triggers and one
//! "fired today" flag per entry. Each tick derives wall-clock time from the
//! monotonic uptime clock, clears the flags when a new day begins, and asks
//! the [`IndicatorPort`] for the trigger state once per matching entry.
//!
//! ```text
//! ┌────────────┐  now_ms   ┌──────────────────────┐  request(Alert)  ┌────────────┐
//! │ ClockSource│──────────▶│ TimeTriggerScheduler │─────────────────▶│ Actuator   │
//! └────────────┘           │  entries · fired[]   │                  │ Controller │
//!                          └──────────────────────┘                  └────────────┘
//! ```
//!
//! ## Daily reset
//!
//! The reset is edge-gated on the day index (`minutes / 1440`): it happens on
//! the first tick of each new day. When ticks arrive at least once a minute
//! that is the 00:00 tick, and further ticks inside 00:00 do not reset again.
//! The first tick after boot always counts as a new day; on all-false flags
//! that reset is a no-op.
//!
//! ## Skipped minutes
//!
//! The tick timer is one-shot and re-armed from the host loop, so ticks drift
//! by the dispatch latency and occasionally step over a whole minute. Each
//! tick therefore covers every minute since the previous tick, bounded to the
//! last [`CATCH_UP_MINUTES`]. Minutes are walked in order, so a skipped
//! 23:59 entry fires before the reset for the new day.

use log::{info, warn};

use crate::actuator::{IndicatorState, RequestSource};
use crate::app::ports::{ClockSource, IndicatorPort};
use crate::error::{ClockError, Error};

// ═══════════════════════════════════════════════════════════════
//  Time types
// ═══════════════════════════════════════════════════════════════

/// Maximum number of trigger entries (stack-allocated).
pub const MAX_TRIGGERS: usize = 8;

pub const MS_PER_MINUTE: u64 = 60_000;
pub const MINUTES_PER_DAY: u64 = 24 * 60;
/// How far back one tick looks for minutes it stepped over.
pub const CATCH_UP_MINUTES: u64 = 5;

/// A daily trigger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TriggerEntry {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute of hour, 0-59.
    pub minute: u8,
}

impl TriggerEntry {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.hour > 23 {
            return Err(Error::Config("trigger hour must be 0-23"));
        }
        if self.minute > 59 {
            return Err(Error::Config("trigger minute must be 0-59"));
        }
        Ok(())
    }

    fn matches(&self, time: WallTime) -> bool {
        self.hour == time.hour && self.minute == time.minute
    }
}

/// Hour and minute derived from the uptime clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
}

impl WallTime {
    /// Derive the time of day from milliseconds since boot.
    ///
    /// `offset_minutes` is the wall-clock time at boot; 0 means boot is
    /// treated as midnight.
    pub fn from_uptime_ms(ms: u64, offset_minutes: u16) -> Self {
        Self::from_minutes(absolute_minutes(ms, offset_minutes))
    }

    fn from_minutes(minutes: u64) -> Self {
        Self {
            hour: ((minutes / 60) % 24) as u8,
            minute: (minutes % 60) as u8,
        }
    }

    pub const fn is_midnight(&self) -> bool {
        self.hour == 0 && self.minute == 0
    }
}

impl core::fmt::Display for WallTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn absolute_minutes(ms: u64, offset_minutes: u16) -> u64 {
    ms / MS_PER_MINUTE + u64::from(offset_minutes)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub time: WallTime,
    /// Flags were cleared on this tick.
    pub daily_reset: bool,
    /// Indices of the entries that fired on this tick.
    pub fired: heapless::Vec<usize, MAX_TRIGGERS>,
}

pub struct TimeTriggerScheduler {
    entries: heapless::Vec<TriggerEntry, MAX_TRIGGERS>,
    fired: [bool; MAX_TRIGGERS],
    fire_state: IndicatorState,
    offset_minutes: u16,
    last_ms: Option<u64>,
    last_minute: Option<u64>,
    last_day: Option<u64>,
}

impl TimeTriggerScheduler {
    /// Build a scheduler over `entries`. Duplicate entries are accepted and
    /// fire together.
    pub fn new(
        entries: &[TriggerEntry],
        fire_state: IndicatorState,
        offset_minutes: u16,
    ) -> Result<Self, Error> {
        let mut table = heapless::Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if entries[..i].contains(entry) {
                warn!("Scheduler: duplicate trigger {:02}:{:02}", entry.hour, entry.minute);
            }
            table
                .push(*entry)
                .map_err(|_| Error::Config("too many trigger entries"))?;
        }
        if u64::from(offset_minutes) >= MINUTES_PER_DAY {
            return Err(Error::Config("clock offset must be below 1440 minutes"));
        }
        info!("Scheduler: {} trigger(s) loaded", table.len());

        Ok(Self {
            entries: table,
            fired: [false; MAX_TRIGGERS],
            fire_state,
            offset_minutes,
            last_ms: None,
            last_minute: None,
            last_day: None,
        })
    }

    pub fn entries(&self) -> &[TriggerEntry] {
        &self.entries
    }

    /// "Fired today" flags, indexed like [`entries`](Self::entries).
    pub fn fired_flags(&self) -> &[bool] {
        &self.fired[..self.entries.len()]
    }

    /// Read the clock and run one tick.
    pub fn tick(
        &mut self,
        clock: &impl ClockSource,
        indicator: &impl IndicatorPort,
    ) -> Result<TickOutcome, ClockError> {
        self.tick_at(clock.now_ms(), indicator)
    }

    /// Run one tick against an explicit clock reading.
    ///
    /// A reading below the previous one is rejected and leaves every flag
    /// untouched.
    pub fn tick_at(
        &mut self,
        now_ms: u64,
        indicator: &impl IndicatorPort,
    ) -> Result<TickOutcome, ClockError> {
        if let Some(last_ms) = self.last_ms {
            if now_ms < last_ms {
                warn!("Scheduler: clock went backwards ({}ms -> {}ms), tick skipped", last_ms, now_ms);
                return Err(ClockError::Regressed { last_ms, now_ms });
            }
        }
        self.last_ms = Some(now_ms);

        let now_minute = absolute_minutes(now_ms, self.offset_minutes);
        let time = WallTime::from_minutes(now_minute);
        let first = match self.last_minute {
            Some(last) => (last + 1).max((now_minute + 1).saturating_sub(CATCH_UP_MINUTES)),
            None => now_minute,
        };
        self.last_minute = Some(now_minute);

        let mut daily_reset = false;
        let mut fired = heapless::Vec::new();
        for minute in first..=now_minute {
            let day = minute / MINUTES_PER_DAY;
            if self.last_day != Some(day) {
                self.last_day = Some(day);
                self.reset_daily();
                daily_reset = true;
                info!("Scheduler: daily reset at {}", WallTime::from_minutes(minute));
            }
            self.fire_due(WallTime::from_minutes(minute), time, indicator, &mut fired);
        }

        Ok(TickOutcome {
            time,
            daily_reset,
            fired,
        })
    }

    fn fire_due(
        &mut self,
        due: WallTime,
        now: WallTime,
        indicator: &impl IndicatorPort,
        fired: &mut heapless::Vec<usize, MAX_TRIGGERS>,
    ) {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.fired[i] || !entry.matches(due) {
                continue;
            }
            if due == now {
                info!("Scheduler: trigger #{} fired at {}", i, now);
            } else {
                info!("Scheduler: trigger #{} for {} fired late at {}", i, due, now);
            }
            if let Err(e) = indicator.request(self.fire_state, RequestSource::Schedule) {
                // Still counts as fired: one request per occurrence.
                warn!("Scheduler: trigger #{} request failed: {}", i, e);
            }
            self.fired[i] = true;
            // An entry matches one minute of day and the window is shorter
            // than a day, so each index is pushed at most once.
            let _ = fired.push(i);
        }
    }

    /// Clear every "fired today" flag. Idempotent.
    pub fn reset_daily(&mut self) {
        self.fired = [false; MAX_TRIGGERS];
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
