//! System configuration parameters
//!
//! All tunable parameters for the indicator controller. Defaults reproduce
//! the stock board: three daily alerts, a green/blue/red rotary palette and
//! a one-minute scheduler tick. A provisioned configuration can be loaded
//! from JSON or from a compact postcard blob; both paths validate.

use serde::{Deserialize, Serialize};

use crate::actuator::IndicatorState;
use crate::error::Error;
use crate::input::{BUTTON_COUNT, MAX_PALETTE};
use crate::scheduler::{MAX_TRIGGERS, MINUTES_PER_DAY, TriggerEntry};

/// Default 7-bit address of the I/O expander.
pub const DEFAULT_EXPANDER_ADDR: u8 = 0x28;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Scheduler ---
    /// Daily trigger times, fired in declaration order.
    pub triggers: heapless::Vec<TriggerEntry, MAX_TRIGGERS>,
    /// State requested when a trigger fires.
    pub trigger_state: IndicatorState,
    /// Wall-clock time at boot, in minutes after midnight.
    pub clock_offset_minutes: u16,
    /// Scheduler tick period (milliseconds). Must not exceed one minute.
    pub tick_interval_ms: u32,
    /// Delay before the first scheduler tick after boot (milliseconds).
    pub first_tick_delay_ms: u32,

    // --- Input ---
    /// Colours selectable with the rotary knob; its length is the number of
    /// rotary positions.
    pub palette: heapless::Vec<IndicatorState, MAX_PALETTE>,
    /// State requested by each button, `None` for no action.
    pub button_actions: [Option<IndicatorState>; BUTTON_COUNT],

    // --- Expander bus ---
    pub expander_address: u8,
    /// Delay after the input read before the frame is decoded (milliseconds).
    pub input_settle_ms: u32,
    /// Upper bound for a single bus transaction (milliseconds).
    pub bus_timeout_ms: u32,
    /// Attempts per initialisation write.
    pub bus_retry_attempts: u8,
    /// First retry backoff (milliseconds), doubled per attempt.
    pub bus_retry_backoff_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut triggers = heapless::Vec::new();
        for entry in [
            TriggerEntry::new(0, 1),
            TriggerEntry::new(12, 0),
            TriggerEntry::new(18, 0),
        ] {
            let _ = triggers.push(entry);
        }

        let mut palette = heapless::Vec::new();
        for state in [IndicatorState::Green, IndicatorState::Blue, IndicatorState::Red] {
            let _ = palette.push(state);
        }

        Self {
            // Scheduler
            triggers,
            trigger_state: IndicatorState::Alert,
            clock_offset_minutes: 0,
            tick_interval_ms: 60_000,  // 1/min
            first_tick_delay_ms: 1_000,

            // Input
            palette,
            button_actions: [
                Some(IndicatorState::Green), // acknowledge: all clear
                Some(IndicatorState::Blue),
                None,
            ],

            // Expander bus
            expander_address: DEFAULT_EXPANDER_ADDR,
            input_settle_ms: 2,
            bus_timeout_ms: 50,
            bus_retry_attempts: 10,
            bus_retry_backoff_ms: 1,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), Error> {
        for entry in &self.triggers {
            entry.validate()?;
        }
        if u64::from(self.clock_offset_minutes) >= MINUTES_PER_DAY {
            return Err(Error::Config("clock_offset_minutes must be 0-1439"));
        }
        if !(1..=60_000).contains(&self.tick_interval_ms) {
            return Err(Error::Config("tick_interval_ms must be 1-60000"));
        }
        if self.first_tick_delay_ms > 60_000 {
            return Err(Error::Config("first_tick_delay_ms must be 0-60000"));
        }
        if self.palette.is_empty() {
            return Err(Error::Config("palette must not be empty"));
        }
        if self.expander_address > 0x7F {
            return Err(Error::Config("expander_address must be a 7-bit address"));
        }
        if self.input_settle_ms > 50 {
            return Err(Error::Config("input_settle_ms must be 0-50"));
        }
        if !(1..=1_000).contains(&self.bus_timeout_ms) {
            return Err(Error::Config("bus_timeout_ms must be 1-1000"));
        }
        if self.bus_retry_attempts == 0 {
            return Err(Error::Config("bus_retry_attempts must be at least 1"));
        }
        if self.bus_retry_backoff_ms > 100 {
            return Err(Error::Config("bus_retry_backoff_ms must be 0-100"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON configuration"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Decode and validate a postcard configuration blob.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, Error> {
        let cfg: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("corrupted configuration blob"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
