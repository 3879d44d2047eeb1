//! Mock hardware adapters for integration tests.
//!
//! Records every pin write, bus transaction, and timer arm so tests can
//! assert on the full command history without touching real GPIO/I2C.

use std::cell::Cell;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use tricolor::actuator::LedChannel;
use tricolor::app::events::AppEvent;
use tricolor::app::ports::{BusTransport, ClockSource, EventSink, IndicatorOutputs, TimerPort};
use tricolor::error::{BusError, OutputError, TimerError};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub channel: LedChannel,
    pub on: bool,
}

// ── MockLeds ──────────────────────────────────────────────────

/// LED outputs that record every write and can be told to fail one.
pub struct MockLeds {
    pub writes: Vec<PinWrite>,
    pub levels: [bool; 3],
    pub fail_on: Option<LedChannel>,
}

#[allow(dead_code)]
impl MockLeds {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            levels: [false; 3],
            fail_on: None,
        }
    }

    pub fn lit(&self) -> Vec<LedChannel> {
        LedChannel::ALL
            .into_iter()
            .filter(|ch| self.levels[index(*ch)])
            .collect()
    }
}

impl Default for MockLeds {
    fn default() -> Self {
        Self::new()
    }
}

fn index(channel: LedChannel) -> usize {
    match channel {
        LedChannel::Red => 0,
        LedChannel::Green => 1,
        LedChannel::Blue => 2,
    }
}

impl IndicatorOutputs for MockLeds {
    fn set_channel(&mut self, channel: LedChannel, on: bool) -> Result<(), OutputError> {
        if on && self.fail_on == Some(channel) {
            return Err(OutputError::PinWriteFailed(channel));
        }
        self.levels[index(channel)] = on;
        self.writes.push(PinWrite { channel, on });
        Ok(())
    }
}

// ── MockBus ───────────────────────────────────────────────────

/// Expander bus that replays queued replies, one per transaction.
pub struct MockBus {
    pub replies: VecDeque<Result<[u8; 2], BusError>>,
    pub transactions: Vec<(u8, Vec<u8>)>,
    pub writes: Vec<(u8, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            transactions: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn queue(&mut self, port0: u8, port1: u8) -> &mut Self {
        self.replies.push_back(Ok([port0, port1]));
        self
    }

    pub fn queue_err(&mut self, err: BusError) -> &mut Self {
        self.replies.push_back(Err(err));
        self
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransport for MockBus {
    fn transaction(&mut self, addr: u8, tx: &[u8], rx: &mut [u8]) -> Result<(), BusError> {
        self.transactions.push((addr, tx.to_vec()));
        let reply = self.replies.pop_front().unwrap_or(Err(BusError::Timeout))?;
        rx.copy_from_slice(&reply[..rx.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u8, tx: &[u8]) -> Result<(), BusError> {
        self.writes.push((addr, tx.to_vec()));
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Clock set by the test.
pub struct MockClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    /// Set the clock to `hour:minute` on day `day` (0 = boot day).
    pub fn set_hm(&self, day: u64, hour: u64, minute: u64) {
        self.set(((day * 24 + hour) * 60 + minute) * 60_000);
    }
}

impl ClockSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── MockTimer ─────────────────────────────────────────────────

/// Timer that records arms and can fail the next `fail_next` of them.
pub struct MockTimer {
    pub armed: Vec<u32>,
    pub fail_next: u32,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn new() -> Self {
        Self {
            armed: Vec::new(),
            fail_next: 0,
        }
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerPort for MockTimer {
    fn arm_once(&mut self, delay_ms: u32) -> Result<(), TimerError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TimerError::ArmFailed(-1));
        }
        self.armed.push(delay_ms);
        Ok(())
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Delay that returns immediately and records requested milliseconds.
#[derive(Default)]
pub struct MockDelay {
    pub total_ms: u32,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
