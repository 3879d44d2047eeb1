//! Unified error types for the indicator firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! host loop's error handling uniform. All variants are `Copy` so they can be
//! returned from interrupt-adjacent paths without allocation.
//!
//! Nothing in here is fatal: every kind degrades to "skip this cycle".

use core::fmt;

use crate::actuator::LedChannel;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An expander bus transaction failed or timed out.
    Bus(BusError),
    /// The reference clock produced an implausible reading.
    Clock(ClockError),
    /// An indicator state change could not be applied.
    Actuator(ActuatorError),
    /// The tick timer could not be armed.
    Timer(TimerError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus transport errors
// ---------------------------------------------------------------------------

/// Failure of a single expander bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The device did not acknowledge its address or a data byte.
    Nack,
    /// The transaction did not complete within the bus timeout.
    Timeout,
    /// Another master won arbitration, or the bus is stuck.
    Arbitration,
    /// Any other controller-level failure.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::Timeout => write!(f, "transaction timed out"),
            Self::Arbitration => write!(f, "arbitration lost"),
            Self::Other => write!(f, "bus error"),
        }
    }
}

impl From<embedded_hal::i2c::ErrorKind> for BusError {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss | ErrorKind::Bus => Self::Arbitration,
            _ => Self::Other,
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

/// The clock source returned a value the scheduler cannot trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Reading went backwards relative to the previous tick.
    Regressed { last_ms: u64, now_ms: u64 },
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regressed { last_ms, now_ms } => {
                write!(f, "clock unavailable (went from {last_ms}ms to {now_ms}ms)")
            }
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Output / actuator errors
// ---------------------------------------------------------------------------

/// A physical output write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    PinWriteFailed(LedChannel),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWriteFailed(ch) => write!(f, "{ch:?} pin write failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The output sequence was interrupted; previous state was kept.
    Output(OutputError),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(e) => write!(f, "{e}"),
        }
    }
}

impl From<OutputError> for ActuatorError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The platform refused to start the one-shot timer (raw return code).
    ArmFailed(i32),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArmFailed(rc) => write!(f, "arm failed (rc={rc})"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
