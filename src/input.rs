//! Interrupt-driven expander input decoder.
//!
//! ## Hardware
//!
//! The I/O expander pulls its interrupt line whenever one of its inputs
//! changes. The decoder answers each interrupt with exactly one read of the
//! expander's input-status register pair and turns the two raw bytes into at
//! most one [`LogicalInputEvent`].
//!
//! ## Bit layout
//!
//! | Byte  | Bit | Meaning                        |
//! |-------|-----|--------------------------------|
//! | port0 | 7   | rotary A                       |
//! | port0 | 6   | rotary B                       |
//! | port1 | 2   | button 1 (active-low)          |
//! | port1 | 3   | button 2 (active-low)          |
//! | port1 | 4   | button 3 (active-low)          |
//!
//! ## Priority
//!
//! Rules are evaluated top to bottom and the first match consumes the
//! frame: rotary up, rotary down, button 1, button 2, button 3.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::actuator::{IndicatorState, RequestSource};
use crate::app::ports::{BusTransport, IndicatorPort};
use crate::error::{BusError, Error};

/// Register-select bytes for the input-status read.
pub const INPUT_STATUS_REQUEST: [u8; 2] = [0x1C, 0x08];
/// Bytes returned by one input-status read.
pub const FRAME_LEN: usize = 2;

pub const ROTARY_A_MASK: u8 = 0x80;
pub const ROTARY_B_MASK: u8 = 0x40;
/// Number of front-panel buttons.
pub const BUTTON_COUNT: usize = 3;
/// Button bits in port1, indexed by button number minus one.
pub const BUTTON_MASKS: [u8; BUTTON_COUNT] = [0x04, 0x08, 0x10];

/// Maximum palette length (rotary positions).
pub const MAX_PALETTE: usize = 8;

// ── Frame / event types ───────────────────────────────────────

/// Two raw bytes read from the expander. Not retained past one decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputFrame {
    pub port0: u8,
    pub port1: u8,
}

impl RawInputFrame {
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self {
            port0: bytes[0],
            port1: bytes[1],
        }
    }

    /// Apply the priority rules. At most one event per frame.
    pub fn decode(&self) -> LogicalInputEvent {
        let a = self.port0 & ROTARY_A_MASK != 0;
        let b = self.port0 & ROTARY_B_MASK != 0;

        if a && b {
            return LogicalInputEvent::RotaryUp;
        }
        if a {
            return LogicalInputEvent::RotaryDown;
        }
        BUTTON_MASKS
            .iter()
            .position(|mask| self.port1 & mask == 0)
            .map_or(LogicalInputEvent::None, |i| LogicalInputEvent::Button(i as u8 + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalInputEvent {
    RotaryUp,
    RotaryDown,
    /// 1-based button number.
    Button(u8),
    None,
}

/// Rotary selector position in `[0, modulus)`, wrapping both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotaryPosition {
    value: u8,
    modulus: u8,
}

impl RotaryPosition {
    /// `modulus` must be non-zero.
    pub fn new(modulus: u8) -> Result<Self, Error> {
        if modulus == 0 {
            return Err(Error::Config("rotary modulus must be non-zero"));
        }
        Ok(Self { value: 0, modulus })
    }

    pub const fn value(&self) -> u8 {
        self.value
    }

    pub fn increment(&mut self) {
        self.value = if self.value + 1 >= self.modulus {
            0
        } else {
            self.value + 1
        };
    }

    pub fn decrement(&mut self) {
        self.value = if self.value == 0 {
            self.modulus - 1
        } else {
            self.value - 1
        };
    }
}

/// Result of one serviced interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub frame: RawInputFrame,
    pub event: LogicalInputEvent,
    /// State handed to the indicator, if the event maps to one.
    pub requested: Option<IndicatorState>,
    /// Set when the indicator refused the request.
    pub request_failed: bool,
}

// ── Decoder ───────────────────────────────────────────────────

pub struct InputEventDecoder {
    expander_addr: u8,
    settle_ms: u32,
    position: RotaryPosition,
    palette: heapless::Vec<IndicatorState, MAX_PALETTE>,
    button_actions: [Option<IndicatorState>; BUTTON_COUNT],
}

impl InputEventDecoder {
    pub fn new(
        expander_addr: u8,
        settle_ms: u32,
        palette: &[IndicatorState],
        button_actions: [Option<IndicatorState>; BUTTON_COUNT],
    ) -> Result<Self, Error> {
        let palette = heapless::Vec::from_slice(palette)
            .map_err(|_| Error::Config("palette too long"))?;
        let position = RotaryPosition::new(palette.len() as u8)?;
        Ok(Self {
            expander_addr,
            settle_ms,
            position,
            palette,
            button_actions,
        })
    }

    pub fn position(&self) -> RotaryPosition {
        self.position
    }

    /// Service one expander interrupt.
    ///
    /// Performs a single input-status read. On bus failure nothing is
    /// mutated and the indicator is not touched; the next edge retries.
    pub fn on_interrupt(
        &mut self,
        bus: &mut impl BusTransport,
        delay: &mut impl DelayNs,
        indicator: &impl IndicatorPort,
    ) -> Result<DecodeOutcome, BusError> {
        let mut rx = [0u8; FRAME_LEN];
        if let Err(e) = bus.transaction(self.expander_addr, &INPUT_STATUS_REQUEST, &mut rx) {
            warn!("Decoder: input read failed ({}), event dropped", e);
            return Err(e);
        }
        // The expander needs a moment before its latched state is valid again.
        delay.delay_ms(self.settle_ms);

        let frame = RawInputFrame::from_bytes(rx);
        let event = frame.decode();
        debug!("Decoder: frame {:02X} {:02X} -> {:?}", frame.port0, frame.port1, event);

        // The knob index only moves once the indicator accepted its colour.
        let mut next = self.position;
        let request = match event {
            LogicalInputEvent::RotaryUp => {
                next.increment();
                Some((self.palette_state(next), RequestSource::Rotary))
            }
            LogicalInputEvent::RotaryDown => {
                next.decrement();
                Some((self.palette_state(next), RequestSource::Rotary))
            }
            LogicalInputEvent::Button(n) => {
                info!("Decoder: button {} pressed", n);
                self.button_actions[usize::from(n) - 1].map(|state| (state, RequestSource::Button(n)))
            }
            LogicalInputEvent::None => None,
        };

        let requested = request.map(|(state, _)| state);
        let request_failed = request
            .is_some_and(|(state, source)| indicator.request(state, source).is_err());
        if request_failed {
            warn!("Decoder: indicator refused {:?}, position stays {}", event, self.position.value());
        } else {
            self.position = next;
        }

        Ok(DecodeOutcome {
            frame,
            event,
            requested,
            request_failed,
        })
    }

    fn palette_state(&self, position: RotaryPosition) -> IndicatorState {
        self.palette[usize::from(position.value())]
    }
}
