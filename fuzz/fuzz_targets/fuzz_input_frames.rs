//! Fuzz target: `InputEventDecoder::on_interrupt`
//!
//! Replays arbitrary expander frames (two bytes each, a trailing odd byte
//! is a failed read) through the decoder into a real actuator controller
//! and asserts that the rotary position stays in range and that no two
//! LED channels are ever lit together.
//!
//! cargo fuzz run fuzz_input_frames

#![no_main]

use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;
use tricolor::actuator::{ActuatorController, IndicatorState, LedChannel};
use tricolor::app::ports::{BusTransport, IndicatorOutputs};
use tricolor::error::{BusError, OutputError};
use tricolor::input::InputEventDecoder;

struct FrameBus<'a> {
    chunks: core::slice::Chunks<'a, u8>,
}

impl BusTransport for FrameBus<'_> {
    fn transaction(&mut self, _addr: u8, _tx: &[u8], rx: &mut [u8]) -> Result<(), BusError> {
        match self.chunks.next() {
            Some(chunk) if chunk.len() == rx.len() => {
                rx.copy_from_slice(chunk);
                Ok(())
            }
            _ => Err(BusError::Timeout),
        }
    }

    fn write(&mut self, _addr: u8, _tx: &[u8]) -> Result<(), BusError> {
        Ok(())
    }
}

#[derive(Default)]
struct Leds([bool; 3]);

impl IndicatorOutputs for Leds {
    fn set_channel(&mut self, channel: LedChannel, on: bool) -> Result<(), OutputError> {
        let i = LedChannel::ALL.iter().position(|c| *c == channel).unwrap_or(0);
        self.0[i] = on;
        assert!(self.0.iter().filter(|l| **l).count() <= 1, "two channels lit");
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fuzz_target!(|data: &[u8]| {
    let mut decoder = InputEventDecoder::new(
        0x28,
        0,
        &[IndicatorState::Green, IndicatorState::Blue, IndicatorState::Red],
        [Some(IndicatorState::Green), Some(IndicatorState::Blue), None],
    )
    .expect("valid decoder");
    let indicator = ActuatorController::new(Leds::default());
    let mut bus = FrameBus {
        chunks: data.chunks(2),
    };

    for _ in 0..data.len().div_ceil(2) {
        let before = decoder.position();
        match decoder.on_interrupt(&mut bus, &mut NoDelay, &indicator) {
            Ok(_) => assert!(decoder.position().value() < 3),
            Err(_) => assert_eq!(decoder.position(), before),
        }
    }
});
