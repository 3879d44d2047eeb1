//! Tri-colour status LED driver.
//!
//! Three discrete GPIO outputs drive the R/G/B LEDs (or a common-cathode
//! RGB part). Channel levels only; which channel is lit is decided by the
//! [`ActuatorController`](crate::actuator::ActuatorController).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: three `PinDriver` outputs.
//! On host/test: any `embedded_hal::digital::OutputPin` mock.

use embedded_hal::digital::OutputPin;

use crate::actuator::LedChannel;
use crate::app::ports::IndicatorOutputs;
use crate::error::OutputError;

pub struct StatusLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> StatusLed<R, G, B> {
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self { red, green, blue }
    }

    pub fn into_pins(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

fn drive(pin: &mut impl OutputPin, on: bool) -> bool {
    let result = if on { pin.set_high() } else { pin.set_low() };
    result.is_ok()
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> IndicatorOutputs for StatusLed<R, G, B> {
    fn set_channel(&mut self, channel: LedChannel, on: bool) -> Result<(), OutputError> {
        let ok = match channel {
            LedChannel::Red => drive(&mut self.red, on),
            LedChannel::Green => drive(&mut self.green, on),
            LedChannel::Blue => drive(&mut self.blue, on),
        };
        if ok {
            Ok(())
        } else {
            Err(OutputError::PinWriteFailed(channel))
        }
    }
}
