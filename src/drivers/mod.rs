//! Indicator outputs, tick timer, interrupt setup, and watchdog.

pub mod hw_init;
pub mod hw_timer;
pub mod status_led;
pub mod watchdog;
