//! ESP32 uptime clock adapter.
//!
//! Provides the monotonic millisecond reading the scheduler derives its
//! time of day from.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.

use crate::app::ports::ClockSource;

/// Milliseconds since boot.
pub struct UptimeClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockSource for UptimeClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        // SAFETY: reads the free-running RTC counter; no preconditions.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        us.max(0) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
