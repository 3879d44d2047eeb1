//! Task Watchdog Timer (TWDT) driver.
//!
//! Subscribes the host-loop task to the ESP-IDF TWDT so a stalled loop
//! resets the device. The loop calls [`Watchdog::feed`] on every
//! iteration, well inside the timeout.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Host-loop stall tolerated before reset.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    ///
    /// Failure to subscribe is logged and leaves a watchdog that never
    /// feeds; the indicator keeps running either way.
    #[cfg(target_os = "espidf")]
    pub fn subscribe(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: called once from the host-loop task during startup.
        let subscribed = unsafe {
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK as esp_err_t {
                log::warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }
            let ret = esp_task_wdt_add(core::ptr::null_mut());
            if ret != ESP_OK as esp_err_t {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }
            ret == ESP_OK as esp_err_t
        };
        if subscribed {
            log::info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
        }
        Self { subscribed }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn subscribe(timeout_ms: u32) -> Self {
        log::info!("Watchdog(sim): no-op ({}ms)", timeout_ms);
        Self {}
    }

    /// Reset the watchdog countdown.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task subscribed in subscribe().
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
