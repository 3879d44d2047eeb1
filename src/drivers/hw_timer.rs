//! Scheduler tick timer using ESP-IDF's esp_timer API.
//!
//! A single one-shot timer; the control service re-arms it after every
//! expiry. The callback only raises [`Event::TriggerTick`] in the pending
//! mask, the tick itself runs in the host loop.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call `raise()` which uses an `AtomicU32`.
//!
//! On simulation targets arming is a logged no-op; host tests drive
//! `ControlService::on_trigger_tick` directly.

use crate::app::ports::TimerPort;
use crate::error::TimerError;
#[cfg(target_os = "espidf")]
use crate::events::{Event, raise};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trigger_tick_cb(_arg: *mut core::ffi::c_void) {
    raise(Event::TriggerTick);
}

/// One-shot tick timer implementing [`TimerPort`].
pub struct TriggerTimer {
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
impl TriggerTimer {
    /// Create the underlying esp_timer. It is not started until
    /// [`arm_once`](TimerPort::arm_once).
    pub fn new() -> Result<Self, TimerError> {
        let args = esp_timer_create_args_t {
            callback: Some(trigger_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"trigger".as_ptr(),
            skip_unhandled_events: true,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: args and handle outlive the call; the callback is a static
        // function that only touches the atomic pending mask.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            log::error!("hw_timer: trigger timer create failed (rc={})", ret);
            return Err(TimerError::ArmFailed(ret));
        }
        log::info!("hw_timer: trigger timer created");
        Ok(Self { handle })
    }
}

#[cfg(target_os = "espidf")]
impl TimerPort for TriggerTimer {
    fn arm_once(&mut self, delay_ms: u32) -> Result<(), TimerError> {
        // SAFETY: handle was created in new() and is only deleted in drop().
        // Stopping an idle timer returns ESP_ERR_INVALID_STATE, which is fine.
        let ret = unsafe {
            esp_timer_stop(self.handle);
            esp_timer_start_once(self.handle, u64::from(delay_ms) * 1_000)
        };
        if ret != ESP_OK as esp_err_t {
            return Err(TimerError::ArmFailed(ret));
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl Drop for TriggerTimer {
    fn drop(&mut self) {
        // SAFETY: handle is valid until here and never used afterwards.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl TriggerTimer {
    pub fn new() -> Result<Self, TimerError> {
        log::info!("hw_timer(sim): trigger timer not started (ticks driven by caller)");
        Ok(Self {})
    }
}

#[cfg(not(target_os = "espidf"))]
impl TimerPort for TriggerTimer {
    fn arm_once(&mut self, delay_ms: u32) -> Result<(), TimerError> {
        log::debug!("hw_timer(sim): arm {}ms", delay_ms);
        Ok(())
    }
}
