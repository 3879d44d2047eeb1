//! One-shot hardware peripheral initialization.
//!
//! Configures the expander interrupt input and registers its GPIO ISR
//! using raw ESP-IDF sys calls. Called once from `main()` before the
//! event loop starts. The I2C bus and LED outputs are owned by
//! `esp-idf-hal` drivers constructed in `main()`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Expander interrupt input ──────────────────────────────────

/// Configure the expander interrupt line: input, pull-down, rising edge.
#[cfg(target_os = "espidf")]
pub fn init_interrupt_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::EXPANDER_INT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    // SAFETY: called once from main() before the event loop; the config
    // struct outlives the call.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!("hw_init: expander INT on GPIO{} (pull-down, rising edge)", pins::EXPANDER_INT_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_interrupt_input() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): interrupt input skipped");
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::events::{Event, raise};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn expander_gpio_isr(_arg: *mut core::ffi::c_void) {
    // Bus reads are not ISR-safe; the host loop does the work.
    raise(Event::ExpanderInterrupt);
}

/// Install the GPIO ISR service and register the expander handler.
/// Call after [`init_interrupt_input`] and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). The handler is a static
    // function that only sets a bit in the atomic pending mask.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(
            pins::EXPANDER_INT_GPIO,
            Some(expander_gpio_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK as esp_err_t {
            return Err(HwInitError::IsrHandlerFailed(ret));
        }
        gpio_intr_enable(pins::EXPANDER_INT_GPIO);
    }
    info!("hw_init: ISR service installed (expander)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_init_succeeds() {
        assert!(init_interrupt_input().is_ok());
        assert!(init_isr_service().is_ok());
    }

    #[test]
    fn errors_carry_return_code() {
        assert_eq!(
            HwInitError::IsrInstallFailed(-1).to_string(),
            "GPIO ISR service install failed (rc=-1)"
        );
    }
}
