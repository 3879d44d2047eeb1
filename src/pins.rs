//! GPIO / peripheral pin assignments for the indicator board.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// I/O expander
// ---------------------------------------------------------------------------

/// Expander interrupt output. Idle low (pull-down), pulses high on change.
pub const EXPANDER_INT_GPIO: i32 = 12;

pub const I2C_SCL_GPIO: i32 = 15;
pub const I2C_SDA_GPIO: i32 = 16;
/// Standard-mode bus clock.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Tri-colour indicator (discrete LEDs, active high)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 9;
pub const LED_G_GPIO: i32 = 11;
/// Yellow on some board revisions.
pub const LED_B_GPIO: i32 = 7;
