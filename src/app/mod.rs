//! Application core: control logic wiring, zero direct I/O.
//!
//! Ties the time-trigger scheduler and the input decoder to the actuator
//! controller. All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer testable without peripherals.

pub mod events;
pub mod ports;
pub mod service;
