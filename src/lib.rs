//! Tri-colour indicator firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuator;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod pins;
pub mod scheduler;

// Platform-facing modules; host builds get simulation stubs.
pub mod adapters;
pub mod drivers;
