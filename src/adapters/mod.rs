//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                  |
//! |----------------|---------------|------------------------------|
//! | `config_store` | -             | NVS / in-memory blob         |
//! | `expander_bus` | BusTransport  | I/O expander over I2C        |
//! | `log_sink`     | EventSink     | Serial log output            |
//! | `time`         | ClockSource   | ESP32 high-resolution timer  |
//!
//! The indicator outputs and the tick timer are drivers and live in
//! [`crate::drivers`].

pub mod config_store;
pub mod expander_bus;
pub mod log_sink;
pub mod time;
