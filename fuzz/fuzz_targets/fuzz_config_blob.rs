//! Fuzz target: `SystemConfig::from_postcard` / `from_json`
//!
//! Any blob either fails to load or yields a configuration that passes
//! validation and builds a control service.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use tricolor::app::service::ControlService;
use tricolor::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = SystemConfig::from_postcard(data) {
        assert!(cfg.validate().is_ok());
        assert!(ControlService::new(&cfg).is_ok());
    }

    if let Ok(text) = core::str::from_utf8(data) {
        if let Ok(cfg) = SystemConfig::from_json(text) {
            assert!(ControlService::new(&cfg).is_ok());
        }
    }
});
