#![no_main]
//! Fuzz target for sticky config TOML parsing
//!
//! Feeds random bytes as TOML to the config parser to find panics,
//! hangs, or unexpected behavior in deserialization and sanitizing.

use libfuzzer_sys::fuzz_target;

use sticky::{StickyConfig, StickyOverrides};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Sanitized configs must always carry usable class names
        if let Ok(config) = StickyConfig::from_toml_str(s) {
            assert!(!config.stuck_class.is_empty());
            assert!(!config.unstuck_class.is_empty());
        }
        if let Ok(overrides) = toml::from_str::<StickyOverrides>(s) {
            let merged = StickyConfig::default().merged(&overrides);
            assert!(!merged.stuck_class.chars().any(char::is_whitespace));
        }
    }
});
