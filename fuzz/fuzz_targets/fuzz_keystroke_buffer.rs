#![no_main]

use libfuzzer_sys::fuzz_target;
use sanctuary::config::KeyConfig;
use sanctuary::trigger::KeystrokeBuffer;

fuzz_target!(|data: &str| {
    let config = KeyConfig::default();
    let mut buffer = KeystrokeBuffer::from_config(&config);
    for c in data.chars() {
        let fired = buffer.push(c).is_some_and(|r| r.fired());
        assert!(buffer.len() <= config.buffer_cap);
        if fired {
            assert!(buffer.is_empty());
        }
    }
});
