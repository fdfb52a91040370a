#![no_main]

use libfuzzer_sys::fuzz_target;
use sanctuary::store::SessionState;

fuzz_target!(|data: &[u8]| {
    // Any record that parses must serialize back and parse to the same phase.
    if let Ok(state) = serde_json::from_slice::<SessionState>(data) {
        let raw = serde_json::to_string(&state).expect("serialize parsed record");
        let again: SessionState = serde_json::from_str(&raw).expect("reparse record");
        assert_eq!(state.phase, again.phase);
    }
});
