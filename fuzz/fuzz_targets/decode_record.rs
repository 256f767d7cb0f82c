#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        for hint in [None, Some("euring2000"), Some("euring2000plus"), Some("euring2020")] {
            let _ = euring::decode_with_hint(text, hint);
        }
    }
});
