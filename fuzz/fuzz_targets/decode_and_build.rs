#![no_main]

use libfuzzer_sys::fuzz_target;

// A record that decodes cleanly must rebuild into a record that decodes
// cleanly as the same format.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(record) = euring::decode(text, None) else {
        return;
    };
    if record.is_valid() {
        let rebuilt = euring::build(record.format(), record.values_by_key(), true)
            .expect("valid record rebuilds");
        let again = euring::decode(&rebuilt, Some(record.format())).expect("rebuilt record decodes");
        assert!(again.is_valid());
    }
});
