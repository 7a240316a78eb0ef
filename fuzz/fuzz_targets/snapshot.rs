#![no_main]

use libfuzzer_sys::fuzz_target;
use wpt_harness::store::VersionSnapshot;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // A decoded snapshot must encode and decode back to the same result
        if let Ok(snapshot) = VersionSnapshot::from_json(s) {
            let json = snapshot.to_json().unwrap();
            let again = VersionSnapshot::from_json(&json).unwrap();
            assert_eq!(again.result, snapshot.result);
        }
    }
});
