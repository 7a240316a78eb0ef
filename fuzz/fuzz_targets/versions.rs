#![no_main]

use libfuzzer_sys::fuzz_target;
use wpt_harness::report::{compare_versions, sort_newest_first};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut versions: Vec<&str> = s.split('\n').collect();
        for pair in versions.windows(2) {
            let _ = compare_versions(pair[0], pair[1]);
        }
        // Sorting must terminate and keep every id
        let before = versions.len();
        sort_newest_first(&mut versions, |v| *v);
        assert_eq!(versions.len(), before);
    }
});
