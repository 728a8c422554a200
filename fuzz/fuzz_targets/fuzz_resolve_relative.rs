#![no_main]

use googleapi::resolve_relative;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        // Malformed references are reported as errors, never panics
        let _ = resolve_relative("https://www.googleapis.com/storage/v1/", s);
    }
});
