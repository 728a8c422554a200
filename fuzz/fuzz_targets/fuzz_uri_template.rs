#![no_main]

use googleapi::uri_template::expand;
use libfuzzer_sys::fuzz_target;
use percent_encoding::percent_decode_str;

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid quadratic blowup on brace-heavy inputs
    if data.len() > 4096 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary text as a template must never panic
    let _ = expand(s, &[("a", "x/y"), ("b", s)]);

    // A simple expansion decodes back to the substituted value
    let expanded = expand("{v}", &[("v", s)]);
    let decoded = percent_decode_str(&expanded).decode_utf8_lossy();
    assert_eq!(decoded, s);
});
