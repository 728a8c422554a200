#![no_main]

use googleapi::check_response_with_body;
use http::{HeaderMap, StatusCode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    // Any body on a non-2xx status yields an error carrying that body
    let err = check_response_with_body(StatusCode::BAD_REQUEST, &HeaderMap::new(), data)
        .expect_err("non-2xx status must produce an error");
    assert_eq!(err.body, String::from_utf8_lossy(data));

    // Rendering the message must not panic either
    let _ = err.to_string();
});
