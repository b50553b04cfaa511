#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(err) = serde_json::from_slice::<fne::client::ServiceError>(data) {
        let _ = err.to_string();
    }
});
