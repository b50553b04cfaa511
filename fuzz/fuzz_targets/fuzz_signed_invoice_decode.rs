#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    if let Ok(signed) = serde_json::from_slice::<fne::core::SignedInvoice>(data) {
        let _ = fne::core::validate_submission(&signed.invoice);
    }
    let _ = serde_json::from_slice::<fne::client::Submitted>(data);
});
