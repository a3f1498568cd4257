//! Fuzz target for security identifier parsing.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_sid_parsing -- -max_total_time=600

#![no_main]

use ldapkit::sid::{is_valid_sid, SecurityIdentifier};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Binary form: decoding must not panic, and a decoded SID is valid text
    if let Ok(sid) = SecurityIdentifier::from_bytes(data) {
        assert!(is_valid_sid(&sid.to_string()));
    }

    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(sid) = s.parse::<SecurityIdentifier>() {
            // Round-trip through Display
            let reparsed: SecurityIdentifier = sid.to_string().parse().unwrap();
            assert_eq!(sid, reparsed);
        }
    }
});
