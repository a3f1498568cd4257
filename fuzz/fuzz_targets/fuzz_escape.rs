//! Fuzz target for value escaping.
//!
//! Escaping in any context must survive unescaping unchanged, and
//! unescaping arbitrary input must never panic.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_escape -- -max_total_time=600

#![no_main]

use ldapkit::codec::{escape, unescape, EscapeContext};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&flag, rest)) = data.split_first() else {
        return;
    };

    let input = String::from_utf8_lossy(rest);
    let _ = unescape(&input);

    let context = EscapeContext::from_flag(flag % 4);
    let escaped = escape(&input, "", context);
    assert_eq!(unescape(&escaped), input);

    // Ignored characters must pass through untouched
    let ignored = escape(&input, "*", context);
    assert_eq!(unescape(&ignored), input);
});
