//! Fuzz target for distinguished name decomposition.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_dn_parsing -- -max_total_time=600

#![no_main]

use ldapkit::codec::{escape, unescape, EscapeContext};
use ldapkit::dn::{explode_dn, parent_dn, split_dn};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary input must not panic
    let components = split_dn(s);
    assert_eq!(explode_dn(s).len(), components.len());
    let _ = parent_dn(s);

    // An escaped value is always exactly one component. Unescaped trailing
    // whitespace other than a space is trimmed with the component.
    let value = escape(s, "", EscapeContext::DistinguishedName);
    let dn = format!("cn={value},dc=corp,dc=org");
    let values = explode_dn(&dn);
    assert_eq!(values.len(), 3);
    assert_eq!(unescape(&values[0]).trim_end(), s.trim_end());
});
