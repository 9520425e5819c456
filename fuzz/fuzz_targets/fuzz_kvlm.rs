//! Fuzz target for KVLM (commit/tag) payload parsing.
//!
//! Tests that the KVLM decoder handles arbitrary input without
//! panicking, and that serialization of anything it accepts parses
//! back to an equal map.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relic_core::Kvlm;

fuzz_target!(|data: &[u8]| {
    if let Ok(kvlm) = Kvlm::parse(data) {
        let wire = kvlm.serialize();
        let reparsed = Kvlm::parse(&wire).expect("serialized form must parse");
        assert_eq!(reparsed, kvlm);
        // The codec's own output is a fixed point.
        assert_eq!(reparsed.serialize(), wire);
    }
});
