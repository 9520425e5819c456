//! Fuzz target for tree payload parsing.
//!
//! Tests that the tree decoder handles arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = relic_core::Tree::decode(data) {
        // Decoded entries always carry a recognized, normalized mode.
        for entry in &tree.entries {
            assert_eq!(entry.mode.len(), 6);
            entry.kind().unwrap();
        }
        let _ = tree.encode();
    }
});
