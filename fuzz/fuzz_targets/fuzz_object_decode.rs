//! Fuzz target for object payload decoding across all four kinds.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relic_core::{Object, ObjectKind};

fuzz_target!(|data: &[u8]| {
    for kind in [
        ObjectKind::Blob,
        ObjectKind::Tree,
        ObjectKind::Commit,
        ObjectKind::Tag,
    ] {
        if let Ok(object) = Object::decode(kind, data) {
            assert_eq!(object.kind(), kind);
            let _ = object.id();
        }
    }
});
