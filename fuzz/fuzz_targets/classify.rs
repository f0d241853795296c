//! Fuzz target for suffix-based format classification.
//!
//! Run with: cargo +nightly fuzz run classify
//!
//! Classification must never panic, and a write request never fails with
//! an unrecognized format: unknown names fall back to zip.

#![no_main]

use arcmill::format::{Intent, classify, default_stream_key};
use arcmill::{ArchiveFormat, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let read = classify(name, Intent::Read);
    match classify(name, Intent::Write) {
        Ok(format) => {
            assert!(format.is_writable());
            if read.is_err() {
                assert_eq!(format, ArchiveFormat::Zip);
            }
        }
        Err(e) => assert!(matches!(e, Error::ReadOnlyFormat { .. }), "{:?}", e),
    }
    let _ = default_stream_key(name);
});
