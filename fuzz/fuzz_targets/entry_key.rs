//! Fuzz target for entry key normalization and extraction path joining.
//!
//! Run with: cargo +nightly fuzz run entry_key
//!
//! Properties checked:
//! - Normalization is idempotent and leaves no leading separator
//! - A joined extraction path never leaves its root

#![no_main]

use std::path::Path;

use arcmill::key::{fold_key, normalize_key, safe_join};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(key) = std::str::from_utf8(data) else {
        return;
    };

    let normalized = normalize_key(key);
    assert_eq!(normalize_key(&normalized), normalized);
    assert!(
        !normalized.starts_with('/') && !normalized.contains('\\'),
        "separator left in {:?}",
        normalized
    );
    assert_eq!(fold_key(&normalized), fold_key(key));

    let root = Path::new("/fuzz/root");
    if let Ok(path) = safe_join(root, key) {
        assert!(path.starts_with(root), "{:?} escaped to {:?}", key, path);
    }
});
