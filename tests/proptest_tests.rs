//! Property-based tests using proptest.
//!
//! These tests check the key rules every operation relies on, plus a few
//! archive-level invariants on small generated inputs.

mod common;

use std::cmp::Ordering;
use std::fs;

use arcmill::key::{compare_keys, fold_key, keys_equal, normalize_key, safe_join};
use arcmill::{Error, MutateOptions, mutate};
use common::{build_archive, file_keys};
use proptest::prelude::*;

/// Strategy for raw keys as they appear in foreign archives: mixed
/// separators, leading slashes and mixed case.
fn raw_key_strategy() -> impl Strategy<Value = String> {
    (
        "[/\\\\]{0,2}",
        proptest::collection::vec("[a-zA-Z0-9_.-]{1,8}", 1..4),
        proptest::collection::vec(prop_oneof![Just('/'), Just('\\')], 3),
    )
        .prop_map(|(lead, parts, seps)| {
            let mut key = lead;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    key.push(seps[i - 1]);
                }
                key.push_str(part);
            }
            key
        })
}

/// Strategy for simple file names that are safe on every platform.
fn file_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}\\.txt"
}

proptest! {
    /// Normalizing twice changes nothing.
    #[test]
    fn normalize_is_idempotent(key in raw_key_strategy()) {
        let once = normalize_key(&key);
        prop_assert_eq!(normalize_key(&once), once.clone());
        prop_assert!(!once.starts_with('/'));
        prop_assert!(!once.contains('\\'));
    }

    /// Case and separator differences never make two keys distinct.
    #[test]
    fn fold_ignores_case_and_separators(key in raw_key_strategy()) {
        let variant = key.to_uppercase().replace('/', "\\");
        prop_assert!(keys_equal(&key, &variant));
        prop_assert_eq!(fold_key(&key), fold_key(&variant));
    }

    /// Key ordering is a total order consistent with equality of strings.
    #[test]
    fn compare_keys_is_antisymmetric(a in raw_key_strategy(), b in raw_key_strategy()) {
        let forward = compare_keys(&a, &b);
        prop_assert_eq!(forward, compare_keys(&b, &a).reverse());
        prop_assert_eq!(forward == Ordering::Equal, a == b);
    }

    /// Joining a key below a root never leaves the root.
    #[test]
    fn safe_join_stays_inside(
        parts in proptest::collection::vec(prop_oneof![
            Just("..".to_string()),
            Just(".".to_string()),
            "[a-z]{1,5}",
        ], 1..6)
    ) {
        let root = std::path::Path::new("/extract/root");
        let key = parts.join("/");
        match safe_join(root, &key) {
            Ok(path) => prop_assert!(path.starts_with(root)),
            Err(e) => prop_assert!(
                matches!(e, Error::PathTraversal { .. }),
                "unexpected error {:?}",
                e
            ),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Deleting the same keys twice gives the same archive as deleting once.
    #[test]
    fn delete_is_idempotent(
        names in proptest::collection::btree_set(file_name_strategy(), 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = names.into_iter().collect();
        let files: Vec<(&str, &[u8])> = names
            .iter()
            .map(|n| (n.as_str(), n.as_bytes()))
            .collect();
        let archive = build_archive(dir.path(), "p.zip", &files);
        let victim = pick.get(&names).to_uppercase();

        mutate::delete_entries(&archive, &[&victim], &MutateOptions::new()).unwrap();
        let once = fs::read(&archive).unwrap();
        let again = mutate::delete_entries(&archive, &[&victim], &MutateOptions::new()).unwrap();

        prop_assert!(again.is_unchanged());
        prop_assert_eq!(fs::read(&archive).unwrap(), once);
        prop_assert_eq!(file_keys(&archive).len(), names.len() - 1);
    }
}
