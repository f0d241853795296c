//! Entry key normalization and comparison.
//!
//! Keys are the slash-separated relative paths that identify entries. Every
//! membership test, collision check and lookup in the engine goes through
//! [`normalize_key`] first and then compares case-insensitively, so
//! `Dir\File.TXT`, `/dir/file.txt` and `dir/file.txt` all name the same entry.
//! The original spelling is preserved when a key is written back out.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Normalizes an entry key.
///
/// Backslashes become forward slashes and leading slashes are stripped.
/// Case is preserved.
///
/// # Examples
///
/// ```
/// use arcmill::key::normalize_key;
///
/// assert_eq!(normalize_key("\\dir\\file.txt"), "dir/file.txt");
/// assert_eq!(normalize_key("//Docs/Readme"), "Docs/Readme");
/// ```
pub fn normalize_key(key: &str) -> String {
    key.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Returns the comparison form of a key: normalized and lower-cased.
pub fn fold_key(key: &str) -> String {
    normalize_key(key).to_lowercase()
}

/// Compares two keys for equality the way the engine does.
pub fn keys_equal(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// Orders keys case-insensitively, breaking ties ordinally so the order is
/// total and stable.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Removes `prefix` from the front of `key`, ignoring case.
///
/// Both sides are normalized first. Returns `None` when the key does not
/// start with the prefix. An empty prefix matches every key.
pub fn strip_prefix_ignore_case(key: &str, prefix: &str) -> Option<String> {
    let key = normalize_key(key);
    let prefix = normalize_key(prefix);
    if prefix.is_empty() {
        return Some(key);
    }
    let head = key.get(..prefix.len())?;
    if head.to_lowercase() != prefix.to_lowercase() {
        return None;
    }
    let rest = &key[prefix.len()..];
    // "docs" strips "docs/a" but not "docs2/a".
    if !prefix.ends_with('/') && !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(rest.trim_start_matches('/').to_string())
}

/// A set of keys with case-insensitive, normalization-aware membership.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    folded: HashSet<String>,
}

impl KeySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key. Returns `false` if an equivalent key was present.
    pub fn insert(&mut self, key: &str) -> bool {
        self.folded.insert(fold_key(key))
    }

    /// Returns whether an equivalent key is in the set.
    pub fn contains(&self, key: &str) -> bool {
        self.folded.contains(&fold_key(key))
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.folded.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeySet::new();
        for key in iter {
            set.insert(key.as_ref());
        }
        set
    }
}

/// Resolves an entry key to a path under `dest`.
///
/// Fails with [`Error::PathTraversal`] when the key has `..` segments, a
/// drive or root prefix, or otherwise would land outside `dest`.
pub fn safe_join(dest: &Path, key: &str) -> Result<PathBuf> {
    let normalized = normalize_key(key);
    let mut out = dest.to_path_buf();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal {
                    key: key.to_string(),
                });
            }
        }
    }
    if !out.starts_with(dest) {
        return Err(Error::PathTraversal {
            key: key.to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("a\\b\\c.txt"), "a/b/c.txt");
        assert_eq!(normalize_key("/abs/path"), "abs/path");
        assert_eq!(normalize_key("\\\\share\\x"), "share/x");
        assert_eq!(normalize_key("Dir/"), "Dir/");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_keys_equal_ignores_case_and_separators() {
        assert!(keys_equal("Dir\\File.TXT", "/dir/file.txt"));
        assert!(!keys_equal("dir/file.txt", "dir/file.txt.bak"));
    }

    #[test]
    fn test_compare_keys() {
        let mut keys = vec!["b.txt", "A.txt", "a.txt", "C"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, vec!["A.txt", "a.txt", "b.txt", "C"]);
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(
            strip_prefix_ignore_case("Src/lib/a.rs", "src/"),
            Some("lib/a.rs".to_string())
        );
        assert_eq!(
            strip_prefix_ignore_case("src\\lib\\a.rs", "SRC"),
            Some("lib/a.rs".to_string())
        );
        assert_eq!(strip_prefix_ignore_case("docs/a.md", "src/"), None);
        assert_eq!(strip_prefix_ignore_case("docs2/a.md", "docs"), None);
        assert_eq!(
            strip_prefix_ignore_case("a.md", ""),
            Some("a.md".to_string())
        );
    }

    #[test]
    fn test_key_set() {
        let set: KeySet = ["Dir\\A.txt", "b.txt"].into_iter().collect();
        assert!(set.contains("dir/a.txt"));
        assert!(set.contains("/B.TXT"));
        assert!(!set.contains("c.txt"));
        assert_eq!(set.len(), 2);

        let mut set = KeySet::new();
        assert!(set.is_empty());
        assert!(set.insert("x"));
        assert!(!set.insert("X"));
    }

    #[test]
    fn test_safe_join() {
        let dest = Path::new("/tmp/out");
        assert_eq!(
            safe_join(dest, "a/b.txt").unwrap(),
            PathBuf::from("/tmp/out/a/b.txt")
        );
        assert_eq!(
            safe_join(dest, "/etc/passwd").unwrap(),
            PathBuf::from("/tmp/out/etc/passwd")
        );
        assert!(matches!(
            safe_join(dest, "../escape.txt"),
            Err(Error::PathTraversal { .. })
        ));
        assert!(safe_join(dest, "a/../../b").is_err());
    }
}
