//! Mutation planning.
//!
//! A plan is computed from the archive listing and the additions alone. It
//! never touches the destination, so every failure here leaves the archive
//! and its surroundings exactly as they were.

use std::path::Path;

use crate::Result;
use crate::codec;
use crate::format::{ArchiveFormat, classify_for_write};
use crate::key::KeySet;
use crate::write::{PlannedAddition, check_entry_count};

/// An existing entry that survives the mutation.
#[derive(Debug, Clone)]
pub(crate) struct PlannedEntry {
    pub(crate) key: String,
    pub(crate) size: u64,
    pub(crate) is_directory: bool,
}

/// Which entries a rebuild carries over and which it adds.
#[derive(Debug)]
pub(crate) struct MutationPlan {
    pub(crate) format: ArchiveFormat,
    pub(crate) kept: Vec<PlannedEntry>,
    pub(crate) additions: Vec<PlannedAddition>,
    pub(crate) removed: usize,
    pub(crate) total_entries: usize,
    pub(crate) total_bytes: u64,
    dropped: KeySet,
}

impl MutationPlan {
    /// Plans a rebuild of `path` that drops every entry whose key is in
    /// `dropped` and appends `additions`.
    ///
    /// The format is derived from the path for writing, so read-only formats
    /// fail here. Directory entries match `dropped` without their trailing
    /// `/` and are otherwise carried over.
    pub(crate) fn build(
        path: &Path,
        dropped: KeySet,
        additions: Vec<PlannedAddition>,
    ) -> Result<Self> {
        let format = classify_for_write(path)?;
        let entries = codec::open_reader(path, format)?.entries()?;

        let mut kept = Vec::new();
        let mut removed = 0;
        for entry in entries {
            if dropped.contains(entry.key.trim_end_matches('/')) {
                removed += 1;
            } else {
                kept.push(PlannedEntry {
                    size: if entry.is_directory { 0 } else { entry.size },
                    is_directory: entry.is_directory,
                    key: entry.key,
                });
            }
        }

        let total_entries = kept.len() + additions.len();
        check_entry_count(format, total_entries)?;
        let total_bytes = kept.iter().map(|e| e.size).sum::<u64>()
            + additions.iter().map(|a| a.size).sum::<u64>();

        log::debug!(
            "planned rebuild of '{}': {} kept, {} removed, {} added",
            path.display(),
            kept.len(),
            removed,
            additions.len()
        );
        Ok(Self {
            format,
            kept,
            additions,
            removed,
            total_entries,
            total_bytes,
            dropped,
        })
    }

    /// Whether an existing entry is carried over.
    pub(crate) fn keeps(&self, key: &str) -> bool {
        !self.dropped.contains(key.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::write::{self, CreateOptions};
    use std::fs;

    fn sample_zip(dir: &Path) -> std::path::PathBuf {
        let root = dir.join("src");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), b"aaaa").unwrap();
        fs::write(root.join("sub").join("b.txt"), b"bb").unwrap();
        let archive = dir.join("sample.zip");
        write::create(&archive, &[&root], &CreateOptions::new()).unwrap();
        archive
    }

    #[test]
    fn test_plan_counts() {
        let dir = tempfile::tempdir().unwrap();
        let archive = sample_zip(dir.path());

        let dropped: KeySet = ["SRC/A.TXT"].into_iter().collect();
        let plan = MutationPlan::build(&archive, dropped, Vec::new()).unwrap();
        assert_eq!(plan.format, ArchiveFormat::Zip);
        assert_eq!(plan.removed, 1);
        assert_eq!(plan.kept.len(), 1);
        assert_eq!(plan.kept[0].key, "src/sub/b.txt");
        assert_eq!(plan.total_entries, 1);
        assert_eq!(plan.total_bytes, 2);
        assert!(plan.keeps("src/sub/b.txt"));
        assert!(!plan.keeps("src/a.txt"));
    }

    #[test]
    fn test_plan_keeps_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("top");
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::create_dir_all(root.join("gone")).unwrap();
        fs::write(root.join("f.txt"), b"ffff").unwrap();
        let archive = dir.path().join("dirs.tar");
        write::create(&archive, &[&root], &CreateOptions::new()).unwrap();

        let dropped: KeySet = ["top/gone"].into_iter().collect();
        let plan = MutationPlan::build(&archive, dropped, Vec::new()).unwrap();

        assert_eq!(plan.removed, 1);
        assert_eq!(plan.total_entries, 2);
        assert_eq!(plan.total_bytes, 4);
        let empty = plan.kept.iter().find(|e| e.is_directory).unwrap();
        assert_eq!(empty.key, "top/empty/");
        assert!(plan.keeps("top/empty/"));
        assert!(!plan.keeps("top/gone/"));
    }

    #[test]
    fn test_plan_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let err = MutationPlan::build(&dir.path().join("none.zip"), KeySet::new(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
