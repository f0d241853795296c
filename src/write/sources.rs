//! Source collection for creation and mutation.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::codec::ContainerWriter;
use crate::key::{fold_key, normalize_key};
use crate::{Error, Result};

/// Where the bytes of a planned addition come from.
#[derive(Debug, Clone)]
pub(crate) enum AdditionSource {
    /// A file on disk, opened when the entry is written.
    File(PathBuf),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// A directory entry with no data.
    Directory,
}

/// One entry to be written into a new container.
#[derive(Debug, Clone)]
pub(crate) struct PlannedAddition {
    pub(crate) key: String,
    pub(crate) source: AdditionSource,
    pub(crate) size: u64,
    pub(crate) modified: Option<SystemTime>,
}

impl PlannedAddition {
    pub(crate) fn from_bytes(key: String, data: Vec<u8>, modified: Option<SystemTime>) -> Self {
        Self {
            key,
            size: data.len() as u64,
            source: AdditionSource::Bytes(data),
            modified,
        }
    }

    pub(crate) fn is_directory(&self) -> bool {
        matches!(self.source, AdditionSource::Directory)
    }
}

/// Builds a key from the normal components of a relative path.
fn key_from_relative(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    normalize_key(&parts.join("/"))
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Expands files and directories into planned additions.
///
/// A plain file contributes one entry keyed by its file name. A directory is
/// walked recursively and each entry is keyed relative to the directory's
/// parent, so `/a/b` yields `b/c/d.txt` for `/a/b/c/d.txt`. Empty
/// directories become directory entries. Entries keep the walk order.
///
/// When two sources produce the same key (ignoring case) the later one
/// replaces the earlier one in place.
pub(crate) fn collect_sources<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PlannedAddition>> {
    let mut additions: Vec<PlannedAddition> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut push = |addition: PlannedAddition| {
        let folded = fold_key(addition.key.trim_end_matches('/'));
        match positions.get(&folded) {
            Some(&index) => {
                log::debug!("source key '{}' given twice, keeping the last", addition.key);
                additions[index] = addition;
            }
            None => {
                positions.insert(folded, additions.len());
                additions.push(addition);
            }
        }
    };

    for source in sources {
        let source = source.as_ref();
        let metadata = fs::metadata(source).map_err(|e| Error::InvalidSource {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        if metadata.is_file() {
            let key = source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            push(PlannedAddition {
                key,
                source: AdditionSource::File(source.to_path_buf()),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
            continue;
        }
        if !metadata.is_dir() {
            return Err(Error::InvalidSource {
                path: source.to_path_buf(),
                reason: "not a regular file or directory".into(),
            });
        }

        let base = source.parent().unwrap_or(Path::new(""));
        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry.map_err(|e| Error::InvalidSource {
                path: e.path().unwrap_or(source).to_path_buf(),
                reason: e.to_string(),
            })?;
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                log::warn!("skipping symbolic link '{}'", entry.path().display());
                continue;
            }

            let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
            let key = key_from_relative(relative);
            if file_type.is_dir() {
                if key.is_empty() || !is_empty_dir(entry.path()) {
                    continue;
                }
                let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                push(PlannedAddition {
                    key: format!("{}/", key),
                    source: AdditionSource::Directory,
                    size: 0,
                    modified,
                });
            } else {
                let metadata = entry.metadata().map_err(|e| Error::InvalidSource {
                    path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                })?;
                push(PlannedAddition {
                    key,
                    source: AdditionSource::File(entry.path().to_path_buf()),
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                });
            }
        }
    }
    Ok(additions)
}

/// Returns the key an entry is written under: its own key, or `entry_<n>`
/// when the key is empty. `ordinal` starts at 1.
pub(crate) fn output_key(key: &str, ordinal: usize) -> String {
    if key.trim_matches('/').is_empty() {
        format!("entry_{}", ordinal)
    } else {
        key.to_string()
    }
}

/// Writes one planned addition under `key`. Returns the bytes written.
pub(crate) fn write_addition(
    writer: &mut dyn ContainerWriter,
    addition: &PlannedAddition,
    key: &str,
) -> Result<u64> {
    match &addition.source {
        AdditionSource::Directory => {
            writer.add_directory(key.trim_end_matches('/'), addition.modified)?;
            Ok(0)
        }
        AdditionSource::Bytes(data) => {
            let mut data = data.as_slice();
            writer.add_entry(key, addition.size, addition.modified, &mut data)
        }
        AdditionSource::File(path) => {
            let file = File::open(path).map_err(|e| Error::source_read(key, e))?;
            // The file may have changed since it was planned.
            let size = file.metadata().map(|m| m.len()).unwrap_or(addition.size);
            let mut data = BufReader::new(file);
            writer.add_entry(key, size, addition.modified, &mut data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_is_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"abc").unwrap();

        let additions = collect_sources(&[&file]).unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].key, "notes.txt");
        assert_eq!(additions[0].size, 3);
        assert!(additions[0].modified.is_some());
    }

    #[test]
    fn test_directory_keys_relative_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("b");
        fs::create_dir_all(root.join("c")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("c").join("d.txt"), b"data").unwrap();

        let additions = collect_sources(&[&root]).unwrap();
        let mut keys: Vec<&str> = additions.iter().map(|a| a.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["b/c/d.txt", "b/empty/"]);

        let empty = additions.iter().find(|a| a.key == "b/empty/").unwrap();
        assert!(empty.is_directory());
    }

    #[test]
    fn test_missing_source_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_sources(&[dir.path().join("nope.txt")]).unwrap_err();
        assert!(matches!(err, Error::InvalidSource { .. }));
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("one")).unwrap();
        fs::create_dir_all(dir.path().join("two")).unwrap();
        let first = dir.path().join("one").join("Same.txt");
        let second = dir.path().join("two").join("same.txt");
        fs::write(&first, b"1").unwrap();
        fs::write(&second, b"22").unwrap();

        let additions = collect_sources(&[&first, &second]).unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].key, "same.txt");
        assert_eq!(additions[0].size, 2);
    }

    #[test]
    fn test_output_key_fallback() {
        assert_eq!(output_key("a.txt", 1), "a.txt");
        assert_eq!(output_key("", 3), "entry_3");
        assert_eq!(output_key("/", 2), "entry_2");
    }

    #[test]
    fn test_from_bytes() {
        let addition = PlannedAddition::from_bytes("k".into(), vec![1, 2, 3], None);
        assert_eq!(addition.size, 3);
        assert!(!addition.is_directory());
    }
}
