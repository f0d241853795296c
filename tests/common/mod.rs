//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use arcmill::{CreateOptions, ExtractOptions, read, write};
use walkdir::WalkDir;

/// Writes `files` (relative path, content) under `root`, creating parents.
pub fn populate(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, data) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, data).unwrap();
    }
}

/// Top-level children of `root`, sorted, for use as `create` sources.
///
/// Passing these keeps keys identical to the paths given to [`populate`].
pub fn top_level_sources(root: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    sources.sort();
    sources
}

/// Creates `dir/name` holding `files` under the same relative keys.
pub fn build_archive(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let content = dir.join(format!("{}.content", name));
    populate(&content, files);
    let archive = dir.join(name);
    write::create(&archive, &top_level_sources(&content), &CreateOptions::new()).unwrap();
    archive
}

/// Extracts every entry and returns the extracted files by relative path.
pub fn extract_to_map(archive: &Path) -> BTreeMap<String, Vec<u8>> {
    let out = tempfile::tempdir().unwrap();
    read::extract_all(archive, out.path(), &ExtractOptions::default()).unwrap();
    collect_files(out.path())
}

/// Reads every regular file below `root`, keyed by `/`-separated relative path.
pub fn collect_files(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root) {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap();
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key, fs::read(entry.path()).unwrap());
    }
    files
}

/// Keys of the file entries, in listing order.
pub fn file_keys(archive: &Path) -> Vec<String> {
    read::list(archive)
        .unwrap()
        .into_iter()
        .filter(|e| !e.is_directory)
        .map(|e| e.key)
        .collect()
}

/// Every key, directories included, sorted.
pub fn all_keys(archive: &Path) -> Vec<String> {
    let mut keys: Vec<String> = read::list(archive)
        .unwrap()
        .into_iter()
        .map(|e| e.key)
        .collect();
    keys.sort();
    keys
}

/// Creates `dir/name` holding `top/f.txt` and the empty directory `top/empty/`.
pub fn build_archive_with_empty_dir(dir: &Path, name: &str) -> PathBuf {
    let top = dir.join(format!("{}.content", name)).join("top");
    populate(&top, &[("f.txt", b"f")]);
    fs::create_dir_all(top.join("empty")).unwrap();
    let archive = dir.join(name);
    write::create(&archive, &[&top], &CreateOptions::new()).unwrap();
    archive
}

/// Asserts no staging file is left beside `archive`.
pub fn assert_no_staging(archive: &Path) {
    assert!(
        arcmill::staging::stale_temp(archive).is_none(),
        "staging file left beside {}",
        archive.display()
    );
}
