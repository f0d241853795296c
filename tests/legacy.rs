//! Reading real LZH archives through the read-only backend.

#![cfg(feature = "legacy")]

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use arcmill::{Error, MutateOptions, mutate, read};
use common::{extract_to_map, file_keys};
use oxiarc_archive::LzhWriter;
use tempfile::tempdir;

const FILES: &[(&str, &[u8])] = &[
    ("readme.txt", b"lzh readme\n"),
    ("docs/notes.txt", b"notes notes notes notes notes\n"),
];

fn build_lzh(dir: &Path) -> PathBuf {
    let mut bytes = Vec::new();
    {
        let mut writer = LzhWriter::new(&mut bytes);
        for (name, data) in FILES {
            writer.add_file(name, data).unwrap();
        }
        writer.finish().unwrap();
    }
    let archive = dir.join("old.lzh");
    fs::write(&archive, bytes).unwrap();
    archive
}

#[test]
fn test_lzh_list() {
    let dir = tempdir().unwrap();
    let archive = build_lzh(dir.path());

    let entries = read::list(&archive).unwrap();
    assert_eq!(entries.len(), 2);
    let readme = entries.iter().find(|e| e.key == "readme.txt").unwrap();
    assert_eq!(readme.size, FILES[0].1.len() as u64);
    assert!(!readme.is_directory);

    let mut keys = file_keys(&archive);
    keys.sort();
    assert_eq!(keys, vec!["docs/notes.txt", "readme.txt"]);
}

#[test]
fn test_lzh_extract_all() {
    let dir = tempdir().unwrap();
    let archive = build_lzh(dir.path());

    let extracted = extract_to_map(&archive);
    assert_eq!(extracted.len(), 2);
    for (key, data) in FILES {
        assert_eq!(extracted[*key], *data, "{}", key);
    }
}

#[test]
fn test_lzh_integrity() {
    let dir = tempdir().unwrap();
    let archive = build_lzh(dir.path());
    assert!(read::test(&archive));
}

#[test]
fn test_lzh_refuses_mutation() {
    let dir = tempdir().unwrap();
    let archive = build_lzh(dir.path());
    let before = fs::read(&archive).unwrap();

    let err = mutate::delete_entries(&archive, &["readme.txt"], &MutateOptions::new())
        .unwrap_err();

    assert!(matches!(err, Error::ReadOnlyFormat { .. }));
    assert_eq!(fs::read(&archive).unwrap(), before);
}
