//! Name-based classification as seen through the public API.

mod common;

use std::fs;

use arcmill::format::{classify_for_write, default_stream_key};
use arcmill::{
    ArchiveFamily, ArchiveFormat, Compression, CreateOptions, Error, Intent, classify, write,
};
use tempfile::tempdir;

#[test]
fn test_tar_gz_aliases() {
    let tar_gz = classify("x.tar.gz", Intent::Read).unwrap();
    assert_eq!(classify("x.tgz", Intent::Read).unwrap(), tar_gz);
    assert_eq!(classify("X.TAR.GZ", Intent::Read).unwrap(), tar_gz);
    assert_ne!(classify("x.gz", Intent::Read).unwrap(), tar_gz);
    assert_eq!(tar_gz.family(), ArchiveFamily::Sequential);
}

#[test]
fn test_bzip2_and_xz_aliases() {
    for name in ["a.tar.bz2", "a.tbz2", "a.tbz", "a.tb2", "a.tar.bz"] {
        assert_eq!(
            classify(name, Intent::Read).unwrap(),
            ArchiveFormat::Tar(Compression::Bzip2),
            "{}",
            name
        );
    }
    assert_eq!(
        classify("a.txz", Intent::Read).unwrap(),
        ArchiveFormat::Tar(Compression::Xz)
    );
    assert_eq!(
        classify("a.xz", Intent::Read).unwrap(),
        ArchiveFormat::Stream(Compression::Xz)
    );
}

#[test]
fn test_unknown_suffix_depends_on_intent() {
    let err = classify("data.7z", Intent::Read).unwrap_err();
    assert!(matches!(err, Error::UnrecognizedFormat { .. }));
    assert_eq!(classify("data.7z", Intent::Write).unwrap(), ArchiveFormat::Zip);
    assert_eq!(classify_for_write("no_extension").unwrap(), ArchiveFormat::Zip);
}

#[test]
fn test_read_only_formats() {
    for name in ["old.lzh", "old.LHA", "setup.cab"] {
        let format = classify(name, Intent::Read).unwrap();
        assert!(!format.is_writable(), "{}", name);
        let err = classify_for_write(name).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyFormat { .. }), "{}", name);
        assert!(err.is_classification());
    }
}

#[test]
fn test_directory_components_are_ignored() {
    assert_eq!(
        classify("backups.zip/archive.tar", Intent::Read).unwrap(),
        ArchiveFormat::Tar(Compression::None)
    );
}

#[test]
fn test_default_stream_key() {
    assert_eq!(default_stream_key("dir/notes.txt.gz"), "notes.txt");
    assert_eq!(default_stream_key("DATA.BZ2"), "DATA");
}

#[test]
fn test_unknown_suffix_is_written_as_zip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    fs::write(&source, b"zip inside").unwrap();
    let archive = dir.path().join("bundle.pkg");

    write::create(&archive, &[&source], &CreateOptions::new()).unwrap();

    let bytes = fs::read(&archive).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[test]
fn test_create_refuses_read_only_before_io() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    fs::write(&source, b"x").unwrap();
    let archive = dir.path().join("out.lzh");

    let err = write::create(&archive, &[&source], &CreateOptions::new()).unwrap_err();

    assert!(matches!(err, Error::ReadOnlyFormat { .. }));
    assert!(!archive.exists());
    common::assert_no_staging(&archive);
}
