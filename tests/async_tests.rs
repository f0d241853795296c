//! Integration tests for the async API.
//!
//! These run the blocking engine through Tokio's blocking pool and check
//! that token cancellation reaches it.

#![cfg(feature = "async")]

mod common;

use std::fs;
use std::sync::Arc;

use arcmill::progress::ProgressSnapshot;
use arcmill::{
    CancellationToken, CreateOptions, ExtractOptions, MutateOptions, ProgressSink,
    TransferOptions, async_api,
};
use common::{assert_no_staging, collect_files, file_keys, populate, top_level_sources};

#[tokio::test]
async fn test_async_create_list_extract() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");
    populate(&content, &[("a.txt", b"alpha"), ("sub/b.txt", b"beta")]);
    let archive = dir.path().join("async.tar.gz");

    let written = async_api::create(
        &archive,
        top_level_sources(&content),
        CreateOptions::new(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(written.entries_written, 2);

    let entries = async_api::list(&archive).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(async_api::test(&archive).await);

    let out = dir.path().join("out");
    async_api::extract_subset(
        &archive,
        vec!["sub/b.txt".to_string()],
        &out,
        ExtractOptions::default(),
        None,
    )
    .await
    .unwrap();
    let files = collect_files(&out);
    assert_eq!(files.len(), 1);
    assert_eq!(files["sub/b.txt"], b"beta");
}

#[tokio::test]
async fn test_async_mutation_and_transfer() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");
    populate(&content, &[("keep.txt", b"k"), ("gone.txt", b"g")]);
    let archive = dir.path().join("m.zip");
    async_api::create(&archive, top_level_sources(&content), CreateOptions::new(), None)
        .await
        .unwrap();

    let removed = async_api::delete_entries(
        &archive,
        vec!["gone.txt".to_string()],
        MutateOptions::new(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(removed.entries_removed, 1);

    let extra = dir.path().join("extra.txt");
    fs::write(&extra, b"extra").unwrap();
    async_api::add_or_replace(&archive, vec![extra], MutateOptions::new(), None)
        .await
        .unwrap();
    assert_eq!(file_keys(&archive), vec!["extra.txt", "keep.txt"]);

    let dest = dir.path().join("dest.tar");
    let copied = async_api::copy_entries(
        &archive,
        &dest,
        vec!["keep.txt".to_string()],
        TransferOptions::new(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(copied.copied, 1);

    let moved = async_api::move_entries(
        &archive,
        &dest,
        vec!["extra.txt".to_string()],
        TransferOptions::new(),
        None,
    )
    .await
    .unwrap();
    assert!(moved.success);
    assert_eq!(file_keys(&archive), vec!["keep.txt"]);
    assert_eq!(file_keys(&dest), vec!["extra.txt", "keep.txt"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_token_cancels_running_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");
    let files: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| (format!("f{:02}.txt", i), vec![b'x'; 1024]))
        .collect();
    let refs: Vec<(&str, &[u8])> = files
        .iter()
        .map(|(k, d)| (k.as_str(), d.as_slice()))
        .collect();
    populate(&content, &refs);
    let archive = dir.path().join("slow.zip");
    async_api::create(&archive, top_level_sources(&content), CreateOptions::new(), None)
        .await
        .unwrap();
    let original = fs::read(&archive).unwrap();

    // Cancel from inside the first progress callback, then hold the worker
    // until the bridge has had time to raise the flag.
    let token = CancellationToken::new();
    let trigger = token.clone();
    let sink: Arc<dyn ProgressSink> = Arc::new(move |_: &ProgressSnapshot| {
        trigger.cancel();
        std::thread::sleep(std::time::Duration::from_millis(20));
    });

    let err = async_api::delete_entries(
        &archive,
        vec!["f00.txt".to_string()],
        MutateOptions::new().progress(sink),
        Some(token),
    )
    .await
    .unwrap_err();

    assert!(err.is_cancelled(), "{:?}", err);
    assert_eq!(fs::read(&archive).unwrap(), original);
    assert_no_staging(&archive);
}
