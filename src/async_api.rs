//! Async wrappers over the blocking operations.
//!
//! Every archive operation is blocking file I/O and compression work, so
//! each wrapper moves it onto Tokio's blocking pool with
//! [`tokio::task::spawn_blocking`]. A [`CancellationToken`] can be passed
//! alongside the options; cancelling it sets the operation's
//! [`CancellationFlag`], which the engine checks before each entry.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmill::async_api;
//! use arcmill::read::ExtractOptions;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> arcmill::Result<()> {
//! let token = CancellationToken::new();
//! let result = async_api::extract_all(
//!     "backup.tar.gz",
//!     "./restore",
//!     ExtractOptions::default(),
//!     Some(token.clone()),
//! )
//! .await?;
//! println!("extracted {} files", result.entries_extracted);
//! # Ok(())
//! # }
//! ```

use std::io;
use std::path::PathBuf;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::mutate::{self, MutateOptions, MutationResult};
use crate::progress::CancellationFlag;
use crate::read::{self, EntryDescriptor, ExtractOptions, ExtractResult};
use crate::transfer::{self, CopyResult, TransferOptions};
use crate::write::{self, CreateOptions, WriteResult};
use crate::{Error, Result};

/// Forwards a token's cancellation to a flag until dropped.
struct CancelBridge {
    task: Option<JoinHandle<()>>,
}

impl CancelBridge {
    /// Links `token` to the flag in `slot`, creating the flag if needed.
    fn link(token: Option<CancellationToken>, slot: &mut Option<CancellationFlag>) -> Result<Self> {
        let Some(token) = token else {
            return Ok(Self { task: None });
        };
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let flag = slot.get_or_insert_with(CancellationFlag::new).clone();
        let task = tokio::spawn(async move {
            token.cancelled().await;
            flag.cancel();
        });
        Ok(Self { task: Some(task) })
    }
}

impl Drop for CancelBridge {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
}

/// Lists the entries of an archive. See [`read::list`].
pub async fn list(path: impl Into<PathBuf>) -> Result<Vec<EntryDescriptor>> {
    let path = path.into();
    blocking(move || read::list(&path)).await
}

/// Extracts every entry. See [`read::extract_all`].
pub async fn extract_all(
    path: impl Into<PathBuf>,
    dest: impl Into<PathBuf>,
    mut options: ExtractOptions,
    token: Option<CancellationToken>,
) -> Result<ExtractResult> {
    let (path, dest) = (path.into(), dest.into());
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || read::extract_all(&path, &dest, &options)).await
}

/// Extracts the listed entries. See [`read::extract_subset`].
pub async fn extract_subset(
    path: impl Into<PathBuf>,
    keys: Vec<String>,
    dest: impl Into<PathBuf>,
    mut options: ExtractOptions,
    token: Option<CancellationToken>,
) -> Result<ExtractResult> {
    let (path, dest) = (path.into(), dest.into());
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || read::extract_subset(&path, &keys, &dest, &options)).await
}

/// Tests an archive for integrity. See [`read::test`].
pub async fn test(path: impl Into<PathBuf>) -> bool {
    let path = path.into();
    tokio::task::spawn_blocking(move || read::test(&path))
        .await
        .unwrap_or(false)
}

/// Creates an archive. See [`write::create`].
pub async fn create(
    path: impl Into<PathBuf>,
    sources: Vec<PathBuf>,
    mut options: CreateOptions,
    token: Option<CancellationToken>,
) -> Result<WriteResult> {
    let path = path.into();
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || write::create(&path, &sources, &options)).await
}

/// Adds or replaces entries. See [`mutate::add_or_replace`].
pub async fn add_or_replace(
    path: impl Into<PathBuf>,
    sources: Vec<PathBuf>,
    mut options: MutateOptions,
    token: Option<CancellationToken>,
) -> Result<MutationResult> {
    let path = path.into();
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || mutate::add_or_replace(&path, &sources, &options)).await
}

/// Deletes entries. See [`mutate::delete_entries`].
pub async fn delete_entries(
    path: impl Into<PathBuf>,
    keys: Vec<String>,
    mut options: MutateOptions,
    token: Option<CancellationToken>,
) -> Result<MutationResult> {
    let path = path.into();
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || mutate::delete_entries(&path, &keys, &options)).await
}

/// Copies entries between archives. See [`transfer::copy_entries`].
pub async fn copy_entries(
    source: impl Into<PathBuf>,
    dest: impl Into<PathBuf>,
    keys: Vec<String>,
    mut options: TransferOptions,
    token: Option<CancellationToken>,
) -> Result<CopyResult> {
    let (source, dest) = (source.into(), dest.into());
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || transfer::copy_entries(&source, &dest, &keys, &options)).await
}

/// Moves entries between archives. See [`transfer::move_entries`].
pub async fn move_entries(
    source: impl Into<PathBuf>,
    dest: impl Into<PathBuf>,
    keys: Vec<String>,
    mut options: TransferOptions,
    token: Option<CancellationToken>,
) -> Result<CopyResult> {
    let (source, dest) = (source.into(), dest.into());
    let _bridge = CancelBridge::link(token, &mut options.cancel)?;
    blocking(move || transfer::move_entries(&source, &dest, &keys, &options)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_token_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = extract_all(
            dir.path().join("a.zip"),
            dir.path().join("out"),
            ExtractOptions::default(),
            Some(token),
        )
        .await
        .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_bridge_sets_flag() {
        let token = CancellationToken::new();
        let mut slot = None;
        let _bridge = CancelBridge::link(Some(token.clone()), &mut slot).unwrap();
        let flag = slot.clone().unwrap();
        assert!(!flag.is_cancelled());

        token.cancel();
        for _ in 0..100 {
            if flag.is_cancelled() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(flag.is_cancelled());
    }

    #[tokio::test]
    async fn test_missing_archive_is_false() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!test(dir.path().join("missing.zip")).await);
    }
}
