//! # arcmill
//!
//! One model over structurally different archive containers.
//!
//! arcmill lists, extracts, tests, creates and modifies archives of three
//! families through the same set of functions:
//!
//! - **random-access** containers with a central directory (zip, and the
//!   read-only lzh and cab),
//! - **sequential** containers written once front to back (tar, optionally
//!   compressed with gzip, bzip2 or xz),
//! - **single-stream** wrappers holding exactly one file (`.gz`, `.bz2`,
//!   `.xz`).
//!
//! The format is decided by the file name alone; see [`format::classify`].
//!
//! ## Quick Start
//!
//! ### Reading
//!
//! ```rust,no_run
//! use arcmill::{ExtractOptions, Result, read};
//!
//! fn main() -> Result<()> {
//!     for entry in read::list("photos.tar.bz2")? {
//!         println!("{:>10} {}", entry.size, entry.key);
//!     }
//!     read::extract_all("photos.tar.bz2", "./photos", &ExtractOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Creating and modifying
//!
//! ```rust,no_run
//! use arcmill::{CreateOptions, MutateOptions, Result, mutate, write};
//!
//! fn main() -> Result<()> {
//!     write::create("docs.zip", &["manual", "README.md"], &CreateOptions::new())?;
//!     mutate::add_or_replace("docs.zip", &["CHANGELOG.md"], &MutateOptions::new())?;
//!     mutate::delete_entries("docs.zip", &["manual/draft.md"], &MutateOptions::new())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Moving entries between archives
//!
//! ```rust,no_run
//! use arcmill::{Result, TransferOptions, transfer};
//!
//! fn main() -> Result<()> {
//!     let result = transfer::move_entries(
//!         "inbox.tar.gz",
//!         "archive.zip",
//!         &["reports/q3.pdf"],
//!         &TransferOptions::new().overwrite_existing(true),
//!     )?;
//!     println!("moved {} entries", result.copied);
//!     Ok(())
//! }
//! ```
//!
//! ## Keys
//!
//! Entries are identified by keys: relative, `/`-separated paths. Keys are
//! normalized (backslashes become slashes, leading slashes are dropped) and
//! compared ignoring case everywhere; the stored case is preserved.
//!
//! ## Modification
//!
//! [`mutate`] and [`transfer`] write a complete new archive beside the
//! original at `<path>.tmp` and swap it in when finished. A failed or
//! cancelled operation leaves the original byte-for-byte unchanged. The one
//! exception is the opt-in zip append of
//! [`MutateOptions::in_place_append`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `legacy` | Yes | Read-only LZH and CAB support |
//! | `async` | No | Tokio wrappers with `CancellationToken` support |
//! | `cli` | No | The `arcmill` command-line tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use arcmill::{Error, read};
//!
//! match read::list("mystery.bin") {
//!     Ok(entries) => println!("{} entries", entries.len()),
//!     Err(e) if e.is_classification() => eprintln!("not an archive name: {}", e),
//!     Err(Error::Io(e)) => eprintln!("I/O error: {}", e),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod error;
pub mod format;
pub mod key;
pub mod mutate;
pub mod progress;
pub mod read;
pub mod staging;
pub mod timestamp;
pub mod transfer;
pub mod write;

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod async_api;

pub use error::{Error, Result};
pub use format::{ArchiveFamily, ArchiveFormat, Compression, Intent, classify};

// Re-export the operation types at crate root for convenience
pub use mutate::{MutateOptions, MutationResult};
pub use read::{ArchiveInfo, EntryDescriptor, ExtractOptions, ExtractResult, TestResult};
pub use transfer::{CopyResult, TransferOptions};
pub use write::{CompressionLevel, CreateOptions, WriteResult};

pub use progress::{CancellationFlag, NoProgress, ProgressSink, ProgressSnapshot};

#[cfg(feature = "async")]
pub use tokio_util::sync::CancellationToken;
