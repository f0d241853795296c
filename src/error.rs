//! Error types for archive engine operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the engine, along with a convenient [`Result<T>`] alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`.
//! Classification problems are reported before any file is touched, so a
//! caller can match on them without worrying about partial state:
//!
//! ```rust,no_run
//! use arcmill::{Error, mutate::{self, MutateOptions}};
//!
//! fn add(path: &str, file: &str) -> arcmill::Result<()> {
//!     match mutate::add_or_replace(path, &[file], &MutateOptions::default()) {
//!         Ok(_) => Ok(()),
//!         Err(e @ Error::ReadOnlyFormat { .. }) => {
//!             eprintln!("cannot modify this kind of archive: {}", e);
//!             Err(e)
//!         }
//!         Err(Error::Cancelled) => {
//!             eprintln!("cancelled, archive left as it was");
//!             Err(Error::Cancelled)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! Integrity problems found by [`read::test`](crate::read::test) are never
//! surfaced through this type; `test` answers with a `bool`.

use std::io;
use std::path::PathBuf;

use crate::format::ArchiveFormat;

/// The main error type for archive operations.
///
/// # Error Categories
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Classification | [`UnrecognizedFormat`][Self::UnrecognizedFormat], [`ReadOnlyFormat`][Self::ReadOnlyFormat] | before any I/O |
/// | Source read | [`SourceRead`][Self::SourceRead], [`Codec`][Self::Codec] | while decoding an entry |
/// | Destination write | [`DestinationWrite`][Self::DestinationWrite] | while producing an archive or file |
/// | Cancellation | [`Cancelled`][Self::Cancelled] | between entries |
/// | Input | [`InvalidSource`][Self::InvalidSource], [`TooManyEntries`][Self::TooManyEntries], [`PathTraversal`][Self::PathTraversal] | planning / extraction |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error not attributable to a specific entry or destination.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file name does not end in any known archive suffix.
    ///
    /// Only raised when opening for read; writers fall back to zip.
    #[error("unrecognized archive format: {}", path.display())]
    UnrecognizedFormat {
        /// The path that could not be classified.
        path: PathBuf,
    },

    /// A write was requested against a format this engine only reads.
    ///
    /// Raised by [`classify_for_write`](crate::format::classify_for_write),
    /// the single gate used by every write path.
    #[error("{format} archives are read-only")]
    ReadOnlyFormat {
        /// The read-only format.
        format: ArchiveFormat,
    },

    /// This build has no backend for the format.
    ///
    /// Legacy containers need the `legacy` feature.
    #[error("no codec available for {format} archives in this build")]
    NoCodec {
        /// The format without a backend.
        format: ArchiveFormat,
    },

    /// The codec layer rejected the container itself (bad header, truncated
    /// central directory, unsupported method, ...).
    #[error("{format} codec error: {message}")]
    Codec {
        /// The format being decoded or encoded.
        format: ArchiveFormat,
        /// Message from the backend.
        message: String,
    },

    /// An entry could not be read from the source archive.
    ///
    /// Aborts a rebuild; recorded as a warning by cross-archive transfers.
    #[error("failed to read entry '{key}': {source}")]
    SourceRead {
        /// Normalized key of the unreadable entry.
        key: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// Writing the destination failed (disk full, permission denied, ...).
    #[error("failed to write '{}': {source}", path.display())]
    DestinationWrite {
        /// The file being written.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The operation was cancelled through its cancellation flag.
    ///
    /// Any staging file has been removed and the original archive is
    /// untouched.
    #[error("operation cancelled")]
    Cancelled,

    /// A source path handed to a writer is unusable.
    #[error("invalid source '{}': {reason}", path.display())]
    InvalidSource {
        /// The offending source path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A single-stream wrapper would have to hold more or fewer than one entry.
    #[error("{format} holds exactly one entry, {count} requested")]
    TooManyEntries {
        /// The single-stream format.
        format: ArchiveFormat,
        /// The number of entries the operation would produce.
        count: usize,
    },

    /// An entry key would resolve outside the extraction directory.
    #[error("path traversal detected in entry '{key}'")]
    PathTraversal {
        /// The offending key.
        key: String,
    },
}

impl Error {
    /// Returns `true` for errors raised while classifying a path.
    ///
    /// These are always reported before any file is opened.
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            Error::UnrecognizedFormat { .. } | Error::ReadOnlyFormat { .. }
        )
    }

    /// Returns `true` if the operation was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns the entry key associated with this error, if any.
    pub fn entry_key(&self) -> Option<&str> {
        match self {
            Error::SourceRead { key, .. } => Some(key.as_str()),
            Error::PathTraversal { key } => Some(key.as_str()),
            _ => None,
        }
    }

    /// Creates a codec error from any backend error.
    pub(crate) fn codec(format: ArchiveFormat, err: impl std::fmt::Display) -> Self {
        Error::Codec {
            format,
            message: err.to_string(),
        }
    }

    /// Creates a SourceRead error.
    pub(crate) fn source_read(key: impl Into<String>, source: io::Error) -> Self {
        Error::SourceRead {
            key: key.into(),
            source,
        }
    }

    /// Creates a DestinationWrite error.
    pub(crate) fn destination(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::DestinationWrite {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Compression;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_read_only_format() {
        let err = Error::ReadOnlyFormat {
            format: ArchiveFormat::Cab,
        };
        assert!(err.is_classification());
        assert_eq!(err.to_string(), "CAB archives are read-only");
    }

    #[test]
    fn test_unrecognized_format() {
        let err = Error::UnrecognizedFormat {
            path: PathBuf::from("notes.docx"),
        };
        assert!(err.is_classification());
        assert!(err.to_string().contains("notes.docx"));
    }

    #[test]
    fn test_source_read_carries_key() {
        let err = Error::source_read("dir/a.txt", io::Error::other("bad block"));
        assert_eq!(err.entry_key(), Some("dir/a.txt"));
        assert!(!err.is_classification());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_too_many_entries() {
        let err = Error::TooManyEntries {
            format: ArchiveFormat::Stream(Compression::Gzip),
            count: 3,
        };
        assert_eq!(err.to_string(), "GZIP holds exactly one entry, 3 requested");
    }

    #[test]
    fn test_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert_eq!(Error::Cancelled.to_string(), "operation cancelled");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
