//! Suffix-based format classification.
//!
//! Classification looks at the file name only; no bytes are read. A
//! misnamed or corrupt file surfaces later, when the codec fails to open it.

use std::path::Path;

use crate::{Error, Result};

use super::{ArchiveFormat, Compression};

/// Why a path is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Opening an existing archive; unknown suffixes are an error.
    Read,
    /// Creating or modifying; unknown suffixes fall back to zip and
    /// read-only formats are rejected.
    Write,
}

/// Compound suffixes, checked before any simple suffix.
const COMPOUND_SUFFIXES: &[(&str, Compression)] = &[
    (".tar.gz", Compression::Gzip),
    (".tgz", Compression::Gzip),
    (".taz", Compression::Gzip),
    (".tar.bz2", Compression::Bzip2),
    (".tar.bz", Compression::Bzip2),
    (".tbz2", Compression::Bzip2),
    (".tbz", Compression::Bzip2),
    (".tb2", Compression::Bzip2),
    (".tar.xz", Compression::Xz),
    (".txz", Compression::Xz),
];

const SIMPLE_SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".zip", ArchiveFormat::Zip),
    (".lzh", ArchiveFormat::Lzh),
    (".lha", ArchiveFormat::Lzh),
    (".cab", ArchiveFormat::Cab),
    (".tar", ArchiveFormat::Tar(Compression::None)),
    (".gz", ArchiveFormat::Stream(Compression::Gzip)),
    (".bz2", ArchiveFormat::Stream(Compression::Bzip2)),
    (".xz", ArchiveFormat::Stream(Compression::Xz)),
];

/// Classifies a path into an [`ArchiveFormat`].
///
/// Compound suffixes (`.tar.gz`, `.tgz`, ...) win over the simple suffix they
/// end with, so `x.tar.gz` is a gzip-compressed tar while `x.gz` is a
/// single-stream wrapper.
///
/// With [`Intent::Write`], read-only formats are rejected with
/// [`Error::ReadOnlyFormat`] and unknown suffixes resolve to zip.
pub fn classify(path: impl AsRef<Path>, intent: Intent) -> Result<ArchiveFormat> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let format = match match_suffix(&name) {
        Some(format) => format,
        None => match intent {
            Intent::Write => ArchiveFormat::Zip,
            Intent::Read => {
                return Err(Error::UnrecognizedFormat {
                    path: path.to_path_buf(),
                });
            }
        },
    };

    if intent == Intent::Write && !format.is_writable() {
        return Err(Error::ReadOnlyFormat { format });
    }

    log::debug!("classified '{}' as {}", path.display(), format);
    Ok(format)
}

/// Classifies a path that is about to be created or modified.
///
/// This is the single place where write requests against read-only formats
/// are refused.
pub fn classify_for_write(path: impl AsRef<Path>) -> Result<ArchiveFormat> {
    classify(path, Intent::Write)
}

/// Returns the entry key a single-stream wrapper exposes when the stream
/// itself does not store a name: the file name with its compression suffix
/// removed (`notes.txt.gz` → `notes.txt`).
pub fn default_stream_key(path: impl AsRef<Path>) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_lowercase();

    for (suffix, format) in SIMPLE_SUFFIXES {
        if matches!(format, ArchiveFormat::Stream(_)) && lower.ends_with(suffix) {
            let stem = &name[..name.len() - suffix.len()];
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    name
}

fn match_suffix(name: &str) -> Option<ArchiveFormat> {
    // A bare ".tgz" has no stem and is not an archive name.
    let has_stem = |suffix: &str| name.len() > suffix.len() && name.ends_with(suffix);

    COMPOUND_SUFFIXES
        .iter()
        .find(|(suffix, _)| has_stem(suffix))
        .map(|(_, c)| ArchiveFormat::Tar(*c))
        .or_else(|| {
            SIMPLE_SUFFIXES
                .iter()
                .find(|(suffix, _)| has_stem(suffix))
                .map(|(_, format)| *format)
        })
}
