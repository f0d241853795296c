//! Narrow reader/writer interface over the container backends.
//!
//! The engine never talks to `zip`, `tar` or the stream compressors
//! directly. Each family is wrapped in a [`ContainerReader`] and, if
//! writable, a [`ContainerWriter`]; [`open_reader`] and [`open_writer`]
//! dispatch on the resolved [`ArchiveFormat`].
//!
//! # Backends
//!
//! | Format | Crate |
//! |--------|-------|
//! | zip | `zip` |
//! | tar, tar.gz, tar.bz2, tar.xz | `tar` + `flate2` / `bzip2` / `xz2` |
//! | gz, bz2, xz | `flate2` / `bzip2` / `xz2` |
//! | lzh, cab | `oxiarc-archive` (feature `legacy`) |

mod compression;
#[cfg(feature = "legacy")]
mod legacy;
mod stream;
mod tar;
mod zip;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::format::ArchiveFormat;
use crate::read::EntryDescriptor;
use crate::write::CompressionLevel;
use crate::{Error, Result};

pub(crate) use compression::{CompressedWriter, decoder};

/// Upper bound on a buffer reserved up front from a size declared in an
/// archive header.
pub(crate) const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Callback invoked once per entry while visiting a container.
///
/// Directory entries are visited with an empty reader. The visitor may
/// leave the reader unread.
pub type EntryVisitor<'a> = dyn FnMut(&EntryDescriptor, &mut dyn Read) -> Result<()> + 'a;

/// Read side of a container backend.
pub trait ContainerReader {
    /// The format this reader decodes.
    fn format(&self) -> ArchiveFormat;

    /// Lists every entry in storage order without decoding data.
    fn entries(&mut self) -> Result<Vec<EntryDescriptor>>;

    /// Visits every entry in storage order with a reader over its
    /// decompressed bytes.
    ///
    /// An error returned by the visitor stops the walk and is propagated.
    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()>;
}

/// Write side of a container backend.
pub trait ContainerWriter {
    /// Records a directory entry. Containers without directory entries
    /// ignore the call.
    fn add_directory(&mut self, key: &str, modified: Option<SystemTime>) -> Result<()>;

    /// Streams one file entry. `size` is the declared uncompressed size.
    ///
    /// Returns the number of bytes consumed from `data`.
    fn add_entry(
        &mut self,
        key: &str,
        size: u64,
        modified: Option<SystemTime>,
        data: &mut dyn Read,
    ) -> Result<u64>;

    /// Finalizes the container and flushes it to disk.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Opens `path` for reading with the backend for `format`.
pub fn open_reader(path: &Path, format: ArchiveFormat) -> Result<Box<dyn ContainerReader>> {
    log::debug!("opening {} reader for '{}'", format, path.display());
    match format {
        ArchiveFormat::Zip => Ok(Box::new(zip::ZipContainerReader::open(path)?)),
        ArchiveFormat::Tar(compression) => {
            Ok(Box::new(tar::TarContainerReader::open(path, compression)?))
        }
        ArchiveFormat::Stream(compression) => Ok(Box::new(stream::StreamContainerReader::open(
            path,
            compression,
        )?)),
        #[cfg(feature = "legacy")]
        ArchiveFormat::Lzh => Ok(Box::new(legacy::LzhContainerReader::open(path)?)),
        #[cfg(feature = "legacy")]
        ArchiveFormat::Cab => Ok(Box::new(legacy::CabContainerReader::open(path)?)),
        #[cfg(not(feature = "legacy"))]
        ArchiveFormat::Lzh | ArchiveFormat::Cab => Err(Error::NoCodec { format }),
    }
}

/// Opens a writer for `format` over a freshly created file.
///
/// `path` is the file being written and is only used for error reporting.
pub fn open_writer(
    file: File,
    path: &Path,
    format: ArchiveFormat,
    level: CompressionLevel,
) -> Result<Box<dyn ContainerWriter>> {
    log::debug!("opening {} writer for '{}'", format, path.display());
    let sink = BufWriter::new(file);
    match format {
        ArchiveFormat::Zip => Ok(Box::new(zip::ZipContainerWriter::new(sink, path, level))),
        ArchiveFormat::Tar(compression) => Ok(Box::new(tar::TarContainerWriter::new(
            sink,
            path,
            compression,
            level,
        ))),
        ArchiveFormat::Stream(compression) => Ok(Box::new(stream::StreamContainerWriter::new(
            sink,
            path,
            compression,
            level,
        ))),
        ArchiveFormat::Lzh | ArchiveFormat::Cab => Err(Error::ReadOnlyFormat { format }),
    }
}

/// Opens an existing zip archive for appending new entries after its last
/// one. The file at `path` is written to directly.
pub(crate) fn open_zip_appender(
    path: &Path,
    level: CompressionLevel,
) -> Result<Box<dyn ContainerWriter>> {
    Ok(Box::new(zip::ZipContainerWriter::append(path, level)?))
}

pub(crate) fn open_file(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Reader handed to visitors for entries that cannot be decoded.
///
/// Fails on the first read so the visitor reports the entry as unreadable
/// only if it actually needs the data.
pub(crate) struct Unreadable(pub(crate) String);

impl Read for Unreadable {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other(self.0.clone()))
    }
}

/// Which side of a copy failed.
pub(crate) enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

impl CopyError {
    pub(crate) fn into_error(self, key: &str, dest: &Path) -> Error {
        match self {
            CopyError::Read(source) => Error::source_read(key, source),
            CopyError::Write(source) => Error::destination(dest, source),
        }
    }
}

/// Copies `data` into `sink`, keeping read and write failures apart so they
/// map onto source and destination errors.
pub(crate) fn copy_entry(
    data: &mut dyn Read,
    sink: &mut dyn Write,
) -> std::result::Result<u64, CopyError> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match data.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        sink.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
}

/// Reader adapter that remembers whether the wrapped reader failed, for
/// backends that drive the copy themselves.
pub(crate) struct TrackedReader<'a> {
    inner: &'a mut dyn Read,
    failed: bool,
    bytes: u64,
}

impl<'a> TrackedReader<'a> {
    pub(crate) fn new(inner: &'a mut dyn Read) -> Self {
        Self {
            inner,
            failed: false,
            bytes: 0,
        }
    }

    pub(crate) fn failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn bytes_read(&self) -> u64 {
        self.bytes
    }
}

impl Read for TrackedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.bytes += n as u64;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.failed = true;
                }
                Err(e)
            }
        }
    }
}
