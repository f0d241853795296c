//! Tar backend, with optional whole-stream compression.
//!
//! Tar is sequential: every pass over the archive reopens the file and
//! decodes from the start.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{CompressedWriter, ContainerReader, ContainerWriter, EntryVisitor, TrackedReader};
use crate::format::{ArchiveFormat, Compression};
use crate::key::normalize_key;
use crate::read::EntryDescriptor;
use crate::timestamp;
use crate::write::CompressionLevel;
use crate::{Error, Result};

pub(crate) struct TarContainerReader {
    path: PathBuf,
    compression: Compression,
}

impl TarContainerReader {
    pub(crate) fn open(path: &Path, compression: Compression) -> Result<Self> {
        // Fail early on a missing file; the archive itself is decoded lazily.
        std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            compression,
        })
    }

    fn archive(&self) -> Result<tar::Archive<Box<dyn Read>>> {
        let file = super::open_file(&self.path)?;
        Ok(tar::Archive::new(super::decoder(file, self.compression)))
    }

    fn codec_error(&self, err: io::Error) -> Error {
        Error::codec(ArchiveFormat::Tar(self.compression), err)
    }
}

/// Builds a descriptor for a tar entry, or `None` for entry kinds the engine
/// does not model (links, devices, extension headers).
fn describe<R: Read>(entry: &tar::Entry<'_, R>) -> Option<EntryDescriptor> {
    let header = entry.header();
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let modified = header.mtime().ok().map(timestamp::from_unix_secs);

    let descriptor = match header.entry_type() {
        tar::EntryType::Directory => EntryDescriptor::directory(&name),
        tar::EntryType::Regular | tar::EntryType::Continuous => {
            EntryDescriptor::file(&name, entry.size())
        }
        other => {
            log::debug!("skipping tar entry '{}' of type {:?}", name, other);
            return None;
        }
    };
    Some(
        descriptor
            .with_compressed_size(entry.size())
            .with_modified(modified),
    )
}

impl ContainerReader for TarContainerReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar(self.compression)
    }

    fn entries(&mut self) -> Result<Vec<EntryDescriptor>> {
        let mut archive = self.archive()?;
        let mut out = Vec::new();
        for entry in archive.entries().map_err(|e| self.codec_error(e))? {
            let entry = entry.map_err(|e| self.codec_error(e))?;
            out.extend(describe(&entry));
        }
        Ok(out)
    }

    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        let mut archive = self.archive()?;
        for entry in archive.entries().map_err(|e| self.codec_error(e))? {
            let mut entry = entry.map_err(|e| self.codec_error(e))?;
            let Some(descriptor) = describe(&entry) else {
                continue;
            };
            if descriptor.is_directory {
                visitor(&descriptor, &mut io::empty())?;
            } else {
                visitor(&descriptor, &mut entry)?;
            }
        }
        Ok(())
    }
}

pub(crate) struct TarContainerWriter<W: Write> {
    builder: tar::Builder<CompressedWriter<W>>,
    path: PathBuf,
}

impl<W: Write> TarContainerWriter<W> {
    pub(crate) fn new(
        inner: W,
        path: &Path,
        compression: Compression,
        level: CompressionLevel,
    ) -> Self {
        Self {
            builder: tar::Builder::new(CompressedWriter::new(inner, compression, level)),
            path: path.to_path_buf(),
        }
    }

    fn header(entry_type: tar::EntryType, size: u64, mode: u32, modified: Option<SystemTime>) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(mode);
        header.set_mtime(modified.map(timestamp::tar_mtime).unwrap_or(0));
        header
    }
}

impl<W: Write> ContainerWriter for TarContainerWriter<W> {
    fn add_directory(&mut self, key: &str, modified: Option<SystemTime>) -> Result<()> {
        let mut key = normalize_key(key);
        if !key.ends_with('/') {
            key.push('/');
        }
        let mut header = Self::header(tar::EntryType::Directory, 0, 0o755, modified);
        self.builder
            .append_data(&mut header, &key, io::empty())
            .map_err(|e| Error::destination(&self.path, e))
    }

    fn add_entry(
        &mut self,
        key: &str,
        size: u64,
        modified: Option<SystemTime>,
        data: &mut dyn Read,
    ) -> Result<u64> {
        let mut header = Self::header(tar::EntryType::Regular, size, 0o644, modified);
        let mut tracked = TrackedReader::new(data);
        let result = self
            .builder
            .append_data(&mut header, normalize_key(key), (&mut tracked).take(size));

        match result {
            Err(e) if tracked.failed() => Err(Error::source_read(key, e)),
            Err(e) => Err(Error::destination(&self.path, e)),
            // The header already promised `size` bytes.
            Ok(()) if tracked.bytes_read() != size => Err(Error::source_read(
                key,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {} bytes, read {}", size, tracked.bytes_read()),
                ),
            )),
            Ok(()) => Ok(size),
        }
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let path = self.path;
        let compressed = self
            .builder
            .into_inner()
            .map_err(|e| Error::destination(&path, e))?;
        let mut inner = compressed
            .finish()
            .map_err(|e| Error::destination(&path, e))?;
        inner.flush().map_err(|e| Error::destination(&path, e))
    }
}
