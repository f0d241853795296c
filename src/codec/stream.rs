//! Single-stream wrappers (`.gz`, `.bz2`, `.xz`).
//!
//! A wrapper holds exactly one entry. Its key is the name stored in the gzip
//! header when there is one, otherwise the archive's file name without the
//! compression suffix. Only gzip records the uncompressed size (modulo 2^32,
//! in its trailer); bzip2 and xz entries report a size of 0.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{CompressedWriter, ContainerReader, ContainerWriter, EntryVisitor, copy_entry};
use crate::format::{ArchiveFormat, Compression, default_stream_key};
use crate::key::normalize_key;
use crate::read::EntryDescriptor;
use crate::timestamp;
use crate::write::CompressionLevel;
use crate::{Error, Result};

/// Smallest possible gzip member: 10-byte header + empty deflate block + trailer.
const GZIP_MIN_LEN: u64 = 18;

pub(crate) struct StreamContainerReader {
    path: PathBuf,
    compression: Compression,
}

impl StreamContainerReader {
    pub(crate) fn open(path: &Path, compression: Compression) -> Result<Self> {
        fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            compression,
        })
    }

    fn describe(&self) -> Result<EntryDescriptor> {
        let metadata = fs::metadata(&self.path)?;
        let mut key = default_stream_key(&self.path);
        let mut modified = metadata.modified().ok();
        let mut size = 0;

        if self.compression == Compression::Gzip {
            let decoder = flate2::read::GzDecoder::new(super::open_file(&self.path)?);
            if let Some(header) = decoder.header() {
                if let Some(name) = header.filename() {
                    let name = normalize_key(&String::from_utf8_lossy(name));
                    if !name.is_empty() {
                        key = name;
                    }
                }
                if header.mtime() != 0 {
                    modified = Some(timestamp::from_unix_secs(header.mtime() as u64));
                }
            }
            size = gzip_isize(&self.path, metadata.len()).unwrap_or(0);
        }

        Ok(EntryDescriptor::file(&key, size)
            .with_compressed_size(metadata.len())
            .with_modified(modified))
    }
}

/// Reads the ISIZE field from the gzip trailer.
fn gzip_isize(path: &Path, len: u64) -> io::Result<u64> {
    if len < GZIP_MIN_LEN {
        return Ok(0);
    }
    let mut file = File::open(path)?;
    file.seek(SeekFrom::End(-4))?;
    let mut trailer = [0u8; 4];
    file.read_exact(&mut trailer)?;
    Ok(u32::from_le_bytes(trailer) as u64)
}

impl ContainerReader for StreamContainerReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Stream(self.compression)
    }

    fn entries(&mut self) -> Result<Vec<EntryDescriptor>> {
        Ok(vec![self.describe()?])
    }

    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        let descriptor = self.describe()?;
        let file = super::open_file(&self.path)?;
        let mut data = super::decoder(file, self.compression);
        visitor(&descriptor, &mut data)
    }
}

enum StreamState<W: Write> {
    Pending(W),
    Written,
}

pub(crate) struct StreamContainerWriter<W: Write> {
    state: Option<StreamState<W>>,
    path: PathBuf,
    compression: Compression,
    level: CompressionLevel,
}

impl<W: Write> StreamContainerWriter<W> {
    pub(crate) fn new(
        inner: W,
        path: &Path,
        compression: Compression,
        level: CompressionLevel,
    ) -> Self {
        Self {
            state: Some(StreamState::Pending(inner)),
            path: path.to_path_buf(),
            compression,
            level,
        }
    }

    fn encoder(&self, inner: W, key: &str, modified: Option<SystemTime>) -> CompressedWriter<W> {
        match self.compression {
            Compression::Gzip => {
                let name = normalize_key(key);
                let name = name.rsplit('/').next().unwrap_or_default().to_string();
                let mtime = modified.map(timestamp::tar_mtime).unwrap_or(0);
                let encoder = flate2::GzBuilder::new()
                    .filename(name)
                    .mtime(u32::try_from(mtime).unwrap_or(0))
                    .write(inner, flate2::Compression::new(self.level.deflate()));
                CompressedWriter::from_gzip(encoder)
            }
            other => CompressedWriter::new(inner, other, self.level),
        }
    }

    fn write_stream(
        &self,
        inner: W,
        key: &str,
        modified: Option<SystemTime>,
        data: &mut dyn Read,
    ) -> Result<u64> {
        let mut encoder = self.encoder(inner, key, modified);
        let written = copy_entry(data, &mut encoder).map_err(|e| e.into_error(key, &self.path))?;
        let mut inner = encoder
            .finish()
            .map_err(|e| Error::destination(&self.path, e))?;
        inner
            .flush()
            .map_err(|e| Error::destination(&self.path, e))?;
        Ok(written)
    }
}

impl<W: Write> ContainerWriter for StreamContainerWriter<W> {
    fn add_directory(&mut self, key: &str, _modified: Option<SystemTime>) -> Result<()> {
        log::debug!("single-stream wrapper ignores directory '{}'", key);
        Ok(())
    }

    fn add_entry(
        &mut self,
        key: &str,
        _size: u64,
        modified: Option<SystemTime>,
        data: &mut dyn Read,
    ) -> Result<u64> {
        match self.state.take() {
            Some(StreamState::Pending(inner)) => {
                self.state = Some(StreamState::Written);
                self.write_stream(inner, key, modified, data)
            }
            _ => {
                self.state = Some(StreamState::Written);
                Err(Error::TooManyEntries {
                    format: ArchiveFormat::Stream(self.compression),
                    count: 2,
                })
            }
        }
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        // Nothing was added: still produce a valid, empty stream.
        if let Some(StreamState::Pending(inner)) = self.state.take() {
            let key = default_stream_key(&self.path);
            self.write_stream(inner, &key, None, &mut io::empty())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_header_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.gz");
        let file = File::create(&path).unwrap();
        let mut writer = StreamContainerWriter::new(
            file,
            &path,
            Compression::Gzip,
            CompressionLevel::Normal,
        );
        let mut data: &[u8] = b"payload bytes";
        writer
            .add_entry("sub/original.txt", 13, None, &mut data)
            .unwrap();
        Box::new(writer).finish().unwrap();

        let mut reader = StreamContainerReader::open(&path, Compression::Gzip).unwrap();
        let entries = reader.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "original.txt");
        assert_eq!(entries[0].size, 13);
    }

    #[test]
    fn test_xz_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql.xz");
        let file = File::create(&path).unwrap();
        let mut writer =
            StreamContainerWriter::new(file, &path, Compression::Xz, CompressionLevel::Fast);
        let mut data: &[u8] = b"select 1;";
        writer.add_entry("ignored", 9, None, &mut data).unwrap();
        Box::new(writer).finish().unwrap();

        let mut reader = StreamContainerReader::open(&path, Compression::Xz).unwrap();
        let entries = reader.entries().unwrap();
        assert_eq!(entries[0].key, "dump.sql");
        assert_eq!(entries[0].size, 0);
    }

    #[test]
    fn test_second_entry_rejected() {
        let mut writer = StreamContainerWriter::new(
            Vec::new(),
            Path::new("x.bz2"),
            Compression::Bzip2,
            CompressionLevel::Fast,
        );
        let mut a: &[u8] = b"a";
        let mut b: &[u8] = b"b";
        writer.add_entry("a", 1, None, &mut a).unwrap();
        let err = writer.add_entry("b", 1, None, &mut b).unwrap_err();
        assert!(matches!(err, Error::TooManyEntries { .. }));
    }

    #[test]
    fn test_empty_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt.gz");
        let file = File::create(&path).unwrap();
        let writer =
            StreamContainerWriter::new(file, &path, Compression::Gzip, CompressionLevel::Normal);
        Box::new(writer).finish().unwrap();

        let mut reader = StreamContainerReader::open(&path, Compression::Gzip).unwrap();
        let mut content = Vec::new();
        reader
            .visit(&mut |_, data| {
                data.read_to_end(&mut content)?;
                Ok(())
            })
            .unwrap();
        assert!(content.is_empty());
    }
}
