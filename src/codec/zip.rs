//! Zip backend over the `zip` crate.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ContainerReader, ContainerWriter, EntryVisitor, Unreadable, copy_entry};
use crate::format::ArchiveFormat;
use crate::key::normalize_key;
use crate::read::EntryDescriptor;
use crate::timestamp::DosDateTime;
use crate::write::CompressionLevel;
use crate::{Error, Result};

const FORMAT: ArchiveFormat = ArchiveFormat::Zip;

pub(crate) struct ZipContainerReader {
    archive: ZipArchive<BufReader<File>>,
}

impl ZipContainerReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let reader = super::open_file(path)?;
        let archive = ZipArchive::new(reader).map_err(|e| Error::codec(FORMAT, e))?;
        Ok(Self { archive })
    }

    fn describe(&mut self, index: usize) -> Result<EntryDescriptor> {
        let file = self
            .archive
            .by_index_raw(index)
            .map_err(|e| Error::codec(FORMAT, e))?;

        let name = file.name().to_string();
        let descriptor = if file.is_dir() || name.ends_with('\\') {
            EntryDescriptor::directory(&name)
        } else {
            EntryDescriptor::file(&name, file.size())
        };
        let modified = file.last_modified().and_then(|dt| {
            DosDateTime {
                year: dt.year(),
                month: dt.month(),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
            }
            .to_system_time()
        });

        Ok(descriptor
            .with_compressed_size(file.compressed_size())
            .with_modified(modified)
            .with_crc32((!file.is_dir()).then(|| file.crc32()))
            .with_encrypted(file.encrypted()))
    }
}

impl ContainerReader for ZipContainerReader {
    fn format(&self) -> ArchiveFormat {
        FORMAT
    }

    fn entries(&mut self) -> Result<Vec<EntryDescriptor>> {
        (0..self.archive.len()).map(|i| self.describe(i)).collect()
    }

    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        for index in 0..self.archive.len() {
            let descriptor = self.describe(index)?;

            if descriptor.is_directory {
                visitor(&descriptor, &mut io::empty())?;
            } else if descriptor.is_encrypted {
                let mut data = Unreadable(format!("entry '{}' is encrypted", descriptor.key));
                visitor(&descriptor, &mut data)?;
            } else {
                match self.archive.by_index(index) {
                    Ok(mut file) => visitor(&descriptor, &mut file)?,
                    Err(e) => {
                        let mut data = Unreadable(e.to_string());
                        visitor(&descriptor, &mut data)?;
                    }
                }
            }
        }
        Ok(())
    }
}

pub(crate) struct ZipContainerWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    path: PathBuf,
    level: CompressionLevel,
}

impl<W: Write + Seek> ZipContainerWriter<W> {
    pub(crate) fn new(inner: W, path: &Path, level: CompressionLevel) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            path: path.to_path_buf(),
            level,
        }
    }

    fn options(&self, size: u64, modified: Option<SystemTime>) -> SimpleFileOptions {
        let mut options = if self.level.is_stored() {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.level.deflate() as i64))
        };
        options = options.large_file(size >= u32::MAX as u64);

        if let Some(time) = modified {
            let dos = DosDateTime::from_system_time(time);
            if let Ok(dt) = zip::DateTime::from_date_and_time(
                dos.year, dos.month, dos.day, dos.hour, dos.minute, dos.second,
            ) {
                options = options.last_modified_time(dt);
            }
        }
        options
    }

    fn write_error(&self, err: zip::result::ZipError) -> Error {
        Error::destination(&self.path, io::Error::other(err))
    }
}

impl ZipContainerWriter<File> {
    /// Opens an existing archive and positions the writer after its last
    /// entry. The central directory is rewritten by `finish`.
    pub(crate) fn append(path: &Path, level: CompressionLevel) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::destination(path, e))?;
        let zip = ZipWriter::new_append(file).map_err(|e| Error::codec(FORMAT, e))?;
        Ok(Self {
            zip,
            path: path.to_path_buf(),
            level,
        })
    }
}

impl<W: Write + Seek> ContainerWriter for ZipContainerWriter<W> {
    fn add_directory(&mut self, key: &str, modified: Option<SystemTime>) -> Result<()> {
        let options = self.options(0, modified);
        let key = normalize_key(key);
        self.zip
            .add_directory(key.trim_end_matches('/'), options)
            .map_err(|e| self.write_error(e))
    }

    fn add_entry(
        &mut self,
        key: &str,
        size: u64,
        modified: Option<SystemTime>,
        data: &mut dyn Read,
    ) -> Result<u64> {
        let options = self.options(size, modified);
        self.zip
            .start_file(normalize_key(key), options)
            .map_err(|e| self.write_error(e))?;
        copy_entry(data, &mut self.zip).map_err(|e| e.into_error(key, &self.path))
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let path = self.path;
        let mut inner = self
            .zip
            .finish()
            .map_err(|e| Error::destination(&path, io::Error::other(e)))?;
        inner.flush().map_err(|e| Error::destination(&path, e))?;
        Ok(())
    }
}
