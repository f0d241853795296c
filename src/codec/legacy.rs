//! Read-only LZH and CAB backends over `oxiarc-archive`.
//!
//! Both decoders materialize one entry at a time in memory before handing
//! it to the visitor.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use oxiarc_archive::{CabReader, LzhReader};

use super::{ContainerReader, EntryVisitor, MAX_PREALLOC, Unreadable};
use crate::format::ArchiveFormat;
use crate::read::EntryDescriptor;
use crate::{Error, Result};

fn describe(entry: &oxiarc_core::Entry) -> EntryDescriptor {
    let descriptor = if entry.is_dir() {
        EntryDescriptor::directory(&entry.name)
    } else {
        EntryDescriptor::file(&entry.name, entry.size)
    };
    descriptor
        .with_compressed_size(entry.compressed_size)
        .with_modified(entry.modified)
        .with_crc32(entry.crc32)
}

pub(crate) struct LzhContainerReader {
    reader: LzhReader<BufReader<File>>,
}

impl LzhContainerReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = super::open_file(path)?;
        let reader = LzhReader::new(file).map_err(|e| Error::codec(ArchiveFormat::Lzh, e))?;
        Ok(Self { reader })
    }
}

impl ContainerReader for LzhContainerReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Lzh
    }

    fn entries(&mut self) -> Result<Vec<EntryDescriptor>> {
        Ok(self.reader.entries().iter().map(describe).collect())
    }

    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        for entry in self.reader.entries() {
            let descriptor = describe(&entry);
            if descriptor.is_directory {
                visitor(&descriptor, &mut io::empty())?;
                continue;
            }
            let mut data = Vec::with_capacity(entry.size.min(MAX_PREALLOC) as usize);
            match self.reader.extract(&entry, &mut data) {
                Ok(_) => visitor(&descriptor, &mut data.as_slice())?,
                Err(e) => visitor(&descriptor, &mut Unreadable(e.to_string()))?,
            }
        }
        Ok(())
    }
}

pub(crate) struct CabContainerReader {
    reader: CabReader<BufReader<File>>,
}

impl CabContainerReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = super::open_file(path)?;
        let reader = CabReader::new(file).map_err(|e| Error::codec(ArchiveFormat::Cab, e))?;
        Ok(Self { reader })
    }
}

impl ContainerReader for CabContainerReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Cab
    }

    fn entries(&mut self) -> Result<Vec<EntryDescriptor>> {
        Ok(self.reader.entries().iter().map(describe).collect())
    }

    fn visit(&mut self, visitor: &mut EntryVisitor<'_>) -> Result<()> {
        let descriptors: Vec<_> = self.reader.entries().iter().map(describe).collect();
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.is_directory {
                visitor(descriptor, &mut io::empty())?;
                continue;
            }
            match self.reader.extract_by_index(index) {
                Ok(data) => visitor(descriptor, &mut data.as_slice())?,
                Err(e) => visitor(descriptor, &mut Unreadable(e.to_string()))?,
            }
        }
        Ok(())
    }
}
