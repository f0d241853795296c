//! Entry descriptors and listing order.

use std::cmp::Ordering;
use std::time::SystemTime;

use crate::key;

/// Metadata of one entry inside a container.
///
/// Descriptors are produced by listing and handed to every visitor. The key
/// is normalized (forward slashes, no leading slash) and keeps the case it
/// was stored with; directory keys end with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EntryDescriptor {
    /// Normalized relative path of the entry.
    pub key: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Uncompressed size in bytes.
    ///
    /// Single-stream wrappers that do not record a size report 0.
    pub size: u64,
    /// Stored (compressed) size in bytes, when the container records it.
    pub compressed_size: u64,
    /// Last modification time, when the container records one.
    pub modified: Option<SystemTime>,
    /// CRC-32 of the uncompressed data, when the container records one.
    pub crc32: Option<u32>,
    /// Whether the entry's data is encrypted.
    ///
    /// Encrypted entries are listed but cannot be read.
    pub is_encrypted: bool,
}

impl EntryDescriptor {
    /// Creates a file descriptor with only a key and size set.
    pub fn file(key: &str, size: u64) -> Self {
        Self {
            key: key::normalize_key(key),
            is_directory: false,
            size,
            compressed_size: 0,
            modified: None,
            crc32: None,
            is_encrypted: false,
        }
    }

    /// Creates a directory descriptor. A trailing `/` is added if missing.
    pub fn directory(key: &str) -> Self {
        let mut key = key::normalize_key(key);
        if !key.ends_with('/') {
            key.push('/');
        }
        Self {
            key,
            is_directory: true,
            size: 0,
            compressed_size: 0,
            modified: None,
            crc32: None,
            is_encrypted: false,
        }
    }

    pub(crate) fn with_modified(mut self, modified: Option<SystemTime>) -> Self {
        self.modified = modified;
        self
    }

    pub(crate) fn with_crc32(mut self, crc32: Option<u32>) -> Self {
        self.crc32 = crc32;
        self
    }

    pub(crate) fn with_compressed_size(mut self, compressed_size: u64) -> Self {
        self.compressed_size = compressed_size;
        self
    }

    pub(crate) fn with_encrypted(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = is_encrypted;
        self
    }

    /// Returns the last path segment of the key.
    pub fn name(&self) -> &str {
        self.key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.key)
    }

    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.size as f64
        }
    }
}

/// Listing order: directories first, then keys ascending case-insensitively.
pub fn listing_order(a: &EntryDescriptor, b: &EntryDescriptor) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| key::compare_keys(&a.key, &b.key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_key_gets_slash() {
        let dir = EntryDescriptor::directory("a\\b");
        assert_eq!(dir.key, "a/b/");
        assert!(dir.is_directory);
        assert_eq!(dir.name(), "b");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(EntryDescriptor::file("/x/y/z.txt", 3).name(), "z.txt");
        assert_eq!(EntryDescriptor::file("top", 0).name(), "top");
    }

    #[test]
    fn test_listing_order() {
        let mut entries = vec![
            EntryDescriptor::file("b.txt", 1),
            EntryDescriptor::directory("z"),
            EntryDescriptor::file("a.txt", 1),
        ];
        entries.sort_by(listing_order);
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["z/", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_compression_ratio() {
        let e = EntryDescriptor::file("a", 100).with_compressed_size(25);
        assert!((e.compression_ratio() - 0.25).abs() < 0.001);
        assert_eq!(EntryDescriptor::file("a", 0).compression_ratio(), 1.0);
    }
}
