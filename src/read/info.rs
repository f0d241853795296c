//! Archive information and operation result types.

use crate::format::ArchiveFormat;

/// Summary of an archive's contents.
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    /// Resolved format.
    pub format: ArchiveFormat,
    /// Total number of entries (files and directories).
    pub entry_count: usize,
    /// Number of directory entries.
    pub directory_count: usize,
    /// Total uncompressed size of all files, as declared by the container.
    pub total_size: u64,
    /// Total stored size of all files.
    pub packed_size: u64,
    /// Whether any entries are encrypted.
    pub has_encrypted_entries: bool,
}

impl ArchiveInfo {
    /// Returns the number of file entries.
    pub fn file_count(&self) -> usize {
        self.entry_count - self.directory_count
    }

    /// Returns the compression ratio (packed / unpacked).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.packed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings as a fraction.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}

/// Result of testing an archive for integrity.
#[must_use = "test results should be checked to verify archive integrity"]
#[derive(Debug, Clone, Default)]
pub struct TestResult {
    /// Number of file entries tested.
    pub entries_tested: usize,
    /// Number of entries that passed.
    pub entries_passed: usize,
    /// Number of entries that failed.
    pub entries_failed: usize,
    /// Detailed failures (entry key and error message).
    pub failures: Vec<(String, String)>,
    /// Set when the archive could not be opened or walked at all.
    pub archive_error: Option<String>,
}

impl TestResult {
    /// Returns true if the archive opened and every entry passed.
    pub fn is_ok(&self) -> bool {
        self.entries_failed == 0 && self.archive_error.is_none()
    }

    /// Returns true if anything failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

/// Result of extracting entries from an archive.
#[must_use = "extraction results should be checked"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractResult {
    /// Number of files written.
    pub entries_extracted: usize,
    /// Number of directory entries created.
    pub directories_created: usize,
    /// Total bytes written to files.
    pub bytes_extracted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_info_ratio() {
        let info = ArchiveInfo {
            format: ArchiveFormat::Zip,
            entry_count: 3,
            directory_count: 1,
            total_size: 1000,
            packed_size: 500,
            has_encrypted_entries: false,
        };
        assert_eq!(info.file_count(), 2);
        assert!((info.compression_ratio() - 0.5).abs() < 0.001);
        assert!((info.space_savings() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_test_result() {
        let mut result = TestResult::default();
        assert!(result.is_ok());

        result.entries_failed = 1;
        assert!(result.is_err());

        let result = TestResult {
            archive_error: Some("truncated".into()),
            ..Default::default()
        };
        assert!(!result.is_ok());
    }
}
