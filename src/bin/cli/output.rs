//! Output formatting for CLI operations.

use arcmill::progress::{format_bytes_iec, format_duration};
use arcmill::timestamp::{format_utc, to_unix_secs};
use arcmill::{
    ArchiveInfo, CopyResult, EntryDescriptor, ExtractResult, MutationResult, TestResult,
    WriteResult,
};
use serde_json::json;

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a list of entries
    fn format_list(&self, entries: &[EntryDescriptor], technical: bool) -> String;

    /// Formats archive information
    fn format_info(&self, info: &ArchiveInfo) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;

    /// Formats test results
    fn format_test_result(&self, result: &TestResult) -> String;

    /// Formats creation results
    fn format_write_result(&self, result: &WriteResult) -> String;

    /// Formats add/delete results
    fn format_mutation_result(&self, result: &MutationResult) -> String;

    /// Formats copy/move results
    fn format_copy_result(&self, result: &CopyResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[EntryDescriptor], technical: bool) -> String {
        let mut output = String::new();

        // Header
        if technical {
            output.push_str(&format!(
                "{:>12} {:>12} {:>19} {:>10} {}\n",
                "Size", "Packed", "Modified", "CRC", "Name"
            ));
        } else {
            output.push_str(&format!("{:>12} {:>19} {}\n", "Size", "Modified", "Name"));
        }
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut total_size: u64 = 0;
        let mut file_count = 0;
        let mut dir_count = 0;

        for entry in entries {
            let size_str = if entry.is_directory {
                dir_count += 1;
                String::new()
            } else {
                file_count += 1;
                total_size += entry.size;
                format_bytes_iec(entry.size)
            };

            let mtime_str = entry
                .modified
                .map(format_utc)
                .unwrap_or_else(|| "-".to_string());
            let flag = if entry.is_encrypted { " *" } else { "" };

            if technical {
                let crc_str = entry
                    .crc32
                    .map(|c| format!("{:08X}", c))
                    .unwrap_or_else(|| "-".to_string());
                let packed_str = if entry.is_directory {
                    String::new()
                } else {
                    format_bytes_iec(entry.compressed_size)
                };
                output.push_str(&format!(
                    "{:>12} {:>12} {:>19} {:>10} {}{}\n",
                    size_str, packed_str, mtime_str, crc_str, entry.key, flag
                ));
            } else {
                output.push_str(&format!(
                    "{:>12} {:>19} {}{}\n",
                    size_str, mtime_str, entry.key, flag
                ));
            }
        }

        // Footer
        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} directories, {} total\n",
            file_count,
            dir_count,
            format_bytes_iec(total_size)
        ));

        output
    }

    fn format_info(&self, info: &ArchiveInfo) -> String {
        let mut output = String::new();

        output.push_str("Archive Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Format:         {}\n", info.format));
        output.push_str(&format!("  Entries:        {}\n", info.entry_count));
        output.push_str(&format!("  Files:          {}\n", info.file_count()));
        output.push_str(&format!("  Directories:    {}\n", info.directory_count));
        output.push_str(&format!(
            "  Total size:     {}\n",
            format_bytes_iec(info.total_size)
        ));
        output.push_str(&format!(
            "  Packed size:    {}\n",
            format_bytes_iec(info.packed_size)
        ));
        output.push_str(&format!(
            "  Ratio:          {:.1}%\n",
            info.compression_ratio() * 100.0
        ));
        if info.has_encrypted_entries {
            output.push_str("  Encrypted:      Yes\n");
        }

        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        format!(
            "Extracted {} files, {} directories ({})\n",
            result.entries_extracted,
            result.directories_created,
            format_bytes_iec(result.bytes_extracted)
        )
    }

    fn format_test_result(&self, result: &TestResult) -> String {
        let mut output = String::new();

        if result.is_ok() {
            output.push_str(&format!(
                "OK - {} files tested, all passed\n",
                result.entries_tested
            ));
            return output;
        }

        output.push_str("Test completed with errors:\n");
        if let Some(error) = &result.archive_error {
            output.push_str(&format!("  Archive: {}\n", error));
        }
        output.push_str(&format!("  Tested: {}\n", result.entries_tested));
        output.push_str(&format!("  Passed: {}\n", result.entries_passed));
        output.push_str(&format!("  Failed: {}\n", result.entries_failed));

        if !result.failures.is_empty() {
            output.push_str("\nFailures:\n");
            for (key, error) in &result.failures {
                output.push_str(&format!("  {}: {}\n", key, error));
            }
        }

        output
    }

    fn format_write_result(&self, result: &WriteResult) -> String {
        format!(
            "Wrote {} entries ({})\n",
            result.entries_written,
            format_bytes_iec(result.bytes_written)
        )
    }

    fn format_mutation_result(&self, result: &MutationResult) -> String {
        if result.is_unchanged() {
            return "Nothing to do\n".to_string();
        }
        let mode = if result.in_place { "appended" } else { "rebuilt" };
        format!(
            "Archive {}: {} kept, {} removed, {} added ({})\n",
            mode,
            result.entries_kept,
            result.entries_removed,
            result.entries_added,
            format_bytes_iec(result.bytes_written)
        )
    }

    fn format_copy_result(&self, result: &CopyResult) -> String {
        let mut output = format!(
            "Copied {} entries ({}), skipped {} in {}\n",
            result.copied,
            format_bytes_iec(result.bytes_copied),
            result.skipped,
            format_duration(result.elapsed)
        );
        if result.source_retained {
            output.push_str("Source archive was left unchanged\n");
        }
        for warning in &result.warnings {
            output.push_str(&format!("  warning: {}\n", warning));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[EntryDescriptor], _technical: bool) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "key": e.key,
                    "size": e.size,
                    "compressed_size": e.compressed_size,
                    "modified": e.modified.map(to_unix_secs),
                    "crc32": e.crc32,
                    "is_directory": e.is_directory,
                    "encrypted": e.is_encrypted,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, info: &ArchiveInfo) -> String {
        let obj = json!({
            "format": info.format.to_string(),
            "entry_count": info.entry_count,
            "directory_count": info.directory_count,
            "total_size": info.total_size,
            "packed_size": info.packed_size,
            "compression_ratio": info.compression_ratio(),
            "has_encrypted_entries": info.has_encrypted_entries,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "entries_extracted": result.entries_extracted,
            "directories_created": result.directories_created,
            "bytes_extracted": result.bytes_extracted,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_test_result(&self, result: &TestResult) -> String {
        let obj = json!({
            "success": result.is_ok(),
            "archive_error": result.archive_error,
            "entries_tested": result.entries_tested,
            "entries_passed": result.entries_passed,
            "entries_failed": result.entries_failed,
            "failures": result.failures.iter().map(|(k, e)| json!({"key": k, "error": e})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_write_result(&self, result: &WriteResult) -> String {
        let obj = json!({
            "entries_written": result.entries_written,
            "bytes_written": result.bytes_written,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_mutation_result(&self, result: &MutationResult) -> String {
        let obj = json!({
            "entries_kept": result.entries_kept,
            "entries_removed": result.entries_removed,
            "entries_added": result.entries_added,
            "bytes_written": result.bytes_written,
            "in_place": result.in_place,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_copy_result(&self, result: &CopyResult) -> String {
        let obj = json!({
            "success": result.success,
            "partial": result.is_partial(),
            "copied": result.copied,
            "skipped": result.skipped,
            "bytes_copied": result.bytes_copied,
            "elapsed_ms": result.elapsed.as_millis() as u64,
            "warnings": result.warnings,
            "source_retained": result.source_retained,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
