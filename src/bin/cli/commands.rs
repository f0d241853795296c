//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arcmill::{
    CancellationFlag, CompressionLevel, CreateOptions, ExtractOptions, MutateOptions,
    TransferOptions, mutate, read, transfer, write,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::CliProgress;
use crate::{OutputFormat, TransferArgs};

/// Settings shared by every command.
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
    pub cancel: CancellationFlag,
}

impl Context {
    fn progress(&self) -> Arc<CliProgress> {
        // JSON output goes to stdout; keep the terminal quiet.
        Arc::new(CliProgress::new(
            self.quiet || self.format == OutputFormat::Json,
        ))
    }
}

/// Reports a failed operation and maps it to an exit code.
fn fail(progress: Option<&CliProgress>, error: &arcmill::Error) -> ExitCode {
    if let Some(progress) = progress {
        progress.finish_with_message("Failed");
    }
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

/// List command implementation
pub fn list(ctx: &Context, archive: &Path, technical: bool) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    match read::list(archive) {
        Ok(entries) => {
            print!("{}", formatter.format_list(&entries, technical));
            ExitCode::Success
        }
        Err(e) => fail(None, &e),
    }
}

/// Info command implementation
pub fn info(ctx: &Context, archive: &Path) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    match read::info(archive) {
        Ok(info) => {
            print!("{}", formatter.format_info(&info));
            ExitCode::Success
        }
        Err(e) => fail(None, &e),
    }
}

/// Extract command implementation
pub fn extract(
    ctx: &Context,
    archive: &Path,
    keys: &[String],
    output: &Path,
    preserve_mtime: bool,
) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let progress = ctx.progress();
    let options = ExtractOptions::new()
        .progress(progress.clone())
        .cancel(ctx.cancel.clone())
        .preserve_mtime(preserve_mtime);

    let result = if keys.is_empty() {
        read::extract_all(archive, output, &options)
    } else {
        read::extract_subset(archive, keys, output, &options)
    };

    match result {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_extract_result(&result));
            if !keys.is_empty() && result.entries_extracted + result.directories_created == 0 {
                eprintln!("Warning: no entries matched");
                return ExitCode::Warning;
            }
            ExitCode::Success
        }
        Err(e) => fail(Some(progress.as_ref()), &e),
    }
}

/// Test command implementation
pub fn test(ctx: &Context, archive: &Path) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let result = read::test_detailed(archive);
    print!("{}", formatter.format_test_result(&result));
    if result.is_ok() {
        ExitCode::Success
    } else {
        ExitCode::BadArchive
    }
}

/// Create command implementation
pub fn create(ctx: &Context, archive: &Path, files: &[PathBuf], level: CompressionLevel) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let progress = ctx.progress();
    let options = CreateOptions::new()
        .level(level)
        .progress(progress.clone())
        .cancel(ctx.cancel.clone());

    match write::create(archive, files, &options) {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_write_result(&result));
            ExitCode::Success
        }
        Err(e) => fail(Some(progress.as_ref()), &e),
    }
}

fn mutate_options(ctx: &Context, progress: &Arc<CliProgress>, level: CompressionLevel) -> MutateOptions {
    MutateOptions::new()
        .level(level)
        .progress(progress.clone())
        .cancel(ctx.cancel.clone())
}

/// Add command implementation
pub fn add(
    ctx: &Context,
    archive: &Path,
    files: &[PathBuf],
    level: CompressionLevel,
    append: bool,
) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let progress = ctx.progress();
    let options = mutate_options(ctx, &progress, level).in_place_append(append);

    match mutate::add_or_replace(archive, files, &options) {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_mutation_result(&result));
            ExitCode::Success
        }
        Err(e) => fail(Some(progress.as_ref()), &e),
    }
}

/// Delete command implementation
pub fn delete(ctx: &Context, archive: &Path, keys: &[String], level: CompressionLevel) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let progress = ctx.progress();
    let options = mutate_options(ctx, &progress, level);

    match mutate::delete_entries(archive, keys, &options) {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_mutation_result(&result));
            if result.is_unchanged() {
                ExitCode::Warning
            } else {
                ExitCode::Success
            }
        }
        Err(e) => fail(Some(progress.as_ref()), &e),
    }
}

/// Copy and move command implementation
pub fn transfer_entries(ctx: &Context, args: &TransferArgs, remove_source: bool) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let progress = ctx.progress();
    let options = TransferOptions::new()
        .source_prefix(args.source_prefix.as_str())
        .dest_prefix(args.dest_prefix.as_str())
        .overwrite_existing(args.overwrite)
        .skip_identical(!args.no_skip_identical)
        .level(args.level)
        .progress(progress.clone())
        .cancel(ctx.cancel.clone());

    let result = if remove_source {
        transfer::move_entries(&args.source, &args.dest, &args.keys, &options)
    } else {
        transfer::copy_entries(&args.source, &args.dest, &args.keys, &options)
    };

    match result {
        Ok(result) => {
            progress.finish();
            print!("{}", formatter.format_copy_result(&result));
            if !result.success {
                ExitCode::FatalError
            } else if result.is_partial() {
                ExitCode::Warning
            } else {
                ExitCode::Success
            }
        }
        Err(e) => fail(Some(progress.as_ref()), &e),
    }
}
