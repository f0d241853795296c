//! CLI tool for arcmill archive operations.

mod commands;
mod exit_codes;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use arcmill::{CancellationFlag, CompressionLevel};
use exit_codes::ExitCode;

/// Archive tool for zip, tar, gzip, bzip2 and xz files
#[derive(Parser)]
#[command(name = "arcmill")]
#[command(author, version, about = "Archive tool for zip, tar, gzip, bzip2 and xz files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive contents (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show packed size and CRC columns
        #[arg(long)]
        technical: bool,
    },

    /// Extract files from archive (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Entry keys to extract (all entries when omitted)
        keys: Vec<String>,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Do not restore modification times
        #[arg(long)]
        no_mtime: bool,
    },

    /// Test archive integrity (alias: t)
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,
    },

    /// Show archive information (alias: i)
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Create archive (alias: c)
    #[command(alias = "c")]
    Create {
        /// Archive file to create
        archive: PathBuf,

        /// Files and directories to add
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Compression level (none, fastest, fast, normal, maximum, ultra)
        #[arg(short = 'l', long, default_value = "normal")]
        level: CompressionLevel,
    },

    /// Add or replace entries (alias: a)
    #[command(alias = "a")]
    Add {
        /// Archive file to modify (created if missing)
        archive: PathBuf,

        /// Files and directories to add
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Compression level (none, fastest, fast, normal, maximum, ultra)
        #[arg(short = 'l', long, default_value = "normal")]
        level: CompressionLevel,

        /// Append new zip entries in place instead of rebuilding
        #[arg(long)]
        append: bool,
    },

    /// Delete entries (alias: d)
    #[command(alias = "d")]
    Delete {
        /// Archive file to modify
        archive: PathBuf,

        /// Entry keys to delete
        #[arg(required = true)]
        keys: Vec<String>,

        /// Compression level for the rebuilt archive
        #[arg(short = 'l', long, default_value = "normal")]
        level: CompressionLevel,
    },

    /// Copy entries into another archive
    Copy {
        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Move entries into another archive
    Move {
        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by `copy` and `move`.
#[derive(clap::Args)]
pub struct TransferArgs {
    /// Source archive
    source: PathBuf,

    /// Destination archive (created if missing)
    dest: PathBuf,

    /// Entry keys to transfer
    #[arg(required = true)]
    keys: Vec<String>,

    /// Prefix to strip from source keys
    #[arg(long, default_value = "")]
    source_prefix: String,

    /// Prefix to prepend to destination keys
    #[arg(long, default_value = "")]
    dest_prefix: String,

    /// Replace entries that already exist in the destination
    #[arg(long)]
    overwrite: bool,

    /// Treat same-size collisions as conflicts instead of skipping them
    #[arg(long)]
    no_skip_identical: bool,

    /// Compression level for the destination
    #[arg(short = 'l', long, default_value = "normal")]
    level: CompressionLevel,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    // First Ctrl+C asks the running operation to stop; a second one exits.
    let cancel = CancellationFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_flag.is_cancelled() {
            eprintln!("\nInterrupted");
            std::process::exit(exit_codes::USER_INTERRUPT);
        }
        eprintln!("\nCancelling...");
        handler_flag.cancel();
    })
    .ok();

    let cli = Cli::parse();
    let ctx = commands::Context {
        format: cli.format,
        quiet: cli.quiet,
        cancel,
    };

    let exit_code = match cli.command {
        Commands::List { archive, technical } => commands::list(&ctx, &archive, technical),

        Commands::Extract {
            archive,
            keys,
            output,
            no_mtime,
        } => commands::extract(&ctx, &archive, &keys, &output, !no_mtime),

        Commands::Test { archive } => commands::test(&ctx, &archive),

        Commands::Info { archive } => commands::info(&ctx, &archive),

        Commands::Create {
            archive,
            files,
            level,
        } => commands::create(&ctx, &archive, &files, level),

        Commands::Add {
            archive,
            files,
            level,
            append,
        } => commands::add(&ctx, &archive, &files, level, append),

        Commands::Delete {
            archive,
            keys,
            level,
        } => commands::delete(&ctx, &archive, &keys, level),

        Commands::Copy { transfer } => commands::transfer_entries(&ctx, &transfer, false),

        Commands::Move { transfer } => commands::transfer_entries(&ctx, &transfer, true),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
