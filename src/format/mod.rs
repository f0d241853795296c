//! Archive formats, families and name-based classification.
//!
//! Every operation in the crate starts by resolving the archive path into an
//! [`ArchiveFormat`]. The format is a plain value carried by each plan and
//! handle; nothing about the "current format" is stored globally.
//!
//! # Families
//!
//! | Family | Formats | Writable | In-place edits |
//! |--------|---------|----------|----------------|
//! | [`ArchiveFamily::RandomAccess`] | zip | yes | append only |
//! | [`ArchiveFamily::RandomAccess`] | lzh, cab | no | no |
//! | [`ArchiveFamily::Sequential`] | tar, tar.gz, tar.bz2, tar.xz | yes | no |
//! | [`ArchiveFamily::SingleStream`] | gz, bz2, xz | yes (one entry) | no |
//!
//! # Example
//!
//! ```rust
//! use arcmill::format::{classify, ArchiveFamily, ArchiveFormat, Compression, Intent};
//!
//! let tgz = classify("x.tgz", Intent::Read)?;
//! assert_eq!(tgz, classify("x.tar.gz", Intent::Read)?);
//! assert_eq!(tgz, ArchiveFormat::Tar(Compression::Gzip));
//!
//! let gz = classify("x.gz", Intent::Read)?;
//! assert_eq!(gz.family(), ArchiveFamily::SingleStream);
//! # Ok::<(), arcmill::Error>(())
//! ```

mod resolve;

pub use resolve::{Intent, classify, classify_for_write, default_stream_key};

/// Structural category of a container format.
///
/// The family decides which writer settings apply and whether an archive
/// can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFamily {
    /// Central-directory containers where entries can be located directly.
    RandomAccess,
    /// Write-once streams of entries (tar), optionally wrapped in a compressor.
    Sequential,
    /// A single compressed payload with no container around it.
    SingleStream,
}

/// Whole-stream compression applied around a sequential container, or the
/// payload codec of a single-stream wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// No compression.
    #[default]
    None,
    /// gzip (DEFLATE).
    Gzip,
    /// bzip2.
    Bzip2,
    /// xz (LZMA2).
    Xz,
}

impl Compression {
    /// Returns the conventional file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Gzip => "gz",
            Compression::Bzip2 => "bz2",
            Compression::Xz => "xz",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Compression::None => "RAW",
            Compression::Gzip => "GZIP",
            Compression::Bzip2 => "BZIP2",
            Compression::Xz => "XZ",
        }
    }
}

/// A fully resolved archive format: family plus compression profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP archive; the create/modify-capable random-access format.
    Zip,
    /// LZH/LHA archive; read-only legacy random-access format.
    Lzh,
    /// Microsoft Cabinet; read-only legacy random-access format.
    Cab,
    /// TAR archive with optional whole-stream compression.
    Tar(Compression),
    /// A single compressed file (`.gz`, `.bz2`, `.xz`).
    Stream(Compression),
}

impl ArchiveFormat {
    /// Returns the structural family of this format.
    pub fn family(&self) -> ArchiveFamily {
        match self {
            ArchiveFormat::Zip | ArchiveFormat::Lzh | ArchiveFormat::Cab => {
                ArchiveFamily::RandomAccess
            }
            ArchiveFormat::Tar(_) => ArchiveFamily::Sequential,
            ArchiveFormat::Stream(_) => ArchiveFamily::SingleStream,
        }
    }

    /// Returns the compression profile.
    ///
    /// Random-access formats compress per entry and report
    /// [`Compression::None`] here.
    pub fn compression(&self) -> Compression {
        match self {
            ArchiveFormat::Tar(c) | ArchiveFormat::Stream(c) => *c,
            _ => Compression::None,
        }
    }

    /// Returns whether the engine can create or modify this format.
    pub fn is_writable(&self) -> bool {
        !matches!(self, ArchiveFormat::Lzh | ArchiveFormat::Cab)
    }

    /// Returns whether entries can be deleted after the fact, which is what
    /// a "move" needs on its source side.
    pub fn supports_deletion(&self) -> bool {
        matches!(self, ArchiveFormat::Zip | ArchiveFormat::Tar(_))
    }

    /// Returns whether the container records directory entries.
    pub fn holds_directories(&self) -> bool {
        !matches!(self, ArchiveFormat::Stream(_))
    }

    /// Returns the canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Lzh => "lzh",
            ArchiveFormat::Cab => "cab",
            ArchiveFormat::Tar(Compression::None) => "tar",
            ArchiveFormat::Tar(Compression::Gzip) => "tar.gz",
            ArchiveFormat::Tar(Compression::Bzip2) => "tar.bz2",
            ArchiveFormat::Tar(Compression::Xz) => "tar.xz",
            ArchiveFormat::Stream(c) => c.extension(),
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFormat::Zip => write!(f, "ZIP"),
            ArchiveFormat::Lzh => write!(f, "LZH"),
            ArchiveFormat::Cab => write!(f, "CAB"),
            ArchiveFormat::Tar(Compression::None) => write!(f, "TAR"),
            ArchiveFormat::Tar(c) => write!(f, "TAR+{}", c.name()),
            ArchiveFormat::Stream(c) => write!(f, "{}", c.name()),
        }
    }
}
