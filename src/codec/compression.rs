//! Whole-stream compression wrappers shared by the tar and stream backends.

use std::io::{self, Read, Write};

use crate::format::Compression;
use crate::write::CompressionLevel;

/// Wraps `reader` in the decoder for `compression`.
///
/// Multi-member gzip and multi-stream bzip2/xz files are decoded as one
/// concatenated stream.
pub(crate) fn decoder<'a, R: Read + 'a>(reader: R, compression: Compression) -> Box<dyn Read + 'a> {
    match compression {
        Compression::None => Box::new(reader),
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
        Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
        Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
    }
}

/// Encoder wrapper for whole-stream compression.
pub(crate) enum CompressedWriter<W: Write> {
    Plain(W),
    Gzip(flate2::write::GzEncoder<W>),
    Bzip2(bzip2::write::BzEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
}

impl<W: Write> CompressedWriter<W> {
    pub(crate) fn new(inner: W, compression: Compression, level: CompressionLevel) -> Self {
        match compression {
            Compression::None => Self::Plain(inner),
            Compression::Gzip => Self::Gzip(flate2::write::GzEncoder::new(
                inner,
                flate2::Compression::new(level.deflate()),
            )),
            Compression::Bzip2 => Self::Bzip2(bzip2::write::BzEncoder::new(
                inner,
                bzip2::Compression::new(level.bzip2()),
            )),
            Compression::Xz => Self::Xz(xz2::write::XzEncoder::new(inner, level.xz_preset())),
        }
    }

    /// Wraps an already configured gzip encoder (one carrying a header).
    pub(crate) fn from_gzip(encoder: flate2::write::GzEncoder<W>) -> Self {
        Self::Gzip(encoder)
    }

    /// Writes the stream trailer and returns the inner writer.
    pub(crate) fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(w) => Ok(w),
            Self::Gzip(e) => e.finish(),
            Self::Bzip2(e) => e.finish(),
            Self::Xz(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(e) => e.write(buf),
            Self::Bzip2(e) => e.write(buf),
            Self::Xz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(e) => e.flush(),
            Self::Bzip2(e) => e.flush(),
            Self::Xz(e) => e.flush(),
        }
    }
}
