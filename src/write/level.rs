//! Compression levels and their per-codec settings.

use std::fmt;
use std::str::FromStr;

/// Format-neutral compression level.
///
/// Each codec maps the level through a fixed, monotonic table:
///
/// | Level | deflate (zip, gzip) | bzip2 | xz |
/// |-------|---------------------|-------|----|
/// | `None` | 0 (zip entries are stored) | 1 | 0 |
/// | `Fastest` | 1 | 1 | 1 |
/// | `Fast` | 3 | 3 | 3 |
/// | `Normal` | 6 | 6 | 6 |
/// | `Maximum` | 9 | 9 | 9 |
/// | `Ultra` | 9 | 9 | 9 + extreme |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CompressionLevel {
    /// No compression where the codec allows it.
    None,
    /// Fastest compression.
    Fastest,
    /// Fast compression.
    Fast,
    /// Balanced speed and ratio.
    #[default]
    Normal,
    /// Best ratio at normal settings.
    Maximum,
    /// Best ratio, slowest.
    Ultra,
}

impl CompressionLevel {
    /// All levels from weakest to strongest.
    pub const ALL: [CompressionLevel; 6] = [
        CompressionLevel::None,
        CompressionLevel::Fastest,
        CompressionLevel::Fast,
        CompressionLevel::Normal,
        CompressionLevel::Maximum,
        CompressionLevel::Ultra,
    ];

    /// Returns the deflate level (zip entries, gzip).
    pub fn deflate(&self) -> u32 {
        match self {
            CompressionLevel::None => 0,
            CompressionLevel::Fastest => 1,
            CompressionLevel::Fast => 3,
            CompressionLevel::Normal => 6,
            CompressionLevel::Maximum | CompressionLevel::Ultra => 9,
        }
    }

    /// Returns the bzip2 block-size level. bzip2 cannot store, so `None`
    /// maps to the cheapest setting.
    pub fn bzip2(&self) -> u32 {
        match self {
            CompressionLevel::None | CompressionLevel::Fastest => 1,
            CompressionLevel::Fast => 3,
            CompressionLevel::Normal => 6,
            CompressionLevel::Maximum | CompressionLevel::Ultra => 9,
        }
    }

    /// Returns the xz preset, with the extreme flag folded in for `Ultra`.
    pub fn xz_preset(&self) -> u32 {
        const LZMA_PRESET_EXTREME: u32 = 0x8000_0000;
        match self {
            CompressionLevel::Ultra => 9 | LZMA_PRESET_EXTREME,
            other => other.deflate(),
        }
    }

    /// Returns `true` if zip entries should be stored uncompressed.
    pub fn is_stored(&self) -> bool {
        *self == CompressionLevel::None
    }

    /// Returns the lower-case name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionLevel::None => "none",
            CompressionLevel::Fastest => "fastest",
            CompressionLevel::Fast => "fast",
            CompressionLevel::Normal => "normal",
            CompressionLevel::Maximum => "maximum",
            CompressionLevel::Ultra => "ultra",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CompressionLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown compression level '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        let deflate: Vec<_> = CompressionLevel::ALL.iter().map(|l| l.deflate()).collect();
        let bzip2: Vec<_> = CompressionLevel::ALL.iter().map(|l| l.bzip2()).collect();
        assert_eq!(deflate, vec![0, 1, 3, 6, 9, 9]);
        assert_eq!(bzip2, vec![1, 1, 3, 6, 9, 9]);
        assert_eq!(CompressionLevel::None.xz_preset(), 0);
        assert_eq!(CompressionLevel::Maximum.xz_preset(), 9);
        assert_eq!(CompressionLevel::Ultra.xz_preset() & 0xff, 9);
        assert_ne!(CompressionLevel::Ultra.xz_preset(), 9);
    }

    #[test]
    fn test_monotonic() {
        for pair in CompressionLevel::ALL.windows(2) {
            assert!(pair[0].deflate() <= pair[1].deflate());
            assert!(pair[0].bzip2() <= pair[1].bzip2());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("ULTRA".parse::<CompressionLevel>(), Ok(CompressionLevel::Ultra));
        assert!("turbo".parse::<CompressionLevel>().is_err());
        assert_eq!(CompressionLevel::default(), CompressionLevel::Normal);
        assert!(CompressionLevel::None.is_stored());
    }
}
