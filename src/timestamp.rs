//! Timestamp conversion between container encodings and [`SystemTime`].
//!
//! Containers store modification times in different ways:
//! - zip: MS-DOS date/time fields, local calendar, 2-second precision,
//!   years 1980 through 2107
//! - tar: whole seconds since the Unix epoch
//! - gzip: 32-bit seconds since the Unix epoch, 0 meaning "unknown"
//!
//! This module converts between those encodings and `SystemTime`. DOS
//! fields are interpreted as UTC; the engine never consults the local time
//! zone, so a write/read cycle reproduces the same instant (rounded down to
//! an even second).
//!
//! # Example
//!
//! ```rust
//! use arcmill::timestamp::{DosDateTime, from_unix_secs};
//!
//! let t = from_unix_secs(1_700_000_000);
//! let dos = DosDateTime::from_system_time(t);
//! assert_eq!(dos.year, 2023);
//! assert_eq!(dos.to_system_time(), Some(t));
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: i64 = 86_400;

/// Earliest instant a DOS date/time can hold: 1980-01-01 00:00:00.
const DOS_EPOCH_UNIX: i64 = 315_532_800;

/// Calendar fields of an MS-DOS timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DosDateTime {
    /// Full year, 1980..=2107.
    pub year: u16,
    /// Month, 1..=12.
    pub month: u8,
    /// Day of month, 1..=31.
    pub day: u8,
    /// Hour, 0..=23.
    pub hour: u8,
    /// Minute, 0..=59.
    pub minute: u8,
    /// Second, 0..=58, always even.
    pub second: u8,
}

impl DosDateTime {
    /// The earliest representable value, 1980-01-01 00:00:00.
    pub const MIN: DosDateTime = DosDateTime {
        year: 1980,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// The latest representable value, 2107-12-31 23:59:58.
    pub const MAX: DosDateTime = DosDateTime {
        year: 2107,
        month: 12,
        day: 31,
        hour: 23,
        minute: 59,
        second: 58,
    };

    /// Converts a `SystemTime`, clamping to the DOS range and rounding the
    /// seconds down to an even value.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = to_unix_secs(time);
        if secs < DOS_EPOCH_UNIX {
            return Self::MIN;
        }

        let days = secs.div_euclid(SECONDS_PER_DAY);
        let rem = secs.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        if year > 2107 {
            return Self::MAX;
        }

        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (rem / 3600) as u8,
            minute: ((rem % 3600) / 60) as u8,
            second: ((rem % 60) & !1) as u8,
        }
    }

    /// Converts back to a `SystemTime`.
    ///
    /// Returns `None` for field values no real date has (month 13, day 0,
    /// hour 24 and so on), which damaged archives do contain.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        if !(1..=12).contains(&self.month)
            || !(1..=31).contains(&self.day)
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return None;
        }
        let days = days_from_civil(self.year as i64, self.month as i64, self.day as i64);
        let secs = days * SECONDS_PER_DAY
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64;
        u64::try_from(secs).ok().map(from_unix_secs)
    }
}

/// Returns the `SystemTime` for whole seconds since the Unix epoch.
pub fn from_unix_secs(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Returns whole seconds since the Unix epoch, negative for earlier times.
pub fn to_unix_secs(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => {
            let d = e.duration();
            -(d.as_secs() as i64) - i64::from(d.subsec_nanos() > 0)
        }
    }
}

/// Returns the seconds value tar headers store (clamped at the epoch).
pub(crate) fn tar_mtime(time: SystemTime) -> u64 {
    to_unix_secs(time).max(0) as u64
}

/// Formats a time as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_utc(time: SystemTime) -> String {
    let secs = to_unix_secs(time);
    let (y, m, d) = civil_from_days(secs.div_euclid(SECONDS_PER_DAY));
    let rem = secs.rem_euclid(SECONDS_PER_DAY);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        y,
        m,
        d,
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

// Howard Hinnant's days_from_civil / civil_from_days, proleptic Gregorian.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}
