//! Proleptic Gregorian calendar arithmetic

/// Seconds per day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Last second representable as a four-digit year (9999-12-31T23:59:59)
pub const MAX_EPOCH_S: u64 = 253_402_300_799;

/// Convert days since 1970-01-01 to (year, month, day)
///
/// Howard Hinnant's `civil_from_days`, valid for the whole `i64` day range
/// the callers produce.
pub fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Broken-down calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Break down seconds since the Unix epoch
    ///
    /// Values past year 9999 are clamped.
    pub fn from_epoch(epoch_s: u64) -> Self {
        let epoch_s = epoch_s.min(MAX_EPOCH_S);
        let days = (epoch_s / SECONDS_PER_DAY) as i64;
        let secs = epoch_s % SECONDS_PER_DAY;
        let (year, month, day) = civil_from_days(days);

        Self {
            year: year as u16,
            month,
            day,
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}
