//! Wall-clock readings and timestamp splitting

use core::fmt::Write;

use heapless::String;

use super::calendar::DateTime;

/// Length of an ISO-8601 UTC timestamp ("YYYY-MM-DDTHH:MM:SSZ")
pub const TIMESTAMP_LEN: usize = 20;

/// Date/time separator in a timestamp
const SEPARATOR: char = 'T';

/// Trailing zone designator
const TERMINATOR: char = 'Z';

/// Errors from timestamp parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// No date/time separator in the timestamp
    MissingSeparator,
}

/// A local wall-clock reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeReading {
    /// Local seconds since the Unix epoch (offset already applied)
    pub epoch_s: u64,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// "YYYY-MM-DDTHH:MM:SSZ"
    pub timestamp: String<TIMESTAMP_LEN>,
}

impl TimeReading {
    /// Build a reading from local epoch seconds
    pub fn from_epoch(epoch_s: u64) -> Self {
        let dt = DateTime::from_epoch(epoch_s);

        let mut timestamp = String::new();
        // Four-digit years always fit
        let _ = write!(
            timestamp,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
        );

        Self {
            epoch_s,
            hour: dt.hour,
            minute: dt.minute,
            second: dt.second,
            timestamp,
        }
    }
}

/// Split a timestamp into its date and time parts
///
/// The date is everything before the first `T`; the time is everything
/// after it, minus a trailing `Z` when present.
pub fn split_timestamp(timestamp: &str) -> Result<(&str, &str), ParseError> {
    let (date, rest) = timestamp
        .split_once(SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;
    let time = rest.strip_suffix(TERMINATOR).unwrap_or(rest);
    Ok((date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_epoch_formats_timestamp() {
        let reading = TimeReading::from_epoch(1_700_000_000);
        assert_eq!(reading.timestamp.as_str(), "2023-11-14T22:13:20Z");
        assert_eq!((reading.hour, reading.minute, reading.second), (22, 13, 20));
    }

    #[test]
    fn test_split_timestamp() {
        assert_eq!(
            split_timestamp("2024-03-09T07:05:01Z"),
            Ok(("2024-03-09", "07:05:01"))
        );
    }

    #[test]
    fn test_split_missing_separator() {
        assert_eq!(
            split_timestamp("2024-03-09 07:05:01Z"),
            Err(ParseError::MissingSeparator)
        );
        assert_eq!(split_timestamp(""), Err(ParseError::MissingSeparator));
    }

    #[test]
    fn test_split_missing_terminator_keeps_remainder() {
        assert_eq!(
            split_timestamp("2024-03-09T07:05:01"),
            Ok(("2024-03-09", "07:05:01"))
        );
    }

    #[test]
    fn test_split_uses_first_separator() {
        assert_eq!(split_timestamp("aTbTcZ"), Ok(("a", "bTc")));
    }

    proptest! {
        #[test]
        fn prop_split_recovers_parts(
            date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
            time in "[0-9]{2}:[0-9]{2}:[0-9]{2}",
        ) {
            let mut ts: String<32> = String::new();
            write!(ts, "{}T{}Z", date, time).unwrap();
            let (d, t) = split_timestamp(&ts).unwrap();
            prop_assert_eq!(d, date.as_str());
            prop_assert_eq!(t, time.as_str());
        }

        #[test]
        fn prop_generated_timestamps_split(epoch in 0u64..4_102_444_800) {
            let reading = TimeReading::from_epoch(epoch);
            let (date, time) = split_timestamp(&reading.timestamp).unwrap();
            prop_assert_eq!(date.len(), 10);
            prop_assert_eq!(time.len(), 8);
            prop_assert_eq!(&time[..2], &reading.timestamp[11..13]);
        }
    }
}
