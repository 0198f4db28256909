//! Status snapshot
//!
//! Fields are fixed-capacity strings sized to what the display can show.
//! Every update replaces a field wholesale; oversized input is truncated
//! on a UTF-8 boundary rather than rejected.

use heapless::String;

use crate::clock::{split_timestamp, ParseError, TimeReading};
use crate::feed::{ColorTopic, ColorUpdate};

/// "YYYY-MM-DD"
pub const DATE_LEN: usize = 10;

/// "HH:MM:SS"
pub const TIME_LEN: usize = 8;

/// Longest color name kept
pub const COLOR_NAME_LEN: usize = 15;

/// "#RRGGBB"
pub const COLOR_CODE_LEN: usize = 7;

/// Copy at most `N` bytes of `bytes`, stopping at the last complete
/// UTF-8 character
fn bounded_copy<const N: usize>(bytes: &[u8]) -> String<N> {
    let prefix = &bytes[..bytes.len().min(N)];
    let valid = match core::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&prefix[..e.valid_up_to()]).unwrap_or(""),
    };

    let mut out = String::new();
    // Fits: `valid` is at most N bytes
    let _ = out.push_str(valid);
    out
}

/// Current time and color state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    date: String<DATE_LEN>,
    time: String<TIME_LEN>,
    color_name: String<COLOR_NAME_LEN>,
    color_code: String<COLOR_CODE_LEN>,
}

impl StatusSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace date and time from a clock reading
    ///
    /// On a malformed timestamp both fields keep their previous values.
    pub fn update_time(&mut self, reading: &TimeReading) -> Result<(), ParseError> {
        let (date, time) = split_timestamp(&reading.timestamp)?;
        self.date = bounded_copy(date.as_bytes());
        self.time = bounded_copy(time.as_bytes());
        Ok(())
    }

    /// Replace the color field the update is addressed to
    pub fn update_color(&mut self, update: ColorUpdate<'_>) {
        match update.topic {
            ColorTopic::Name => self.color_name = bounded_copy(update.value),
            ColorTopic::Code => self.color_code = bounded_copy(update.value),
        }
    }

    /// Take an immutable copy for rendering or serving
    pub fn read(&self) -> StatusSnapshot {
        self.clone()
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn color_name(&self) -> &str {
        &self.color_name
    }

    pub fn color_code(&self) -> &str {
        &self.color_code
    }

    /// Check if a time has been written
    pub fn has_time(&self) -> bool {
        !self.time.is_empty()
    }

    /// Parse hour and minute from the time field
    ///
    /// Returns `None` until a well-formed "HH:MM..." time is present.
    pub fn hour_minute(&self) -> Option<(u8, u8)> {
        let bytes = self.time.as_bytes();
        if bytes.len() < 5 || bytes[2] != b':' {
            return None;
        }
        let hour = self.time.get(0..2)?.parse().ok()?;
        let minute = self.time.get(3..5)?.parse().ok()?;
        Some((hour, minute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn name(value: &[u8]) -> ColorUpdate<'_> {
        ColorUpdate {
            topic: ColorTopic::Name,
            value,
        }
    }

    fn code(value: &[u8]) -> ColorUpdate<'_> {
        ColorUpdate {
            topic: ColorTopic::Code,
            value,
        }
    }

    #[test]
    fn test_starts_empty() {
        let snapshot = StatusSnapshot::new();
        assert_eq!(snapshot.date(), "");
        assert_eq!(snapshot.time(), "");
        assert_eq!(snapshot.color_name(), "");
        assert_eq!(snapshot.color_code(), "");
        assert!(!snapshot.has_time());
        assert_eq!(snapshot.hour_minute(), None);
    }

    #[test]
    fn test_update_time() {
        let mut snapshot = StatusSnapshot::new();
        let reading = TimeReading::from_epoch(1_700_000_000);
        snapshot.update_time(&reading).unwrap();

        assert_eq!(snapshot.date(), "2023-11-14");
        assert_eq!(snapshot.time(), "22:13:20");
        assert_eq!(snapshot.hour_minute(), Some((22, 13)));
    }

    #[test]
    fn test_update_time_malformed_keeps_previous() {
        let mut snapshot = StatusSnapshot::new();
        snapshot
            .update_time(&TimeReading::from_epoch(1_700_000_000))
            .unwrap();

        let mut bad = TimeReading::from_epoch(0);
        bad.timestamp.clear();
        bad.timestamp.push_str("1970-01-01").unwrap();

        assert_eq!(snapshot.update_time(&bad), Err(ParseError::MissingSeparator));
        assert_eq!(snapshot.date(), "2023-11-14");
        assert_eq!(snapshot.time(), "22:13:20");
    }

    #[test]
    fn test_shorter_value_replaces_longer() {
        let mut snapshot = StatusSnapshot::new();
        snapshot.update_color(name(b"springgreen"));
        snapshot.update_color(name(b"red"));
        assert_eq!(snapshot.color_name(), "red");
    }

    #[test]
    fn test_overlong_value_truncated() {
        let mut snapshot = StatusSnapshot::new();
        snapshot.update_color(name(b"averyveryverylongcolorname"));
        snapshot.update_color(code(b"#FF00FF00"));
        assert_eq!(snapshot.color_name(), "averyveryverylo");
        assert_eq!(snapshot.color_code(), "#FF00FF");
    }

    #[test]
    fn test_truncation_respects_utf8() {
        let mut snapshot = StatusSnapshot::new();
        // 14 ASCII bytes then a 2-byte character straddling the limit
        snapshot.update_color(name("abcdefghijklmné".as_bytes()));
        assert_eq!(snapshot.color_name(), "abcdefghijklmn");
    }

    #[test]
    fn test_read_is_a_copy() {
        let mut snapshot = StatusSnapshot::new();
        snapshot.update_color(name(b"blue"));
        let copy = snapshot.read();
        snapshot.update_color(name(b"green"));
        assert_eq!(copy.color_name(), "blue");
        assert_eq!(snapshot.color_name(), "green");
    }

    proptest! {
        #[test]
        fn prop_color_update_touches_only_its_field(
            payload in proptest::collection::vec(0x20u8..0x7F, 0..32),
            to_name in any::<bool>(),
        ) {
            let mut snapshot = StatusSnapshot::new();
            snapshot.update_color(name(b"oldlace"));
            snapshot.update_color(code(b"#FDF5E6"));

            let (update, cap) = if to_name {
                (name(&payload), COLOR_NAME_LEN)
            } else {
                (code(&payload), COLOR_CODE_LEN)
            };
            snapshot.update_color(update);

            let expected = core::str::from_utf8(&payload[..payload.len().min(cap)]).unwrap();
            if to_name {
                prop_assert_eq!(snapshot.color_name(), expected);
                prop_assert_eq!(snapshot.color_code(), "#FDF5E6");
            } else {
                prop_assert_eq!(snapshot.color_code(), expected);
                prop_assert_eq!(snapshot.color_name(), "oldlace");
            }
        }
    }
}
