/*!
 Conversions from the timestamp epochs used by Apple's on-disk formats to
 [`DateTime<Utc>`].

 Alias records store HFS dates (seconds since 1904-01-01, with an optional
 1/65535 s fraction); Bookmark data and `NSDate` store Mac absolute time
 (seconds since 2001-01-01). A zero timestamp means "not set" in all of
 these formats and maps to `None`.
*/

use chrono::{DateTime, Utc};

/// Seconds between the HFS epoch (1904-01-01) and the UNIX epoch (1970-01-01)
pub const HFS_TO_UNIX_SHIFT: i64 = 2_082_844_800;

/// Seconds between the UNIX epoch (1970-01-01) and the Mac absolute time epoch (2001-01-01)
pub const MAC_ABSOLUTE_TO_UNIX_SHIFT: i64 = 978_307_200;

/// Fractional-second resolution of the 8-byte HFS+ timestamp
const HFS_FRACTION_RESOLUTION: u64 = 65_535;

/// Convert whole seconds since the HFS epoch (Alias v2 header dates)
pub fn from_hfs_seconds(seconds: u32) -> Option<DateTime<Utc>> {
    if seconds == 0 {
        return None;
    }
    DateTime::from_timestamp(i64::from(seconds) - HFS_TO_UNIX_SHIFT, 0)
}

/// Convert the 8-byte HFS+ timestamp: 16-bit high seconds, 32-bit low
/// seconds, and a 16-bit fraction counted in 1/65535ths of a second
pub fn from_hfs_fraction(high: u16, low: u32, fraction: u16) -> Option<DateTime<Utc>> {
    let mut seconds = (u64::from(high) << 32) | u64::from(low);
    if seconds == 0 && fraction == 0 {
        return None;
    }
    let mut micros =
        (u64::from(fraction) * 1_000_000 + HFS_FRACTION_RESOLUTION / 2) / HFS_FRACTION_RESOLUTION;
    if micros >= 1_000_000 {
        seconds += 1;
        micros -= 1_000_000;
    }
    DateTime::from_timestamp(
        i64::try_from(seconds).ok()? - HFS_TO_UNIX_SHIFT,
        (micros as u32) * 1_000,
    )
}

/// Convert Mac absolute time: fractional seconds since 2001-01-01
pub fn from_mac_absolute_time(seconds: f64) -> Option<DateTime<Utc>> {
    if seconds == 0.0 || !seconds.is_finite() {
        return None;
    }
    let micros = ((seconds + MAC_ABSOLUTE_TO_UNIX_SHIFT as f64) * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

#[cfg(test)]
mod dates_tests {
    use crate::util::dates::{
        from_hfs_fraction, from_hfs_seconds, from_mac_absolute_time, HFS_TO_UNIX_SHIFT,
    };
    use chrono::{TimeZone, Utc};

    #[test]
    fn hfs_epoch_shift_lands_on_unix_epoch() {
        let date = from_hfs_seconds(HFS_TO_UNIX_SHIFT as u32).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn zero_hfs_timestamp_is_not_set() {
        assert!(from_hfs_seconds(0).is_none());
        assert!(from_hfs_fraction(0, 0, 0).is_none());
    }

    #[test]
    fn hfs_fraction_rounds_to_microseconds() {
        let date = from_hfs_fraction(0, (HFS_TO_UNIX_SHIFT + 86_400) as u32, 32_768).unwrap();
        assert_eq!(
            date.date_naive(),
            Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap().date_naive()
        );
        // 32768/65535 of a second, rounded at microsecond resolution
        assert_eq!(date.timestamp_subsec_micros(), 500_008);
    }

    #[test]
    fn mac_absolute_time_starts_in_2001() {
        let date = from_mac_absolute_time(1.5).unwrap();
        assert_eq!(date.timestamp(), 978_307_201);
        assert_eq!(date.timestamp_subsec_micros(), 500_000);
    }

    #[test]
    fn zero_mac_absolute_time_is_not_set() {
        assert!(from_mac_absolute_time(0.0).is_none());
        assert!(from_mac_absolute_time(f64::NAN).is_none());
    }
}
