use crate::error::{Result, ViewerError};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// `YYYY-MM-DDTHH:MM:SS[.fraction](±HH:MM|Z)`
///
/// The field ranges are loose (hour `[0-2]\d`, day `[0-3]\d`);
/// out-of-calendar values roll over instead of failing.
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>[01]\d)-(?P<d>[0-3]\d)T(?P<h>[0-2]\d):(?P<mi>[0-5]\d):(?P<s>[0-5]\d)(?:\.(?P<frac>\d+))?(?P<tz>[+-][0-2]\d:[0-5]\d|Z)$",
    )
    .unwrap()
});

const FRACTION_DIGITS: usize = 6;
const NANOS_PER_MILLI: i128 = 1_000_000;
const UNITS_PER_SEC: i128 = 1_000_000_000;
const MICROS_PER_SEC: i128 = 1_000_000;

/// Rendering of a zero or negative elapsed time
pub const ZERO_ELAPSED: &str = "000.000000s";

/// Parsed log timestamp.
///
/// `nanos` is the whole-second instant in epoch milliseconds scaled by
/// 1_000_000, plus the six-digit fraction as a plain microsecond count. Each
/// second therefore spans 1_000_000_000 units of which only the low
/// 1_000_000 are used. Ordering and equality look at `nanos` only;
/// `original` is kept verbatim for display and export.
#[derive(Debug, Clone)]
pub struct Timestamp {
    nanos: i128,
    original: String,
}

impl Timestamp {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ViewerError::InvalidTime(text.to_string());
        let caps = TIME_RE.captures(text).ok_or_else(invalid)?;

        let num = |name: &str| -> Result<i64> {
            caps[name].parse::<i64>().map_err(|_| invalid())
        };

        // Month, day and hour may overflow their calendar range; normalise
        // by carrying into the next unit.
        let months = num("y")? * 12 + num("mo")? - 1;
        let year = i32::try_from(months.div_euclid(12)).map_err(|_| invalid())?;
        let month = (months.rem_euclid(12) + 1) as u32;
        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;

        let offset = TimeDelta::try_days(num("d")? - 1)
            .zip(TimeDelta::try_hours(num("h")?))
            .zip(TimeDelta::try_minutes(num("mi")?))
            .zip(TimeDelta::try_seconds(num("s")?))
            .map(|(((d, h), mi), s)| d + h + mi + s)
            .ok_or_else(invalid)?;

        let local = first_of_month
            .and_time(NaiveTime::MIN)
            .checked_add_signed(offset)
            .ok_or_else(invalid)?;

        let tz_secs = parse_utc_offset(&caps["tz"]).ok_or_else(invalid)?;
        let millis = local.and_utc().timestamp_millis() - tz_secs * 1000;

        let fraction = caps
            .name("frac")
            .map(|m| pad_fraction(m.as_str()))
            .unwrap_or(0);

        Ok(Self {
            nanos: i128::from(millis) * NANOS_PER_MILLI + i128::from(fraction),
            original: text.to_string(),
        })
    }

    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Elapsed time since `reference` as `SSS.ffffffs`.
    ///
    /// A reference later than `self` renders as [`ZERO_ELAPSED`].
    pub fn elapsed(&self, reference: &Timestamp) -> String {
        let delta = self.micros() - reference.micros();
        if delta < 0 {
            return ZERO_ELAPSED.to_string();
        }
        format!("{:03}.{:06}s", delta / MICROS_PER_SEC, delta % MICROS_PER_SEC)
    }

    /// Microseconds since the epoch
    fn micros(&self) -> i128 {
        self.nanos.div_euclid(UNITS_PER_SEC) * MICROS_PER_SEC + self.nanos.rem_euclid(UNITS_PER_SEC)
    }
}

/// Right-pad (or cut) a fractional-second string to six digits, as microseconds
fn pad_fraction(digits: &str) -> i64 {
    let mut s: String = digits.chars().take(FRACTION_DIGITS).collect();
    while s.len() < FRACTION_DIGITS {
        s.push('0');
    }
    s.parse().unwrap_or(0)
}

/// `Z` or `±HH:MM` to seconds east of UTC
fn parse_utc_offset(tz: &str) -> Option<i64> {
    if tz == "Z" {
        return Some(0);
    }
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let (h, m) = tz[1..].split_once(':')?;
    let h: i64 = h.parse().ok()?;
    let m: i64 = m.parse().ok()?;
    Some(sign * (h * 3600 + m * 60))
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2019-05-15T00:00:00Z
    const BASE_MS: i128 = 1_557_878_400_000;

    #[test]
    fn test_parse_with_fraction() {
        let t = Timestamp::parse("2019-05-15T00:00:00.5Z").unwrap();
        assert_eq!(t.nanos(), BASE_MS * 1_000_000 + 500_000);
        assert_eq!(t.original(), "2019-05-15T00:00:00.5Z");
    }

    #[test]
    fn test_parse_without_fraction() {
        let t = Timestamp::parse("2019-05-15T00:00:01Z").unwrap();
        assert_eq!(t.nanos(), (BASE_MS + 1000) * 1_000_000);
    }

    #[test]
    fn test_parse_microsecond_resolution() {
        let a = Timestamp::parse("2019-05-15T00:00:00.000001Z").unwrap();
        let b = Timestamp::parse("2019-05-15T00:00:00.000002Z").unwrap();
        assert_eq!(b.nanos() - a.nanos(), 1);
    }

    #[test]
    fn test_parse_long_fraction_is_cut() {
        let a = Timestamp::parse("2019-05-15T00:00:00.123456789Z").unwrap();
        let b = Timestamp::parse("2019-05-15T00:00:00.123456Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_offset() {
        let utc = Timestamp::parse("2019-05-14T15:49:48.539189Z").unwrap();
        let kst = Timestamp::parse("2019-05-15T00:49:48.539189+09:00").unwrap();
        assert_eq!(utc.nanos(), kst.nanos());

        let west = Timestamp::parse("2019-05-14T23:00:00-01:00").unwrap();
        assert_eq!(west.nanos(), BASE_MS * 1_000_000);
    }

    #[test]
    fn test_parse_rolls_over_loose_fields() {
        let rolled = Timestamp::parse("2019-04-31T00:00:00Z").unwrap();
        let may1 = Timestamp::parse("2019-05-01T00:00:00Z").unwrap();
        assert_eq!(rolled, may1);

        let late = Timestamp::parse("2019-05-14T24:00:00Z").unwrap();
        assert_eq!(late.nanos(), BASE_MS * 1_000_000);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in [
            "",
            "yesterday",
            "2019-05-15 00:00:00Z",
            "2019-05-15T00:00:00",
            "2019-05-15T00:60:00Z",
            "2019-25-15T00:00:00Z",
        ] {
            let err = Timestamp::parse(bad).unwrap_err();
            assert!(matches!(err, ViewerError::InvalidTime(_)), "{bad}");
        }
    }

    #[test]
    fn test_ordering_ignores_original() {
        let a = Timestamp::parse("2019-05-15T09:00:00+09:00").unwrap();
        let b = Timestamp::parse("2019-05-15T00:00:00Z").unwrap();
        let c = Timestamp::parse("2019-05-15T00:00:00.000001Z").unwrap();
        assert_eq!(a, b);
        assert!(b < c);
    }

    #[test]
    fn test_elapsed() {
        let first = Timestamp::parse("2019-05-15T00:00:00.000100Z").unwrap();
        let later = Timestamp::parse("2019-05-15T00:00:01.500000Z").unwrap();
        assert_eq!(later.elapsed(&first), "001.499900s");
        assert_eq!(first.elapsed(&first), "000.000000s");

        let much_later = Timestamp::parse("2019-05-15T00:20:34.000007Z").unwrap();
        assert_eq!(much_later.elapsed(&first), "1233.999907s");
    }

    #[test]
    fn test_fraction_added_unscaled() {
        let t = Timestamp::parse("2019-05-15T00:00:00.500000Z").unwrap();
        assert_eq!(t.nanos(), 1_557_878_400_000_500_000);

        // the next whole second still sorts after any fraction
        let next = Timestamp::parse("2019-05-15T00:00:01Z").unwrap();
        let last = Timestamp::parse("2019-05-15T00:00:00.999999Z").unwrap();
        assert!(last < next);
    }

    #[test]
    fn test_elapsed_across_second_boundary() {
        let a = Timestamp::parse("2019-05-15T00:00:00.900000Z").unwrap();
        let b = Timestamp::parse("2019-05-15T00:00:01.100000Z").unwrap();
        assert_eq!(b.elapsed(&a), "000.200000s");
    }

    #[test]
    fn test_parse_far_future() {
        let t = Timestamp::parse("2300-01-01T00:00:00.000001Z").unwrap();
        let millis = NaiveDate::from_ymd_opt(2300, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_millis();
        assert_eq!(t.nanos(), i128::from(millis) * 1_000_000 + 1);
        assert!(t > Timestamp::parse("2019-05-15T00:00:00Z").unwrap());
    }

    #[test]
    fn test_elapsed_over_centuries() {
        let early = Timestamp::parse("1700-01-01T00:00:00Z").unwrap();
        let late = Timestamp::parse("2250-01-01T00:00:00.000002Z").unwrap();
        let secs = (NaiveDate::from_ymd_opt(2250, 1, 1).unwrap() - NaiveDate::from_ymd_opt(1700, 1, 1).unwrap())
            .num_seconds();
        assert_eq!(late.elapsed(&early), format!("{}.000002s", secs));
        assert_eq!(early.elapsed(&late), ZERO_ELAPSED);
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert!(Timestamp::parse("2019-05-15T00:00:00Z extra").is_err());
        assert!(Timestamp::parse("at 2019-05-15T00:00:00Z").is_err());
    }

    #[test]
    fn test_elapsed_clamps_negative() {
        let first = Timestamp::parse("2019-05-15T00:00:01Z").unwrap();
        let earlier = Timestamp::parse("2019-05-15T00:00:00.999999Z").unwrap();
        assert_eq!(earlier.elapsed(&first), ZERO_ELAPSED);
    }

    #[test]
    fn test_serde_keeps_original() {
        let t = Timestamp::parse("2019-05-15T00:49:48.539189+09:00").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2019-05-15T00:49:48.539189+09:00\"");

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<Timestamp>("\"nope\"").is_err());
    }
}
