// Unit Formatter
//
// Turns raw millisecond and byte counts into the short human-readable
// phrases used in config comments ("2.5 months", "3MB"). Magnitudes are
// kept as integer tenths so rounding is exact and repeatable.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MILLIS_IN_ONE_HOUR: i64 = 60 * 60 * 1000;
pub const MILLIS_IN_ONE_DAY: i64 = 24 * MILLIS_IN_ONE_HOUR;
pub const MILLIS_IN_ONE_MONTH: i64 = 30 * MILLIS_IN_ONE_DAY;
pub const MILLIS_IN_ONE_YEAR: i64 = 365 * MILLIS_IN_ONE_DAY;

/// What a numeric config value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Milliseconds.
    Duration,

    /// Bytes.
    Bytes,
}

impl QuantityKind {
    pub fn unit_name(self) -> &'static str {
        match self {
            QuantityKind::Duration => "milliseconds",
            QuantityKind::Bytes => "bytes",
        }
    }
}

/// Raised when a config value that should be numeric is not.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("`{0}` is not a valid integer value")]
pub struct InvalidNumericValue(pub String);

/// Parse a config literal as a signed integer.
pub fn parse_integer(raw: &str) -> Result<i64, InvalidNumericValue> {
    raw.parse::<i64>()
        .map_err(|_| InvalidNumericValue(raw.to_string()))
}

/// A value rounded half-up to one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Magnitude {
    tenths: i128,
}

impl Magnitude {
    /// `value / unit`, rounded half away from zero to one decimal.
    fn of(value: i64, unit: i64) -> Self {
        let scaled = i128::from(value) * 10;
        let unit = i128::from(unit);
        let half = unit / 2;
        let tenths = if scaled >= 0 {
            (scaled + half) / unit
        } else {
            -((-scaled + half) / unit)
        };
        Self { tenths }
    }

    pub fn tenths(self) -> i128 {
        self.tenths
    }

    fn at_least_one(self) -> bool {
        self.tenths >= 10
    }

    fn is_one(self) -> bool {
        self.tenths == 10
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tenths < 0 { "-" } else { "" };
        let abs = self.tenths.unsigned_abs();
        match abs % 10 {
            0 => write!(f, "{sign}{}", abs / 10),
            frac => write!(f, "{sign}{}.{frac}", abs / 10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hour,
    Day,
    Month,
    Year,
}

impl DurationUnit {
    /// Largest first: the order in which units are tried.
    const DESCENDING: [DurationUnit; 4] = [
        DurationUnit::Year,
        DurationUnit::Month,
        DurationUnit::Day,
        DurationUnit::Hour,
    ];

    pub fn millis(self) -> i64 {
        match self {
            DurationUnit::Hour => MILLIS_IN_ONE_HOUR,
            DurationUnit::Day => MILLIS_IN_ONE_DAY,
            DurationUnit::Month => MILLIS_IN_ONE_MONTH,
            DurationUnit::Year => MILLIS_IN_ONE_YEAR,
        }
    }

    fn label(self, singular: bool) -> &'static str {
        match (self, singular) {
            (DurationUnit::Hour, true) => "hour",
            (DurationUnit::Hour, false) => "hours",
            (DurationUnit::Day, true) => "day",
            (DurationUnit::Day, false) => "days",
            (DurationUnit::Month, true) => "month",
            (DurationUnit::Month, false) => "months",
            (DurationUnit::Year, true) => "year",
            (DurationUnit::Year, false) => "years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteUnit {
    Byte,
    Kilo,
    Mega,
    Giga,
}

impl ByteUnit {
    const DESCENDING: [ByteUnit; 4] = [ByteUnit::Giga, ByteUnit::Mega, ByteUnit::Kilo, ByteUnit::Byte];

    pub fn bytes(self) -> i64 {
        match self {
            ByteUnit::Byte => 1,
            ByteUnit::Kilo => 1 << 10,
            ByteUnit::Mega => 1 << 20,
            ByteUnit::Giga => 1 << 30,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ByteUnit::Byte => "B",
            ByteUnit::Kilo => "KB",
            ByteUnit::Mega => "MB",
            ByteUnit::Giga => "GB",
        }
    }
}

/// A duration rendered as `"<magnitude> <unit>"`, e.g. `"2.5 months"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattedDuration {
    pub magnitude: Magnitude,
    pub unit: DurationUnit,
}

impl fmt::Display for FormattedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.magnitude,
            self.unit.label(self.magnitude.is_one())
        )
    }
}

/// A size rendered as `"<magnitude><unit>"`, e.g. `"1.5GB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattedSize {
    pub magnitude: Magnitude,
    pub unit: ByteUnit,
}

impl fmt::Display for FormattedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.label())
    }
}

/// Express `millis` in the largest unit whose rounded magnitude is at
/// least one. Anything shorter than that falls back to hours.
pub fn format_duration(millis: i64) -> FormattedDuration {
    DurationUnit::DESCENDING
        .iter()
        .map(|&unit| FormattedDuration {
            magnitude: Magnitude::of(millis, unit.millis()),
            unit,
        })
        .find(|formatted| formatted.magnitude.at_least_one())
        .unwrap_or(FormattedDuration {
            magnitude: Magnitude::of(millis, MILLIS_IN_ONE_HOUR),
            unit: DurationUnit::Hour,
        })
}

/// Express `bytes` in the largest binary unit whose rounded magnitude is at
/// least one, falling back to plain bytes.
pub fn format_bytes(bytes: i64) -> FormattedSize {
    ByteUnit::DESCENDING
        .iter()
        .map(|&unit| FormattedSize {
            magnitude: Magnitude::of(bytes, unit.bytes()),
            unit,
        })
        .find(|formatted| formatted.magnitude.at_least_one())
        .unwrap_or(FormattedSize {
            magnitude: Magnitude::of(bytes, 1),
            unit: ByteUnit::Byte,
        })
}

/// Human phrase for a quantity: `"for 2 days"` / `"forever"` for durations,
/// `"3MB"` / `"unlimited data"` for sizes.
pub fn describe(kind: QuantityKind, value: i64, infinite_sentinel: Option<i64>) -> String {
    let infinite = infinite_sentinel == Some(value);
    match (kind, infinite) {
        (QuantityKind::Duration, true) => "forever".to_string(),
        (QuantityKind::Duration, false) => format!("for {}", format_duration(value)),
        (QuantityKind::Bytes, true) => "unlimited data".to_string(),
        (QuantityKind::Bytes, false) => format_bytes(value).to_string(),
    }
}

/// Whether an existing annotation already reads as the canonical text.
pub fn matches_canonical(existing: &str, canonical: &str) -> bool {
    existing.trim() == canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn durations_pick_the_largest_whole_unit() {
        assert_eq!(format_duration(86_400_000).to_string(), "1 day");
        assert_eq!(format_duration(172_800_000).to_string(), "2 days");
        assert_eq!(format_duration(5_184_000_000).to_string(), "2 months");
        assert_eq!(format_duration(2_592_000_000).to_string(), "1 month");
        assert_eq!(format_duration(31_536_000_000).to_string(), "1 year");
        assert_eq!(format_duration(21_600_000).to_string(), "6 hours");
        assert_eq!(format_duration(3_600_000).to_string(), "1 hour");
    }

    #[test]
    fn durations_keep_one_fractional_digit() {
        assert_eq!(format_duration(47_304_000_000).to_string(), "1.5 years");
        assert_eq!(format_duration(6_480_000_000).to_string(), "2.5 months");
        assert_eq!(format_duration(220_898_482_000).to_string(), "7 years");
        assert_eq!(format_duration(259_200_001).to_string(), "3 days");
    }

    #[test]
    fn rounding_is_half_up() {
        // 1.45 days -> 1.5 days, 1.44 days -> 1.4 days
        assert_eq!(
            format_duration(MILLIS_IN_ONE_DAY * 145 / 100).to_string(),
            "1.5 days"
        );
        assert_eq!(
            format_duration(MILLIS_IN_ONE_DAY * 144 / 100).to_string(),
            "1.4 days"
        );
    }

    #[test]
    fn short_durations_fall_back_to_hours() {
        assert_eq!(format_duration(0).to_string(), "0 hours");
        assert_eq!(format_duration(1_800_000).to_string(), "0.5 hours");
    }

    #[test]
    fn sizes_use_binary_multiples() {
        assert_eq!(format_bytes(3_145_728).to_string(), "3MB");
        assert_eq!(format_bytes(4_509_715_661).to_string(), "4.2GB");
        assert_eq!(format_bytes(204_800).to_string(), "200KB");
        assert_eq!(format_bytes(100).to_string(), "100B");
        assert_eq!(format_bytes(1_610_612_736).to_string(), "1.5GB");
        assert_eq!(format_bytes(2048).to_string(), "2KB");
        assert_eq!(format_bytes(1 << 30).to_string(), "1GB");
    }

    #[test]
    fn extreme_values_keep_their_magnitude() {
        assert_eq!(
            describe(QuantityKind::Bytes, i64::MIN, Some(-1)),
            "-9223372036854775808B"
        );
        assert_eq!(
            describe(QuantityKind::Bytes, i64::MAX, Some(-1)),
            "8589934592GB"
        );
        assert_eq!(
            describe(QuantityKind::Duration, i64::MAX, Some(-1)),
            "for 292471208.7 years"
        );
        assert_eq!(
            describe(QuantityKind::Duration, i64::MIN, Some(-1)),
            "for -2562047788015.2 hours"
        );
    }

    #[test]
    fn sentinel_is_described_as_a_fixed_phrase() {
        assert_eq!(describe(QuantityKind::Duration, -1, Some(-1)), "forever");
        assert_eq!(
            describe(QuantityKind::Bytes, -1, Some(-1)),
            "unlimited data"
        );
        assert_eq!(
            describe(QuantityKind::Duration, 86_400_000, Some(-1)),
            "for 1 day"
        );
    }

    #[test]
    fn parse_integer_rejects_text() {
        assert_eq!(parse_integer("-1"), Ok(-1));
        assert_eq!(parse_integer("259200001"), Ok(259_200_001));
        assert_eq!(
            parse_integer("???"),
            Err(InvalidNumericValue("???".into()))
        );
        assert!(parse_integer("").is_err());
        assert!(parse_integer("1.5").is_err());
    }

    #[test]
    fn comparison_ignores_surrounding_whitespace() {
        assert!(matches_canonical(
            "# keep data for 2 months \n",
            "# keep data for 2 months"
        ));
        assert!(!matches_canonical(
            "# keep data for 1 day",
            "# keep data for 2 days"
        ));
    }

    fn largest_unit_with_whole_magnitude(millis: i64) -> DurationUnit {
        for unit in DurationUnit::DESCENDING {
            if Magnitude::of(millis, unit.millis()).tenths() >= 10 {
                return unit;
            }
        }
        DurationUnit::Hour
    }

    proptest! {
        #[test]
        fn formatter_picks_largest_unit_with_magnitude_at_least_one(millis in 0i64..2_000_000_000_000) {
            let formatted = format_duration(millis);
            prop_assert_eq!(formatted.unit, largest_unit_with_whole_magnitude(millis));

            // every larger unit rounds below one
            for unit in DurationUnit::DESCENDING {
                if unit == formatted.unit {
                    break;
                }
                prop_assert!(Magnitude::of(millis, unit.millis()).tenths() < 10);
            }
        }

        #[test]
        fn formatting_is_deterministic(bytes in 0i64..i64::MAX / 16) {
            prop_assert_eq!(format_bytes(bytes).to_string(), format_bytes(bytes).to_string());
        }
    }
}
