mod cache;
mod codec;
mod config;
mod consts;
mod error;
mod prelude;
mod text;
mod value;

pub use cache::PreformattedCache;
pub use config::FormatConfig;
pub use consts::*;
pub use error::{DateError, ValueKind};
pub use text::TextCodec;
pub use value::ExternalValue;

use crate::prelude::*;
use chrono::{DateTime, Days, Local, Months, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A calendar date packed into a `u32`, one decimal digit per nibble.
///
/// 2018-01-31 is stored as `0x2018_0131`. Higher calendar fields sit in
/// higher bits, so comparing the integers compares the dates. `0` is the null
/// date and sorts before every real date; no legal date packs to `0` since
/// month and day are always at least 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Into)]
pub struct PackedDate(u32);

impl PackedDate {
    /// Packs year, month and day without checking the calendar.
    ///
    /// Meant for fields that are already normalized, e.g. from chrono. Use
    /// [`PackedDate::from_ymd`] for untrusted input.
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self(codec::pack(year, month, day))
    }

    /// Creates a date after checking it against the proleptic Gregorian calendar
    ///
    /// # Errors
    /// Returns `DateError::InvalidDate` if the date does not exist or the year
    /// is above `MAX_YEAR`.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, DateError> {
        Self::try_from_fields(i32::from(year), u32::from(month), u32::from(day))
    }

    pub(crate) fn try_from_fields(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        codec::validate(year, month, day)?;
        // validate() bounds all three fields, the narrowing below is lossless
        Ok(Self::new(year as u16, month as u8, day as u8))
    }

    /// The null date
    pub const fn null() -> Self {
        Self(NULL_BITS)
    }

    /// The current date on the local clock
    pub fn today() -> Self {
        value::from_datelike(&Local::now().date_naive()).unwrap_or_default()
    }

    pub const fn is_null(self) -> bool {
        self.0 == NULL_BITS
    }

    /// True for any non-null date
    pub const fn is_valid(self) -> bool {
        !self.is_null()
    }

    /// Raw packed bits
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Rebuilds a date from packed bits, checking every nibble.
    ///
    /// # Errors
    /// Returns `DateError::InvalidDate` if the bits hold a non-decimal nibble
    /// or an illegal date. `0` is accepted as the null date.
    pub fn from_bits(bits: u32) -> Result<Self, DateError> {
        if bits == NULL_BITS {
            return Ok(Self::null());
        }
        let date = Self(bits);
        if (0..u32::BITS / 4).any(|i| (bits >> (i * 4)) & 0xF > 9) {
            return Err(DateError::InvalidDate {
                year: i32::from(date.year()),
                month: u32::from(date.month()),
                day: u32::from(date.day()),
            });
        }
        Self::try_from_fields(
            i32::from(date.year()),
            u32::from(date.month()),
            u32::from(date.day()),
        )
    }

    pub(crate) const fn from_bits_unchecked(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn year(self) -> u16 {
        codec::unpack_year(self.0)
    }

    /// Month number, 1-12 (0 for the null date)
    pub const fn month(self) -> u8 {
        codec::unpack_month(self.0)
    }

    pub const fn day(self) -> u8 {
        codec::unpack_day(self.0)
    }

    /// Month as a chrono enum, `None` for the null date
    pub fn month_typed(self) -> Option<chrono::Month> {
        chrono::Month::try_from(self.month()).ok()
    }

    /// Renders `YYYY-MM-DD`, or `""` for the null date.
    ///
    /// Never touches a cache; go through [`TextCodec`] for that.
    pub fn to_text(self) -> String {
        if self.is_null() {
            return String::new();
        }
        codec::render_string(self.0, DATE_SEPARATOR as u8)
    }

    /// Parses `YYYY-MM-DD`, skipping a leading quote
    ///
    /// # Errors
    /// Returns `DateError::Malformed` for short or non-numeric input and
    /// `DateError::InvalidDate` for digits that are not a real date.
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self, DateError> {
        codec::parse(input.as_ref()).map(Self)
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month()),
            u32::from(self.day()),
        )
    }

    /// Midnight at the start of this date
    pub fn to_naive_datetime(self) -> Option<NaiveDateTime> {
        self.to_naive_date()
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
    }

    /// Midnight UTC at the start of this date
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        self.to_naive_datetime().map(|dt| dt.and_utc())
    }
}

// --- calendar arithmetic ---

/// Earliest and latest dates that fit the packed layout.
fn packable_bounds() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(0, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(i32::from(MAX_YEAR), 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

impl PackedDate {
    /// Adds years, months and days, in that order.
    ///
    /// Months are added as calendar months and clamp to the end of the target
    /// month (2023-01-31 plus one month is 2023-02-28). The result saturates at
    /// 0000-01-01 and 9999-12-31, toward the end the overflowing step moves.
    ///
    /// Returns `self` unchanged when it is not a calendar date: the null date,
    /// or fields packed with [`PackedDate::new`] that do not exist, such as
    /// February 30.
    #[must_use]
    pub fn add(self, years: i32, months: i32, days: i64) -> Self {
        let Some(date) = self.to_naive_date() else {
            return self;
        };
        let (min, max) = packable_bounds();
        let saturate = |delta: i64| if delta >= 0 { max } else { min };
        let total_months = i64::from(years) * MONTHS_PER_YEAR + i64::from(months);

        let shifted = match shift_months(date, total_months) {
            None => saturate(total_months),
            Some(d) => shift_days(d, days).map_or_else(|| saturate(days), |d| d.clamp(min, max)),
        };

        value::from_datelike(&shifted).unwrap_or(self)
    }
}

impl TryFrom<NaiveDate> for PackedDate {
    type Error = DateError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        value::from_datelike(&value)
    }
}

impl fmt::Display for PackedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.pad("");
        }
        let buf = codec::render(self.0, DATE_SEPARATOR as u8);
        f.pad(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for PackedDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for PackedDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.is_null() {
            serializer.serialize_none()
        } else {
            let buf = codec::render(self.0, DATE_SEPARATOR as u8);
            let text = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(text)
        }
    }
}

struct PackedDateVisitor;

impl<'de> serde::de::Visitor<'de> for PackedDateVisitor {
    type Value = PackedDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YYYY-MM-DD string, an empty string or null")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.is_empty() {
            return Ok(PackedDate::null());
        }
        PackedDate::parse(v).map_err(E::custom)
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        if v.is_empty() {
            return Ok(PackedDate::null());
        }
        PackedDate::parse(v).map_err(E::custom)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(PackedDate::null())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(PackedDate::null())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PackedDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_option(PackedDateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> PackedDate {
        PackedDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_new() {
        assert_eq!(PackedDate::new(2023, 1, 1).to_bits(), 0x2023_0101);
        assert_eq!(PackedDate::new(0, 0, 0), PackedDate::null());
    }

    #[test]
    fn test_fields() {
        let d = date(2023, 1, 1);
        assert_eq!(d.year(), 2023);
        assert_eq!(d.month(), 1);
        assert_eq!(d.day(), 1);
        assert_eq!(d.month_typed(), Some(chrono::Month::January));
        assert_eq!(PackedDate::null().month_typed(), None);
    }

    #[test]
    fn test_from_ymd_rejects_illegal_dates() {
        assert!(PackedDate::from_ymd(2023, 2, 29).is_err());
        assert!(PackedDate::from_ymd(2024, 2, 29).is_ok());
        assert!(PackedDate::from_ymd(1900, 2, 29).is_err());
        assert!(PackedDate::from_ymd(2000, 2, 29).is_ok());
        assert!(PackedDate::from_ymd(2024, 13, 1).is_err());
        assert!(PackedDate::from_ymd(2024, 4, 31).is_err());
        assert!(PackedDate::from_ymd(0, 0, 0).is_err());
        assert!(PackedDate::from_ymd(10_000, 1, 1).is_err());
        assert!(PackedDate::from_ymd(0, 1, 1).is_ok());
    }

    #[test]
    fn test_null() {
        let null = PackedDate::null();
        assert!(null.is_null());
        assert!(!null.is_valid());
        assert_eq!(null.to_bits(), 0);
        assert_eq!(null.to_text(), "");
        assert_eq!(null.to_string(), "");
        assert_eq!(PackedDate::default(), null);
        assert!(date(2023, 1, 1).is_valid());
    }

    #[test]
    fn test_display_honors_width() {
        let d = date(2023, 1, 1);
        assert_eq!(format!("{d:>12}"), "  2023-01-01");
        assert_eq!(format!("{d:*<11}"), "2023-01-01*");
        assert_eq!(format!("{:>4}", PackedDate::null()), "    ");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(date(2023, 1, 1).to_text(), "2023-01-01");
        assert_eq!(date(2018, 1, 31).to_string(), "2018-01-31");
        assert_eq!(date(5, 11, 9).to_string(), "0005-11-09");
    }

    #[test]
    fn test_parse() {
        assert_eq!("2023-01-01".parse::<PackedDate>(), Ok(date(2023, 1, 1)));
        assert_eq!(PackedDate::parse("\"2018-01-31\""), Ok(date(2018, 1, 31)));
        assert!(matches!(
            "2017-22-28".parse::<PackedDate>(),
            Err(DateError::InvalidDate { .. })
        ));
        assert!(matches!(
            "bad".parse::<PackedDate>(),
            Err(DateError::Malformed(_))
        ));
        assert!(matches!(
            "0000-00-00".parse::<PackedDate>(),
            Err(DateError::InvalidDate { .. })
        ));
        assert!(matches!(
            "".parse::<PackedDate>(),
            Err(DateError::Malformed(_))
        ));
    }

    #[test]
    fn test_round_trip_every_day() {
        let mut day = NaiveDate::from_ymd_opt(1890, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2110, 12, 31).unwrap();
        let mut prev = PackedDate::null();
        while day <= end {
            let packed = PackedDate::try_from(day).unwrap();
            assert_eq!(packed.to_naive_date(), Some(day));
            assert_eq!(packed.to_text(), day.format("%Y-%m-%d").to_string());
            assert_eq!(packed.to_text().parse::<PackedDate>(), Ok(packed));
            assert!(prev < packed, "{prev} should sort before {packed}");
            prev = packed;
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_round_trip_year_edges() {
        for (y, m, d) in [(1, 1, 1), (0, 1, 1), (999, 12, 31), (9999, 12, 31)] {
            let packed = date(y, m, d);
            assert_eq!((packed.year(), packed.month(), packed.day()), (y, m, d));
            assert_eq!(PackedDate::parse(packed.to_text()), Ok(packed));
        }
    }

    #[test]
    fn test_ordering() {
        assert!(PackedDate::null() < date(0, 1, 1));
        assert!(date(1999, 12, 31) < date(2000, 1, 1));
        assert!(date(2000, 1, 31) < date(2000, 2, 1));
        assert!(date(2000, 2, 9) < date(2000, 2, 10));
        assert!(date(999, 1, 1) < date(1000, 1, 1));

        let mut dates = vec![date(2024, 3, 1), date(1991, 8, 15), date(2024, 2, 29)];
        dates.sort();
        assert_eq!(
            dates,
            vec![date(1991, 8, 15), date(2024, 2, 29), date(2024, 3, 1)]
        );
    }

    #[test]
    fn test_from_bits() {
        assert_eq!(PackedDate::from_bits(0x2018_0131), Ok(date(2018, 1, 31)));
        assert_eq!(PackedDate::from_bits(0), Ok(PackedDate::null()));
        assert!(PackedDate::from_bits(0x2018_01A1).is_err());
        assert!(PackedDate::from_bits(0x2023_0229).is_err());
        assert!(PackedDate::from_bits(20_230_101).is_err());

        let bits: u32 = date(2018, 1, 31).into();
        assert_eq!(bits, 0x2018_0131);
    }

    #[test]
    fn test_add() {
        struct TestCase {
            start:  PackedDate,
            years:  i32,
            months: i32,
            days:   i64,
            expect: PackedDate,
        }

        let cases = [
            TestCase {
                start:  date(2023, 1, 1),
                years:  1,
                months: 0,
                days:   0,
                expect: date(2024, 1, 1),
            },
            TestCase {
                start:  date(2023, 1, 1),
                years:  0,
                months: 1,
                days:   0,
                expect: date(2023, 2, 1),
            },
            TestCase {
                start:  date(2023, 1, 1),
                years:  0,
                months: 0,
                days:   1,
                expect: date(2023, 1, 2),
            },
            TestCase {
                start:  date(2023, 1, 31),
                years:  0,
                months: 1,
                days:   0,
                expect: date(2023, 2, 28),
            },
            TestCase {
                start:  date(2024, 1, 31),
                years:  0,
                months: 1,
                days:   0,
                expect: date(2024, 2, 29),
            },
            TestCase {
                start:  date(2024, 2, 29),
                years:  -1,
                months: 0,
                days:   0,
                expect: date(2023, 2, 28),
            },
            TestCase {
                start:  date(2023, 12, 31),
                years:  0,
                months: 0,
                days:   1,
                expect: date(2024, 1, 1),
            },
            TestCase {
                start:  date(2023, 3, 1),
                years:  0,
                months: -1,
                days:   -1,
                expect: date(2023, 1, 31),
            },
            TestCase {
                start:  date(2023, 1, 1),
                years:  0,
                months: 0,
                days:   -365,
                expect: date(2022, 1, 1),
            },
            TestCase {
                start:  date(9999, 12, 30),
                years:  0,
                months: 0,
                days:   5,
                expect: date(9999, 12, 31),
            },
            TestCase {
                start:  date(1, 6, 1),
                years:  -5,
                months: 0,
                days:   0,
                expect: date(0, 1, 1),
            },
            TestCase {
                start:  date(2000, 1, 1),
                years:  i32::MAX,
                months: 0,
                days:   0,
                expect: date(9999, 12, 31),
            },
            TestCase {
                start:  date(2000, 1, 1),
                years:  0,
                months: 0,
                days:   i64::MIN,
                expect: date(0, 1, 1),
            },
            TestCase {
                start:  date(2000, 1, 1),
                years:  0,
                months: 1,
                days:   i64::MIN,
                expect: date(0, 1, 1),
            },
            TestCase {
                start:  date(2000, 1, 1),
                years:  0,
                months: -1,
                days:   i64::MAX,
                expect: date(9999, 12, 31),
            },
            TestCase {
                start:  date(2000, 1, 1),
                years:  -i32::MAX,
                months: 0,
                days:   i64::MAX,
                expect: date(0, 1, 1),
            },
        ];

        for case in &cases {
            assert_eq!(
                case.start.add(case.years, case.months, case.days),
                case.expect,
                "{} + ({}, {}, {})",
                case.start,
                case.years,
                case.months,
                case.days
            );
        }
    }

    #[test]
    fn test_add_to_null_stays_null() {
        assert_eq!(PackedDate::null().add(1, 1, 1), PackedDate::null());
    }

    #[test]
    fn test_add_to_unvalidated_date_is_unchanged() {
        let feb30 = PackedDate::new(2023, 2, 30);
        assert_eq!(feb30.add(0, 0, 1), feb30);
        assert_eq!(feb30.add(1, -3, 40), feb30);

        let month13 = PackedDate::new(2023, 13, 1);
        assert_eq!(month13.add(0, 1, 0), month13);
    }

    #[test]
    fn test_chrono_conversions() {
        let d = date(2023, 1, 1);
        assert_eq!(d.to_naive_date(), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(
            d.to_naive_datetime(),
            NaiveDate::from_ymd_opt(2023, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(
            d.to_utc().map(|t| t.timestamp()),
            Some(1_672_531_200)
        );
        assert_eq!(PackedDate::null().to_naive_date(), None);
        assert_eq!(PackedDate::null().to_utc(), None);

        let far = NaiveDate::from_ymd_opt(12_000, 1, 1).unwrap();
        assert!(PackedDate::try_from(far).is_err());
    }

    #[test]
    fn test_today() {
        let before = Local::now().date_naive();
        let today = PackedDate::today();
        let after = Local::now().date_naive();
        assert!(today.is_valid());
        let day = today.to_naive_date().unwrap();
        assert!(before <= day && day <= after, "{day} not in {before}..={after}");
    }

    #[test]
    fn test_serde() {
        let d = date(2023, 1, 1);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#""2023-01-01""#);
        let parsed: PackedDate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);

        assert_eq!(serde_json::to_string(&PackedDate::null()).unwrap(), "null");
    }

    #[test]
    fn test_serde_null_forms() {
        let parsed: PackedDate = serde_json::from_str("null").unwrap();
        assert!(parsed.is_null());
        let parsed: PackedDate = serde_json::from_str(r#""""#).unwrap();
        assert!(parsed.is_null());
        let parsed: PackedDate = serde_json::from_str(r#""2018-01-31""#).unwrap();
        assert_eq!(parsed, date(2018, 1, 31));
    }

    #[test]
    fn test_serde_validation() {
        for json in [r#""2024-13-01""#, r#""2023-02-29""#, r#""bad""#, "20230101", "true"] {
            let result: Result<PackedDate, _> = serde_json::from_str(json);
            assert!(result.is_err(), "{json} should be rejected");
        }
    }

    #[test]
    fn test_serde_in_struct() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Row {
            born: PackedDate,
            died: PackedDate,
        }

        let row = Row {
            born: date(1991, 8, 15),
            died: PackedDate::null(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"born":"1991-08-15","died":null}"#);
        let parsed: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_YEAR, 9999);
        assert_eq!(CANONICAL_LEN, 10);
        assert_eq!(NULL_LITERAL, b"null");
    }
}
