//! Korean lunisolar (음력) to solar conversion.
//!
//! Month starts and leap months follow the Korean almanac, reckoned in Korean
//! civil time (UTC+9; UTC+8:30 during 1908-1911 and 1954-1961). It differs from
//! the Chinese calendar whenever a new moon or a principal term lands between
//! midnight and 1 a.m. Korean time, e.g. Seollal 2027 or the leap month of 2012.
//!
//! Each year of the table packs its calendar into one word:
//!
//! - bits 0..4: leap month number, 0 when the year has none
//! - bits 4..16: month lengths, month 1 at bit 15 down to month 12 at bit 4
//!   (set = 30 days, clear = 29 days)
//! - bit 16: length of the leap month (set = 30 days)
//!
//! Lunar 1900-01-01 fell on solar 1900-01-31.

use chrono::{Duration, NaiveDate};

pub const FIRST_YEAR: i32 = 1900;
pub const LAST_YEAR: i32 = 2030;

const BASE_SOLAR: (i32, u32, u32) = (1900, 1, 31);

#[rustfmt::skip]
const YEAR_INFO: [u32; (LAST_YEAR - FIRST_YEAR + 1) as usize] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054e5, 0x0d2a0, 0x0e950, 0x16554, 0x056a0, 0x0aad0, 0x055d2, // 1900
    0x04ae0, 0x0a5d6, 0x0a4d0, 0x0d250, 0x0da95, 0x0b550, 0x056a0, 0x0ada2, 0x095d0, 0x04bb7, // 1910
    0x049b0, 0x0a4b0, 0x0b4b5, 0x06a90, 0x0ad40, 0x0bb54, 0x02b60, 0x095b0, 0x05372, 0x04970, // 1920
    0x06566, 0x0e4a0, 0x0ea50, 0x16a95, 0x05b50, 0x02b60, 0x18ae3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b690, 0x056d0, 0x125b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0d557, // 1940
    0x0b4a0, 0x0b550, 0x15555, 0x04db0, 0x025b0, 0x18573, 0x052b0, 0x0a9b8, 0x06950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05270, 0x07263, 0x0d950, 0x06b57, 0x056a0, // 1960
    0x09ad0, 0x04dd5, 0x04ae0, 0x0a4e0, 0x0d4d4, 0x0d250, 0x0d598, 0x0b540, 0x0d6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a9b4, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0b756, 0x02b60, 0x095b0, // 1980
    0x04b75, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06d98, 0x05ad0, 0x02b60, 0x096e5, 0x092e0, // 1990
    0x0c960, 0x0e954, 0x0d4a0, 0x0da50, 0x07552, 0x056c0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x1b4a3, 0x0b550, 0x055d9, 0x04ba0, 0x0a5b0, 0x05575, 0x052b0, 0x0a950, // 2010
    0x0b954, 0x06aa0, 0x0ad50, 0x06b52, 0x04b60, 0x0a6e6, 0x0a570, 0x05270, 0x06a65, 0x0d930, // 2020
    0x05aa0,                                                                                  // 2030
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LunarDateError {
    #[error("lunar year {year} is outside the supported range 1900..=2030")]
    YearOutOfRange { year: i32 },

    #[error("lunar month {month} is invalid (must be 1..=12)")]
    InvalidMonth { month: u32 },

    #[error("lunar year {year} has no leap month {month}")]
    NoSuchLeapMonth { year: i32, month: u32 },

    #[error("lunar {year}-{month} has only {max_day} days, got day {day}")]
    InvalidDay {
        year: i32,
        month: u32,
        day: u32,
        max_day: u32,
        is_leap: bool,
    },
}

/// Lunar-to-solar conversion capability.
pub trait LunarCalendar: Send + Sync {
    fn to_solar(&self, year: i32, month: u32, day: u32, is_leap: bool)
        -> Result<NaiveDate, LunarDateError>;
}

/// Table-driven calendar covering lunar years 1900 through 2030.
#[derive(Debug, Clone, Copy, Default)]
pub struct LunarTable;

impl LunarTable {
    fn info(year: i32) -> Result<u32, LunarDateError> {
        if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
            return Err(LunarDateError::YearOutOfRange { year });
        }
        Ok(YEAR_INFO[(year - FIRST_YEAR) as usize])
    }

    /// Leap month of `year`, if any.
    pub fn leap_month(year: i32) -> Result<Option<u32>, LunarDateError> {
        let leap = Self::info(year)? & 0xf;
        Ok((leap != 0).then_some(leap))
    }

    fn leap_days(info: u32) -> u32 {
        match info & 0xf {
            0 => 0,
            _ if info & 0x10000 != 0 => 30,
            _ => 29,
        }
    }

    fn month_days(info: u32, month: u32) -> u32 {
        if info & (0x10000 >> month) != 0 {
            30
        } else {
            29
        }
    }

    fn year_days(info: u32) -> u32 {
        let big_months = (1..=12).filter(|&m| Self::month_days(info, m) == 30).count() as u32;
        12 * 29 + big_months + Self::leap_days(info)
    }

    /// Number of days in the given (possibly leap) month.
    pub fn days_in_month(year: i32, month: u32, is_leap: bool) -> Result<u32, LunarDateError> {
        if !(1..=12).contains(&month) {
            return Err(LunarDateError::InvalidMonth { month });
        }
        let info = Self::info(year)?;
        if !is_leap {
            return Ok(Self::month_days(info, month));
        }
        if info & 0xf != month {
            return Err(LunarDateError::NoSuchLeapMonth { year, month });
        }
        Ok(Self::leap_days(info))
    }
}

impl LunarCalendar for LunarTable {
    fn to_solar(
        &self,
        year: i32,
        month: u32,
        day: u32,
        is_leap: bool,
    ) -> Result<NaiveDate, LunarDateError> {
        let max_day = Self::days_in_month(year, month, is_leap)?;
        if day == 0 || day > max_day {
            return Err(LunarDateError::InvalidDay {
                year,
                month,
                day,
                max_day,
                is_leap,
            });
        }

        let mut offset: i64 = YEAR_INFO[..(year - FIRST_YEAR) as usize]
            .iter()
            .map(|&info| Self::year_days(info) as i64)
            .sum();

        let info = Self::info(year)?;
        for m in 1..month {
            offset += Self::month_days(info, m) as i64;
            if info & 0xf == m {
                offset += Self::leap_days(info) as i64;
            }
        }
        // A leap month follows the ordinary month of the same number.
        if is_leap {
            offset += Self::month_days(info, month) as i64;
        }
        offset += (day - 1) as i64;

        let (y, m, d) = BASE_SOLAR;
        let base = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
        Ok(base + Duration::days(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_base_date() {
        assert_eq!(LunarTable.to_solar(1900, 1, 1, false), Ok(ymd(1900, 1, 31)));
    }

    #[test]
    fn test_new_year_anchors() {
        let cases = [
            (1950, ymd(1950, 2, 17)),
            (1960, ymd(1960, 1, 28)),
            (1985, ymd(1985, 2, 20)),
            (1990, ymd(1990, 1, 27)),
            (2000, ymd(2000, 2, 5)),
            (2024, ymd(2024, 2, 10)),
            (2026, ymd(2026, 2, 17)),
            (2030, ymd(2030, 2, 3)),
        ];
        for (year, solar) in cases {
            assert_eq!(LunarTable.to_solar(year, 1, 1, false), Ok(solar), "lunar {}", year);
        }
    }

    #[test]
    fn test_leap_month_follows_ordinary_month() {
        assert_eq!(LunarTable.to_solar(2023, 2, 1, true), Ok(ymd(2023, 3, 22)));
        assert_eq!(LunarTable.to_solar(2020, 4, 1, true), Ok(ymd(2020, 5, 23)));
        assert_eq!(LunarTable.to_solar(2017, 5, 1, true), Ok(ymd(2017, 6, 24)));
    }

    #[test]
    fn test_korean_almanac_dates() {
        assert_eq!(LunarTable.to_solar(2027, 1, 1, false), Ok(ymd(2027, 2, 7)));
        assert_eq!(LunarTable.to_solar(1997, 1, 1, false), Ok(ymd(1997, 2, 8)));
        assert_eq!(LunarTable.to_solar(2012, 3, 1, true), Ok(ymd(2012, 4, 21)));
        assert_eq!(LunarTable.to_solar(2012, 4, 1, false), Ok(ymd(2012, 5, 21)));

        // Leap months of the Chinese calendar that Korea does not have.
        assert_eq!(
            LunarTable.to_solar(2012, 4, 1, true),
            Err(LunarDateError::NoSuchLeapMonth { year: 2012, month: 4 })
        );
        assert_eq!(
            LunarTable.to_solar(2017, 6, 1, true),
            Err(LunarDateError::NoSuchLeapMonth { year: 2017, month: 6 })
        );
        assert_eq!(LunarTable::leap_month(2012), Ok(Some(3)));
        assert_eq!(LunarTable::leap_month(2017), Ok(Some(5)));
    }

    #[test]
    fn test_last_day_of_table_spills_into_next_solar_year() {
        assert_eq!(LunarTable.to_solar(2030, 12, 29, false), Ok(ymd(2031, 1, 22)));
    }

    #[test]
    fn test_missing_leap_month_rejected() {
        let err = LunarTable.to_solar(2024, 3, 1, true).unwrap_err();
        assert_eq!(err, LunarDateError::NoSuchLeapMonth { year: 2024, month: 3 });
        // 2023 has a leap 2nd month, not a leap 3rd.
        assert!(LunarTable.to_solar(2023, 3, 1, true).is_err());
    }

    #[test]
    fn test_day_beyond_month_length_rejected() {
        // Month 12 of 2030 is a short month.
        let err = LunarTable.to_solar(2030, 12, 30, false).unwrap_err();
        assert!(matches!(err, LunarDateError::InvalidDay { max_day: 29, .. }));
        assert!(LunarTable.to_solar(1990, 1, 0, false).is_err());
        assert!(LunarTable.to_solar(1990, 1, 31, false).is_err());
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert_eq!(
            LunarTable.to_solar(1899, 1, 1, false),
            Err(LunarDateError::YearOutOfRange { year: 1899 })
        );
        assert_eq!(
            LunarTable.to_solar(2031, 1, 1, false),
            Err(LunarDateError::YearOutOfRange { year: 2031 })
        );
        assert_eq!(
            LunarTable.to_solar(2000, 13, 1, false),
            Err(LunarDateError::InvalidMonth { month: 13 })
        );
    }

    #[test]
    fn test_leap_month_lookup() {
        assert_eq!(LunarTable::leap_month(2023), Ok(Some(2)));
        assert_eq!(LunarTable::leap_month(2025), Ok(Some(6)));
        assert_eq!(LunarTable::leap_month(2024), Ok(None));
    }

    #[test]
    fn test_year_lengths_are_plausible() {
        for year in FIRST_YEAR..=LAST_YEAR {
            let days = LunarTable::year_days(LunarTable::info(year).unwrap());
            let has_leap = LunarTable::leap_month(year).unwrap().is_some();
            let range = if has_leap { 383..=385 } else { 353..=355 };
            assert!(range.contains(&days), "{} has {} days", year, days);
        }
    }
}
