//! Normalizes an entered birth date to the solar calendar.

use super::lunar::{LunarCalendar, LunarDateError};
use super::types::CalendarType;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("{year}-{month:02}-{day:02} is not a valid solar date")]
    InvalidSolarDate { year: i32, month: u32, day: u32 },

    #[error(transparent)]
    Lunar(#[from] LunarDateError),
}

/// Returns the solar date for `year-month-day` written in `calendar`.
pub fn to_solar(
    lunar: &dyn LunarCalendar,
    calendar: CalendarType,
    year: i32,
    month: u32,
    day: u32,
) -> Result<NaiveDate, CalendarError> {
    match calendar {
        CalendarType::Solar => NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(CalendarError::InvalidSolarDate { year, month, day }),
        CalendarType::Lunar | CalendarType::LunarLeap => {
            let solar = lunar.to_solar(year, month, day, calendar.is_leap())?;
            Ok(solar)
        }
    }
}
