pub mod calendar;
pub mod ganzhi;
pub mod lunar;
pub mod types;

pub use calendar::{to_solar, CalendarError};
pub use ganzhi::{day_pillar, sexagenary_cycle, year_pillar, SexagenaryTerm};
pub use lunar::{LunarCalendar, LunarDateError, LunarTable};
pub use types::{BirthRecord, BirthTime, CalendarType, Gender};
