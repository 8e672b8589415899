use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "남자",
            Gender::Female => "여자",
        }
    }
}

/// Which calendar the entered birth date is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarType {
    #[default]
    Solar,
    Lunar,
    LunarLeap,
}

impl CalendarType {
    pub const ALL: [CalendarType; 3] = [
        CalendarType::Solar,
        CalendarType::Lunar,
        CalendarType::LunarLeap,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CalendarType::Solar => "양력",
            CalendarType::Lunar => "음력(평달)",
            CalendarType::LunarLeap => "음력(윤달)",
        }
    }

    pub fn is_leap(&self) -> bool {
        matches!(self, CalendarType::LunarLeap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthTime {
    Known { hour: u32, minute: u32 },
    Unknown,
}

impl fmt::Display for BirthTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirthTime::Known { hour, minute } => write!(f, "{:02}시 {:02}분", hour, minute),
            BirthTime::Unknown => f.write_str("모름"),
        }
    }
}

/// Validated birth data for a single analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthRecord {
    pub hangul_name: String,
    pub hanja_name: Option<String>,
    pub gender: Gender,
    pub calendar: CalendarType,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub time: BirthTime,
}

impl BirthRecord {
    /// The date as the user entered it, e.g. `1990년 1월 1일`.
    pub fn entered_date(&self) -> String {
        format!("{}년 {}월 {}일", self.year, self.month, self.day)
    }
}
