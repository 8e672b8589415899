//! Sexagenary (간지) cycle and the day/year pillars derived from it.

use chrono::NaiveDate;
use std::fmt;

pub const STEMS: [char; 10] = ['갑', '을', '병', '정', '무', '기', '경', '신', '임', '계'];
pub const STEMS_HANJA: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
pub const BRANCHES: [char; 12] = [
    '자', '축', '인', '묘', '진', '사', '오', '미', '신', '유', '술', '해',
];
pub const BRANCHES_HANJA: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

const ZODIAC: [&str; 12] = [
    "쥐", "소", "호랑이", "토끼", "용", "뱀", "말", "양", "원숭이", "닭", "개", "돼지",
];

pub const CYCLE_LEN: usize = 60;

/// 1900-01-01 is a 갑술 (甲戌) day, ten steps into the cycle.
pub const DAY_EPOCH: (i32, u32, u32) = (1900, 1, 1);
pub const DAY_EPOCH_OFFSET: i64 = 10;

/// 4 CE opens a 갑자 year.
const YEAR_EPOCH: i32 = 4;

/// Five phases (오행), in generating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub fn label(&self) -> &'static str {
        match self {
            Element::Wood => "목(木)",
            Element::Fire => "화(火)",
            Element::Earth => "토(土)",
            Element::Metal => "금(金)",
            Element::Water => "수(水)",
        }
    }

    /// Traditional color word used for year nicknames ("붉은 말").
    pub fn color(&self) -> &'static str {
        match self {
            Element::Wood => "푸른",
            Element::Fire => "붉은",
            Element::Earth => "누런",
            Element::Metal => "흰",
            Element::Water => "검은",
        }
    }
}

/// One of the 60 stem–branch pairs, identified by its cycle index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SexagenaryTerm {
    index: u8,
}

impl SexagenaryTerm {
    pub fn from_index(index: usize) -> Self {
        Self {
            index: (index % CYCLE_LEN) as u8,
        }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn stem_index(&self) -> usize {
        self.index() % 10
    }

    pub fn branch_index(&self) -> usize {
        self.index() % 12
    }

    pub fn hangul(&self) -> String {
        [STEMS[self.stem_index()], BRANCHES[self.branch_index()]]
            .iter()
            .collect()
    }

    pub fn hanja(&self) -> String {
        [STEMS_HANJA[self.stem_index()], BRANCHES_HANJA[self.branch_index()]]
            .iter()
            .collect()
    }

    /// Stems pair up by phase: 갑을 wood, 병정 fire, and so on.
    pub fn element(&self) -> Element {
        match self.stem_index() / 2 {
            0 => Element::Wood,
            1 => Element::Fire,
            2 => Element::Earth,
            3 => Element::Metal,
            _ => Element::Water,
        }
    }

    pub fn animal(&self) -> &'static str {
        ZODIAC[self.branch_index()]
    }
}

impl fmt::Display for SexagenaryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hangul())
    }
}

/// The full cycle in order: `term[i] = stem[i % 10] + branch[i % 12]`.
pub fn sexagenary_cycle() -> Vec<SexagenaryTerm> {
    (0..CYCLE_LEN).map(SexagenaryTerm::from_index).collect()
}

fn day_epoch() -> NaiveDate {
    let (y, m, d) = DAY_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Day pillar (일주) for a solar date. Dates before the epoch wrap around.
pub fn day_pillar(date: NaiveDate) -> SexagenaryTerm {
    let days = (date - day_epoch()).num_days();
    let index = (days + DAY_EPOCH_OFFSET).rem_euclid(CYCLE_LEN as i64);
    SexagenaryTerm::from_index(index as usize)
}

/// Year pillar (세차) by the civil year number.
pub fn year_pillar(year: i32) -> SexagenaryTerm {
    let index = (year - YEAR_EPOCH).rem_euclid(CYCLE_LEN as i32);
    SexagenaryTerm::from_index(index as usize)
}
