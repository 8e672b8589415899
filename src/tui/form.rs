use crate::error::ValidationError;
use crate::saju::{BirthRecord, BirthTime, CalendarType, Gender};

pub const YEAR_RANGE: (i64, i64) = (1900, 2030);
pub const MONTH_RANGE: (i64, i64) = (1, 12);
pub const DAY_RANGE: (i64, i64) = (1, 31);
pub const HOUR_RANGE: (i64, i64) = (0, 23);
pub const MINUTE_RANGE: (i64, i64) = (0, 59);

const NAME_MAX_CHARS: usize = 20;

/// Raw values behind the input screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthForm {
    pub hangul_name: String,
    pub hanja_name: String,
    pub gender: Gender,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub calendar: CalendarType,
    pub time_unknown: bool,
    pub hour: u32,
    pub minute: u32,
}

impl Default for BirthForm {
    fn default() -> Self {
        Self {
            hangul_name: String::new(),
            hanja_name: String::new(),
            gender: Gender::Male,
            year: 1990,
            month: 1,
            day: 1,
            calendar: CalendarType::Solar,
            time_unknown: false,
            hour: 12,
            minute: 0,
        }
    }
}

fn check(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl BirthForm {
    /// Minimal checks: a name, and numbers inside their input bounds.
    /// Whether the date exists is left to the calendar normalizer.
    pub fn validate(&self) -> Result<BirthRecord, ValidationError> {
        let hangul_name = self.hangul_name.trim();
        if hangul_name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check("생년", self.year as i64, YEAR_RANGE)?;
        check("생월", self.month as i64, MONTH_RANGE)?;
        check("생일", self.day as i64, DAY_RANGE)?;

        let time = if self.time_unknown {
            BirthTime::Unknown
        } else {
            check("시", self.hour as i64, HOUR_RANGE)?;
            check("분", self.minute as i64, MINUTE_RANGE)?;
            BirthTime::Known {
                hour: self.hour,
                minute: self.minute,
            }
        };

        let hanja = self.hanja_name.trim();
        Ok(BirthRecord {
            hangul_name: hangul_name.to_string(),
            hanja_name: (!hanja.is_empty()).then(|| hanja.to_string()),
            gender: self.gender,
            calendar: self.calendar,
            year: self.year,
            month: self.month,
            day: self.day,
            time,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    HangulName,
    HanjaName,
    Gender,
    Year,
    Month,
    Day,
    Calendar,
    TimeUnknown,
    Hour,
    Minute,
    Analyze,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::HangulName,
        FormField::HanjaName,
        FormField::Gender,
        FormField::Year,
        FormField::Month,
        FormField::Day,
        FormField::Calendar,
        FormField::TimeUnknown,
        FormField::Hour,
        FormField::Minute,
        FormField::Analyze,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::HangulName => "한글 이름",
            FormField::HanjaName => "한자 이름 (선택)",
            FormField::Gender => "성별",
            FormField::Year => "생년",
            FormField::Month => "생월",
            FormField::Day => "생일",
            FormField::Calendar => "양력/음력",
            FormField::TimeUnknown => "태어난 시간을 모름",
            FormField::Hour => "태어난 시간 (시)",
            FormField::Minute => "태어난 시간 (분)",
            FormField::Analyze => "운세 & 성명 심층 풀이",
        }
    }

    fn range(&self) -> Option<(i64, i64)> {
        match self {
            FormField::Year => Some(YEAR_RANGE),
            FormField::Month => Some(MONTH_RANGE),
            FormField::Day => Some(DAY_RANGE),
            FormField::Hour => Some(HOUR_RANGE),
            FormField::Minute => Some(MINUTE_RANGE),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.range().is_some()
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormField::HangulName | FormField::HanjaName)
    }
}

/// The form plus focus and the digit buffer of the numeric field being typed.
#[derive(Debug, Clone)]
pub struct FormState {
    pub form: BirthForm,
    pub focus: FormField,
    pub edit_buffer: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(BirthForm::default())
    }
}

impl FormState {
    pub fn new(form: BirthForm) -> Self {
        Self {
            form,
            focus: FormField::HangulName,
            edit_buffer: String::new(),
        }
    }

    /// Hour and minute are hidden while the time is marked unknown.
    pub fn is_visible(&self, field: FormField) -> bool {
        !(self.form.time_unknown && matches!(field, FormField::Hour | FormField::Minute))
    }

    pub fn visible_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_visible(*f))
            .collect()
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        self.commit();
        let fields = self.visible_fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        self.focus = fields[(pos + step).rem_euclid(len) as usize];
    }

    fn numeric_value(&self, field: FormField) -> i64 {
        match field {
            FormField::Year => self.form.year as i64,
            FormField::Month => self.form.month as i64,
            FormField::Day => self.form.day as i64,
            FormField::Hour => self.form.hour as i64,
            FormField::Minute => self.form.minute as i64,
            _ => 0,
        }
    }

    fn set_numeric(&mut self, field: FormField, value: i64) {
        let Some((min, max)) = field.range() else { return };
        let value = value.clamp(min, max);
        match field {
            FormField::Year => self.form.year = value as i32,
            FormField::Month => self.form.month = value as u32,
            FormField::Day => self.form.day = value as u32,
            FormField::Hour => self.form.hour = value as u32,
            FormField::Minute => self.form.minute = value as u32,
            _ => {}
        }
    }

    /// What the focused numeric field currently shows.
    pub fn numeric_display(&self, field: FormField) -> String {
        if field == self.focus && !self.edit_buffer.is_empty() {
            self.edit_buffer.clone()
        } else {
            self.numeric_value(field).to_string()
        }
    }

    /// Apply typed digits, clamped to the field's bounds.
    pub fn commit(&mut self) {
        if self.edit_buffer.is_empty() {
            return;
        }
        if let Ok(value) = self.edit_buffer.parse::<i64>() {
            self.set_numeric(self.focus, value);
        }
        self.edit_buffer.clear();
    }

    pub fn input_char(&mut self, c: char) {
        let focus = self.focus;
        if focus.is_numeric() {
            let max_digits = focus.range().map_or(0, |(_, max)| max.to_string().len());
            if c.is_ascii_digit() && self.edit_buffer.len() < max_digits {
                self.edit_buffer.push(c);
            }
            return;
        }
        match focus {
            FormField::HangulName if self.form.hangul_name.chars().count() < NAME_MAX_CHARS => {
                self.form.hangul_name.push(c)
            }
            FormField::HanjaName if self.form.hanja_name.chars().count() < NAME_MAX_CHARS => {
                self.form.hanja_name.push(c)
            }
            FormField::TimeUnknown if c == ' ' => self.toggle(),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::HangulName => {
                self.form.hangul_name.pop();
            }
            FormField::HanjaName => {
                self.form.hanja_name.pop();
            }
            f if f.is_numeric() => {
                if self.edit_buffer.is_empty() {
                    self.edit_buffer = self.numeric_value(f).to_string();
                }
                self.edit_buffer.pop();
            }
            _ => {}
        }
    }

    /// ←/→ on the focused field: step numbers, cycle selectors, flip the checkbox.
    pub fn adjust(&mut self, delta: i64) {
        self.commit();
        match self.focus {
            FormField::Gender => {
                self.form.gender = cycle(&Gender::ALL, self.form.gender, delta);
            }
            FormField::Calendar => {
                self.form.calendar = cycle(&CalendarType::ALL, self.form.calendar, delta);
            }
            FormField::TimeUnknown => self.toggle(),
            f if f.is_numeric() => {
                let value = self.numeric_value(f) + delta;
                self.set_numeric(f, value);
            }
            _ => {}
        }
    }

    pub fn toggle(&mut self) {
        if self.focus == FormField::TimeUnknown {
            self.form.time_unknown = !self.form.time_unknown;
        }
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, delta: i64) -> T {
    let pos = options.iter().position(|o| *o == current).unwrap_or(0) as i64;
    options[(pos + delta).rem_euclid(options.len() as i64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults() {
        let form = BirthForm::default();
        assert_eq!((form.year, form.month, form.day), (1990, 1, 1));
        assert_eq!((form.hour, form.minute), (12, 0));
        assert_eq!(form.calendar, CalendarType::Solar);
        assert!(!form.time_unknown);
    }

    #[test]
    fn test_empty_name_rejected() {
        let form = BirthForm {
            hangul_name: "   ".to_string(),
            ..BirthForm::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_builds_record() {
        let form = BirthForm {
            hangul_name: " 홍길동 ".to_string(),
            hanja_name: "  ".to_string(),
            time_unknown: true,
            ..BirthForm::default()
        };
        let record = form.validate().unwrap();
        assert_eq!(record.hangul_name, "홍길동");
        assert_eq!(record.hanja_name, None);
        assert_eq!(record.time, BirthTime::Unknown);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let form = BirthForm {
            hangul_name: "홍길동".to_string(),
            year: 1899,
            ..BirthForm::default()
        };
        assert!(matches!(
            form.validate(),
            Err(ValidationError::OutOfRange { field: "생년", value: 1899, .. })
        ));
    }

    #[test]
    fn test_typing_name_and_navigation() {
        let mut state = FormState::default();
        for c in "이순신".chars() {
            state.input_char(c);
        }
        state.backspace();
        assert_eq!(state.form.hangul_name, "이순");

        state.focus_prev();
        assert_eq!(state.focus, FormField::Analyze);
        state.focus_next();
        assert_eq!(state.focus, FormField::HangulName);
    }

    #[test]
    fn test_numeric_typing_commits_with_clamp() {
        let mut state = FormState::default();
        state.focus = FormField::Year;
        for c in "1985".chars() {
            state.input_char(c);
        }
        assert_eq!(state.numeric_display(FormField::Year), "1985");
        state.focus_next();
        assert_eq!(state.form.year, 1985);

        state.focus = FormField::Month;
        state.input_char('9');
        state.input_char('9');
        state.input_char('9'); // beyond two digits, ignored
        state.commit();
        assert_eq!(state.form.month, 12);
    }

    #[test]
    fn test_adjust_steps_and_cycles() {
        let mut state = FormState::default();
        state.focus = FormField::Day;
        state.adjust(-1);
        assert_eq!(state.form.day, 1);
        state.adjust(1);
        assert_eq!(state.form.day, 2);

        state.focus = FormField::Calendar;
        state.adjust(-1);
        assert_eq!(state.form.calendar, CalendarType::LunarLeap);
        state.adjust(1);
        assert_eq!(state.form.calendar, CalendarType::Solar);

        state.focus = FormField::Gender;
        state.adjust(1);
        assert_eq!(state.form.gender, Gender::Female);
    }

    #[test]
    fn test_unknown_time_hides_hour_and_minute() {
        let mut state = FormState::default();
        state.focus = FormField::TimeUnknown;
        state.input_char(' ');
        assert!(state.form.time_unknown);
        state.focus_next();
        assert_eq!(state.focus, FormField::Analyze);
        assert_eq!(state.visible_fields().len(), 9);
    }
}
