use crate::saju::CalendarError;

/// Why a birth form could not become a [`crate::saju::BirthRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("이름을 입력해주세요.")]
    EmptyName,

    #[error("{field} 값 {value}이(가) 범위를 벗어났습니다 ({min}~{max}).")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Failure of one analysis action. Every variant ends up on screen.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("API Key 오류: {var} 환경 변수 또는 .env 파일을 확인해주세요.")]
    Configuration { var: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("날짜 변환 오류: {0}")]
    CalendarConversion(#[from] CalendarError),

    #[error("오류 발생: {0:#}")]
    Service(anyhow::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration { .. } => "configuration",
            AnalysisError::Validation(_) => "validation",
            AnalysisError::CalendarConversion(_) => "calendar",
            AnalysisError::Service(_) => "service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saju::LunarDateError;

    #[test]
    fn test_messages() {
        assert_eq!(AnalysisError::from(ValidationError::EmptyName).to_string(), "이름을 입력해주세요.");

        let err = AnalysisError::CalendarConversion(CalendarError::Lunar(
            LunarDateError::NoSuchLeapMonth { year: 2024, month: 3 },
        ));
        assert_eq!(err.to_string(), "날짜 변환 오류: lunar year 2024 has no leap month 3");
        assert_eq!(err.kind(), "calendar");

        let err = AnalysisError::Service(
            anyhow::anyhow!("403 Forbidden").context("gemini request failed"),
        );
        assert_eq!(err.to_string(), "오류 발생: gemini request failed: 403 Forbidden");
    }
}
