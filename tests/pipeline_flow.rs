// End-to-end analysis runs against a scripted generator

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use futures_util::{stream, StreamExt};
    use saju_analyst::config::{AnalysisSettings, ApiKey};
    use saju_analyst::error::AnalysisError;
    use saju_analyst::generation::{FragmentStream, TextGenerator};
    use saju_analyst::pipeline;
    use saju_analyst::prompt::AnalysisPrompt;
    use saju_analyst::saju::{CalendarType, LunarTable};
    use saju_analyst::tui::form::BirthForm;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays fixed fragments, optionally failing after them.
    struct ScriptedGenerator {
        fragments: Vec<&'static str>,
        fail_after: bool,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedGenerator {
        fn new(fragments: Vec<&'static str>, fail_after: bool) -> Self {
            Self {
                fragments,
                fail_after,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _key: &ApiKey, prompt: AnalysisPrompt) -> Result<FragmentStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.into_string());

            let mut items: Vec<Result<String>> =
                self.fragments.iter().map(|f| Ok(f.to_string())).collect();
            if self.fail_after {
                items.push(Err(anyhow::anyhow!("connection reset")));
            }
            Ok(stream::iter(items).boxed())
        }
    }

    fn settings(key: Option<&str>) -> AnalysisSettings {
        AnalysisSettings {
            api_key: key.and_then(ApiKey::new),
            target_year: 2026,
        }
    }

    fn form() -> BirthForm {
        BirthForm {
            hangul_name: "홍길동".to_string(),
            hanja_name: "洪吉童".to_string(),
            ..BirthForm::default()
        }
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_service() {
        let generator = ScriptedGenerator::new(vec!["x"], false);
        let mut out = String::new();
        let err = pipeline::run(&settings(None), &form(), &LunarTable, &generator, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration { .. }));
        assert_eq!(generator.calls(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let generator = ScriptedGenerator::new(vec!["x"], false);
        let mut out = String::new();
        let err = pipeline::run(&settings(Some(" \t ")), &form(), &LunarTable, &generator, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration { .. }));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_name_never_calls_service() {
        let generator = ScriptedGenerator::new(vec!["x"], false);
        let mut out = String::new();
        let blank = BirthForm {
            hangul_name: "   ".to_string(),
            ..BirthForm::default()
        };
        let err = pipeline::run(&settings(Some("k")), &blank, &LunarTable, &generator, &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "이름을 입력해주세요.");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_leap_month_never_calls_service() {
        let generator = ScriptedGenerator::new(vec!["x"], false);
        let mut out = String::new();
        let leap = BirthForm {
            calendar: CalendarType::LunarLeap,
            year: 2024,
            month: 3,
            ..form()
        };
        let err = pipeline::run(&settings(Some("k")), &leap, &LunarTable, &generator, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CalendarConversion(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_fragments_appended_in_order() {
        let generator = ScriptedGenerator::new(vec!["## 1단계", "\n병인 일주", "\n## 2단계"], false);
        let mut out = String::new();
        let prepared = pipeline::run(&settings(Some("k")), &form(), &LunarTable, &generator, &mut out)
            .await
            .unwrap();

        assert_eq!(out, "## 1단계\n병인 일주\n## 2단계");
        assert_eq!(generator.calls(), 1);
        assert_eq!(prepared.pillar.hangul(), "병인");

        let sent = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(sent.contains("홍길동"));
        assert!(sent.contains("洪吉童"));
        assert!(sent.contains("병인"));
        assert!(sent.contains("2026년 병오년"));
    }

    #[tokio::test]
    async fn test_leap_month_birth_uses_converted_date() {
        let generator = ScriptedGenerator::new(vec!["ok"], false);
        let mut out = String::new();
        let leap = BirthForm {
            calendar: CalendarType::LunarLeap,
            year: 2023,
            month: 2,
            day: 1,
            ..form()
        };
        let prepared = pipeline::run(&settings(Some("k")), &leap, &LunarTable, &generator, &mut out)
            .await
            .unwrap();
        assert_eq!(prepared.solar.to_string(), "2023-03-22");
        assert!(prepared.summary().ends_with("양력: 2023.3.22"));
    }

    #[tokio::test]
    async fn test_korean_leap_month_reaches_prompt() {
        // 2012 has a leap 3rd month in Korea (the Chinese calendar leaps the 4th).
        let generator = ScriptedGenerator::new(vec!["ok"], false);
        let mut out = String::new();
        let leap = BirthForm {
            calendar: CalendarType::LunarLeap,
            year: 2012,
            month: 3,
            day: 1,
            ..form()
        };
        let prepared = pipeline::run(&settings(Some("k")), &leap, &LunarTable, &generator, &mut out)
            .await
            .unwrap();
        assert_eq!(prepared.solar.to_string(), "2012-04-21");
        assert_eq!(prepared.pillar.hangul(), "임자");

        let sent = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(sent.contains("임자"));
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_partial_text() {
        let generator = ScriptedGenerator::new(vec!["앞부분", " 계속"], true);
        let mut out = String::new();
        let err = pipeline::run(&settings(Some("k")), &form(), &LunarTable, &generator, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Service(_)));
        assert_eq!(err.to_string(), "오류 발생: connection reset");
        assert_eq!(out, "앞부분 계속");
    }
}
