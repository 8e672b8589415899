//! One analysis run: validate → normalize → day pillar → prompt → stream.

use crate::config::{AnalysisSettings, ApiKey, API_KEY_VAR};
use crate::error::AnalysisError;
use crate::generation::{FragmentSink, TextGenerator};
use crate::prompt::{self, AnalysisPrompt};
use crate::saju::{self, BirthRecord, LunarCalendar, SexagenaryTerm};
use crate::tui::form::BirthForm;
use chrono::NaiveDate;
use futures_util::StreamExt;

/// Everything computed before the generation call.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub api_key: ApiKey,
    pub record: BirthRecord,
    pub solar: NaiveDate,
    pub pillar: SexagenaryTerm,
    pub prompt: AnalysisPrompt,
}

impl PreparedAnalysis {
    /// Confirmation line shown before streaming starts.
    pub fn summary(&self) -> String {
        format!(
            "✅ 데이터 확정: [{}]님 / 일주: {} / 양력: {}",
            self.record.hangul_name,
            self.pillar,
            self.solar.format("%Y.%-m.%-d")
        )
    }
}

/// Missing or blank credential stops the run before anything is computed.
pub fn check_credential(settings: &AnalysisSettings) -> Result<ApiKey, AnalysisError> {
    settings
        .api_key
        .clone()
        .ok_or(AnalysisError::Configuration { var: API_KEY_VAR })
}

/// Normalize the date, derive the day pillar and render the prompt.
pub fn compute(
    settings: &AnalysisSettings,
    lunar: &dyn LunarCalendar,
    api_key: ApiKey,
    record: BirthRecord,
) -> Result<PreparedAnalysis, AnalysisError> {
    let solar = saju::to_solar(lunar, record.calendar, record.year, record.month, record.day)?;
    let pillar = saju::day_pillar(solar);
    let prompt = prompt::render(&record, solar, pillar, settings.target_year);

    tracing::debug!(
        calendar = record.calendar.label(),
        %solar,
        pillar = %pillar,
        "analysis prepared"
    );

    Ok(PreparedAnalysis {
        api_key,
        record,
        solar,
        pillar,
        prompt,
    })
}

/// Runs every step up to, but not including, the generation call.
pub fn prepare(
    settings: &AnalysisSettings,
    form: &BirthForm,
    lunar: &dyn LunarCalendar,
) -> Result<PreparedAnalysis, AnalysisError> {
    let api_key = check_credential(settings)?;
    let record = form.validate()?;
    compute(settings, lunar, api_key, record)
}

/// Streams the response into `sink` in arrival order. Text appended before a
/// failure stays in the sink. Returns the number of fragments received; a
/// stream that ends without any text is a service failure.
pub async fn stream_analysis(
    generator: &dyn TextGenerator,
    api_key: &ApiKey,
    prompt: AnalysisPrompt,
    sink: &mut (dyn FragmentSink + Send),
) -> Result<usize, AnalysisError> {
    let mut fragments = generator
        .generate(api_key, prompt)
        .await
        .map_err(AnalysisError::Service)?;

    let mut count = 0;
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment.map_err(AnalysisError::Service)?;
        sink.append(&fragment);
        count += 1;
    }
    if count == 0 {
        return Err(AnalysisError::Service(anyhow::anyhow!(
            "the generation service returned no text"
        )));
    }
    tracing::debug!(fragments = count, "analysis stream completed");
    Ok(count)
}

/// Full run without a screen: prepare, then stream into `sink`.
pub async fn run(
    settings: &AnalysisSettings,
    form: &BirthForm,
    lunar: &dyn LunarCalendar,
    generator: &dyn TextGenerator,
    sink: &mut (dyn FragmentSink + Send),
) -> Result<PreparedAnalysis, AnalysisError> {
    let prepared = prepare(settings, form, lunar)?;
    stream_analysis(generator, &prepared.api_key, prepared.prompt.clone(), sink).await?;
    Ok(prepared)
}
