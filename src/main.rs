use anyhow::Result;
use saju_analyst::config::{Config, API_KEY_VAR};
use saju_analyst::generation::gemini::GeminiClient;
use saju_analyst::saju::LunarTable;
use saju_analyst::tui::{
    self,
    state::{AppState, Controller, NoticeLevel},
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(Path::new("config.toml"))?;

    let log_file = std::fs::File::create(&config.logging.file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("saju_analyst=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    // Real env vars take precedence over .env
    Config::load_env_file();
    let api_key = Config::api_key();
    if api_key.is_none() {
        tracing::warn!(var = API_KEY_VAR, "no API key configured");
    }

    let generator = Arc::new(GeminiClient::new(&config.generation)?);
    tracing::info!(
        model = %config.generation.model,
        target_year = config.prompt.target_year,
        "starting"
    );

    let controller = Controller::new(config.analysis_settings(api_key.clone()), Box::new(LunarTable));
    let mut state = AppState::new(controller);
    if api_key.is_none() {
        state.push_log(
            NoticeLevel::Warning,
            format!("{} 가 설정되지 않았습니다. 분석 전에 .env 파일을 확인해주세요.", API_KEY_VAR),
        );
    }

    tui::run_tui(state, generator).await
}
