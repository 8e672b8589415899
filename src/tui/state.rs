use super::form::{BirthForm, FormState};
use crate::config::{AnalysisSettings, ApiKey};
use crate::error::AnalysisError;
use crate::pipeline::{self, PreparedAnalysis};
use crate::prompt::AnalysisPrompt;
use crate::saju::LunarCalendar;
use std::collections::VecDeque;
use std::time::Instant;

const MAX_LOGS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Computing,
    PromptReady,
    Streaming,
    /// Terminal error display; a new submit starts over.
    Failed,
}

/// Discrete inputs to the controller.
#[derive(Debug)]
pub enum ShellEvent {
    Submit(BirthForm),
    Fragment(String),
    Completed,
    Failed(AnalysisError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn tag(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Success => "OK",
            NoticeLevel::Warning => "WARN",
            NoticeLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What the caller must start after a successful submit.
#[derive(Debug)]
pub struct StreamRequest {
    pub api_key: ApiKey,
    pub prompt: AnalysisPrompt,
}

/// Drives one analysis at a time through [`Phase`]s and owns the output buffer.
pub struct Controller {
    settings: AnalysisSettings,
    lunar: Box<dyn LunarCalendar>,
    phase: Phase,
    output: String,
    summary: Option<String>,
    subject: Option<String>,
    notice: Option<Notice>,
    fragments: usize,
    started_at: Option<Instant>,
}

impl Controller {
    pub fn new(settings: AnalysisSettings, lunar: Box<dyn LunarCalendar>) -> Self {
        Self {
            settings,
            lunar,
            phase: Phase::Idle,
            output: String::new(),
            summary: None,
            subject: None,
            notice: None,
            fragments: 0,
            started_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn target_year(&self) -> i32 {
        self.settings.target_year
    }

    /// Progress line while a stream is open.
    pub fn progress_line(&self) -> Option<String> {
        if !self.is_streaming() {
            return None;
        }
        let name = self.subject.as_deref().unwrap_or_default();
        Some(format!(
            "🔍 {}님의 대운과 {}년 운세를 심층 분석 중입니다...",
            name, self.settings.target_year
        ))
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == Phase::Streaming
    }

    pub fn elapsed_secs(&self) -> Option<u64> {
        self.started_at.map(|t| t.elapsed().as_secs())
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notice = Some(Notice { level, message });
    }

    /// Handle one event. Returns a request when a stream should be started.
    pub fn dispatch(&mut self, event: ShellEvent) -> Option<StreamRequest> {
        match event {
            ShellEvent::Submit(form) => self.submit(&form),
            ShellEvent::Fragment(text) => {
                if self.phase == Phase::Streaming {
                    self.output.push_str(&text);
                    self.fragments += 1;
                } else {
                    tracing::debug!(phase = ?self.phase, "dropping fragment outside a stream");
                }
                None
            }
            ShellEvent::Completed => {
                if self.phase == Phase::Streaming {
                    tracing::info!(fragments = self.fragments, secs = ?self.elapsed_secs(), "analysis completed");
                    self.set_phase(Phase::Idle);
                    self.notify(NoticeLevel::Success, "분석이 완료되었습니다.".to_string());
                }
                None
            }
            ShellEvent::Failed(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn fail(&mut self, err: AnalysisError) {
        tracing::warn!(kind = err.kind(), "analysis failed");
        let (phase, level) = match err {
            AnalysisError::Validation(_) => (Phase::Idle, NoticeLevel::Warning),
            AnalysisError::Configuration { .. } => (Phase::Idle, NoticeLevel::Error),
            AnalysisError::CalendarConversion(_) | AnalysisError::Service(_) => {
                (Phase::Failed, NoticeLevel::Error)
            }
        };
        self.set_phase(phase);
        self.notify(level, err.to_string());
    }

    fn submit(&mut self, form: &BirthForm) -> Option<StreamRequest> {
        if self.phase == Phase::Streaming {
            self.notify(
                NoticeLevel::Info,
                "이전 분석이 아직 진행 중입니다. 완료 후 다시 시도해주세요.".to_string(),
            );
            return None;
        }
        self.summary = None;
        self.subject = None;

        match self.prepare(form) {
            Ok(prepared) => {
                self.set_phase(Phase::PromptReady);
                let summary = prepared.summary();
                self.summary = Some(summary.clone());
                self.subject = Some(prepared.record.hangul_name.clone());
                self.output.clear();
                self.fragments = 0;
                self.started_at = Some(Instant::now());
                self.notify(NoticeLevel::Success, summary);
                self.set_phase(Phase::Streaming);
                Some(StreamRequest {
                    api_key: prepared.api_key,
                    prompt: prepared.prompt,
                })
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn prepare(&mut self, form: &BirthForm) -> Result<PreparedAnalysis, AnalysisError> {
        let api_key = pipeline::check_credential(&self.settings)?;

        self.set_phase(Phase::Validating);
        let record = form.validate()?;

        self.set_phase(Phase::Computing);
        pipeline::compute(&self.settings, self.lunar.as_ref(), api_key, record)
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: NoticeLevel,
    pub message: String,
}

/// Everything the screen shows.
pub struct AppState {
    pub form: FormState,
    pub controller: Controller,
    pub output_scroll: u16,
    pub follow_output: bool,
    pub logs: VecDeque<LogEntry>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self {
            form: FormState::default(),
            controller,
            output_scroll: 0,
            follow_output: true,
            logs: VecDeque::with_capacity(MAX_LOGS),
            start_time: Instant::now(),
        }
    }

    pub fn push_log(&mut self, level: NoticeLevel, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level,
            message,
        });
    }

    /// Dispatch to the controller, logging any new notice.
    pub fn dispatch(&mut self, event: ShellEvent) -> Option<StreamRequest> {
        let is_submit = matches!(event, ShellEvent::Submit(_));
        let before = self.controller.notice().cloned();
        let request = self.controller.dispatch(event);
        if is_submit && request.is_some() {
            self.output_scroll = 0;
            self.follow_output = true;
        }
        if let Some(notice) = self.controller.notice().cloned() {
            if before.as_ref() != Some(&notice) || is_submit {
                self.push_log(notice.level, notice.message);
            }
        }
        request
    }

    pub fn scroll_output(&mut self, delta: i32) {
        self.follow_output = false;
        self.output_scroll = (self.output_scroll as i32 + delta).max(0) as u16;
    }
}
