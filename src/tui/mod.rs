pub mod form;
pub mod render;
pub mod state;

use crate::generation::{FragmentSink, TextGenerator};
use crate::pipeline;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::{AppState, ShellEvent, StreamRequest};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const PAGE_LINES: i32 = 10;

/// What a key press asks the loop to do beyond editing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit,
    Quit,
}

/// Forwards fragments to the UI loop as [`ShellEvent::Fragment`].
struct ChannelSink(mpsc::UnboundedSender<ShellEvent>);

impl FragmentSink for ChannelSink {
    fn append(&mut self, fragment: &str) {
        let _ = self.0.send(ShellEvent::Fragment(fragment.to_string()));
    }
}

/// Run the TUI until the user quits.
pub async fn run_tui(state: AppState, generator: Arc<dyn TextGenerator>) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state, generator).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut state: AppState,
    generator: Arc<dyn TextGenerator>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ShellEvent>();
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    let mut spinner_frame: u8 = 0;

    loop {
        terminal.draw(|f| render::draw(f, &state, spinner_frame))?;

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else { return Ok(()) };
                if let Event::Key(key) = event? {
                    match handle_key(&mut state, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Submit => {
                            let form = state.form.form.clone();
                            if let Some(request) = state.dispatch(ShellEvent::Submit(form)) {
                                spawn_stream(generator.clone(), request, tx.clone());
                            }
                        }
                        KeyAction::None => {}
                    }
                }
            }
            Some(event) = rx.recv() => {
                state.dispatch(event);
            }
            _ = tick.tick() => {
                if state.controller.is_streaming() {
                    spinner_frame = spinner_frame.wrapping_add(1);
                }
            }
        }
    }
}

fn spawn_stream(
    generator: Arc<dyn TextGenerator>,
    request: StreamRequest,
    tx: mpsc::UnboundedSender<ShellEvent>,
) {
    tokio::spawn(async move {
        let mut sink = ChannelSink(tx.clone());
        let event = match pipeline::stream_analysis(
            generator.as_ref(),
            &request.api_key,
            request.prompt,
            &mut sink,
        )
        .await
        {
            Ok(_) => ShellEvent::Completed,
            Err(e) => ShellEvent::Failed(e),
        };
        let _ = tx.send(event);
    });
}

/// Apply one key press to the form and scroll state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    let form = &mut state.form;
    match key.code {
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Enter => {
            form.commit();
            return KeyAction::Submit;
        }
        KeyCode::Down | KeyCode::Tab => form.focus_next(),
        KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
        KeyCode::Left => form.adjust(-1),
        KeyCode::Right => form.adjust(1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        KeyCode::PageUp => state.scroll_output(-PAGE_LINES),
        KeyCode::PageDown => state.scroll_output(PAGE_LINES),
        KeyCode::End => state.follow_output = true,
        _ => {}
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::form::FormField;
    use super::state::Controller;
    use super::*;
    use crate::config::{AnalysisSettings, ApiKey};
    use crate::saju::LunarTable;

    fn app() -> AppState {
        AppState::new(Controller::new(
            AnalysisSettings {
                api_key: ApiKey::new("k"),
                target_year: 2026,
            },
            Box::new(LunarTable),
        ))
    }

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_name_then_submit() {
        let mut state = app();
        for c in "홍길동".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(state.form.form.hangul_name, "홍길동");
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::Submit);
    }

    #[test]
    fn test_enter_commits_typed_year() {
        let mut state = app();
        state.form.focus = FormField::Year;
        for c in "1984".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.form.form.year, 1984);
    }

    #[test]
    fn test_arrows_move_focus_and_adjust() {
        let mut state = app();
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Down);
        assert_eq!(state.form.focus, FormField::Gender);
        press(&mut state, KeyCode::Down);
        assert_eq!(state.form.focus, FormField::Year);
        press(&mut state, KeyCode::Right);
        assert_eq!(state.form.form.year, 1991);
        press(&mut state, KeyCode::Up);
        assert_eq!(state.form.focus, FormField::Gender);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = app();
        assert_eq!(press(&mut state, KeyCode::Esc), KeyAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut state, ctrl_c), KeyAction::Quit);
        // Plain 'c' is typed into the name.
        assert_eq!(press(&mut state, KeyCode::Char('c')), KeyAction::None);
        assert_eq!(state.form.form.hangul_name, "c");
    }

    #[test]
    fn test_page_keys_scroll_output() {
        let mut state = app();
        press(&mut state, KeyCode::PageDown);
        assert_eq!(state.output_scroll, PAGE_LINES as u16);
        assert!(!state.follow_output);
        press(&mut state, KeyCode::PageUp);
        press(&mut state, KeyCode::PageUp);
        assert_eq!(state.output_scroll, 0);
        press(&mut state, KeyCode::End);
        assert!(state.follow_output);
    }

    #[test]
    fn test_channel_sink_forwards_fragments() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink(tx);
        sink.append("갑");
        sink.append("술");
        let mut got = String::new();
        while let Ok(ShellEvent::Fragment(text)) = rx.try_recv() {
            got.push_str(&text);
        }
        assert_eq!(got, "갑술");
    }
}
