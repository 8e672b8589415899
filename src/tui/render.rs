use std::borrow::Cow;

use super::form::{FormField, FormState};
use super::state::{AppState, NoticeLevel, Phase};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TITLE: &str = "🔮 AI 사주 & 성명학 정밀 분석";
const FORM_WIDTH: u16 = 42;

pub fn draw(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0], spinner_frame);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);
    draw_form(f, &state.form, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(body[1]);
    draw_notice(f, state, right[0]);
    draw_output(f, state, right[1]);

    draw_logs(f, state, chunks[2]);
    draw_footer(f, chunks[3]);
}

fn phase_span(phase: Phase, spinner_frame: u8) -> Span<'static> {
    match phase {
        Phase::Idle => Span::styled("대기", Style::default().fg(Color::DarkGray)),
        Phase::Validating | Phase::Computing | Phase::PromptReady => {
            Span::styled("준비 중", Style::default().fg(Color::Yellow))
        }
        Phase::Streaming => {
            let spinner = SPINNER_FRAMES[spinner_frame as usize % SPINNER_FRAMES.len()];
            Span::styled(
                format!("{} 분석 중", spinner),
                Style::default().fg(Color::Cyan),
            )
        }
        Phase::Failed => Span::styled("오류", Style::default().fg(Color::Red)),
    }
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let controller = &state.controller;
    let uptime = state.start_time.elapsed().as_secs();

    let mut status = vec![
        Span::styled(format!(" {}  ", TITLE), Style::default().add_modifier(Modifier::BOLD)),
        phase_span(controller.phase(), spinner_frame),
    ];
    if let Some(secs) = controller.elapsed_secs().filter(|_| controller.is_streaming()) {
        status.push(Span::styled(
            format!("  {}s", secs),
            Style::default().fg(Color::DarkGray),
        ));
    }
    status.push(Span::styled(
        format!("  | up {}m{:02}s", uptime / 60, uptime % 60),
        Style::default().fg(Color::DarkGray),
    ));

    let intro = format!(
        "사주 원국에 십신(十神)과 대운(大運)을 더해 정밀하게 분석하고, {}년의 재물, 직업, 건강 운세를 예측합니다.",
        controller.target_year()
    );
    let lines = vec![Line::from(status), Line::from(format!(" {}", intro))];
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(para, area);
}

fn field_value(state: &FormState, field: FormField) -> Span<'static> {
    let form = &state.form;
    match field {
        FormField::HangulName if form.hangul_name.is_empty() => {
            Span::styled("예: 홍길동", Style::default().fg(Color::DarkGray))
        }
        FormField::HanjaName if form.hanja_name.is_empty() => {
            Span::styled("예: 洪吉童", Style::default().fg(Color::DarkGray))
        }
        FormField::HangulName => Span::raw(form.hangul_name.clone()),
        FormField::HanjaName => Span::raw(form.hanja_name.clone()),
        FormField::Gender => Span::raw(format!("◀ {} ▶", form.gender.label())),
        FormField::Calendar => Span::raw(format!("◀ {} ▶", form.calendar.label())),
        FormField::TimeUnknown => Span::raw(if form.time_unknown { "[x]" } else { "[ ]" }),
        FormField::Analyze => Span::styled(
            format!("[ {} ]", field.label()),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        numeric => Span::raw(state.numeric_display(numeric)),
    }
}

fn draw_form(f: &mut Frame, state: &FormState, area: Rect) {
    let mut lines = vec![
        Line::styled(" 1. 이름 정보", Style::default().fg(Color::Cyan)),
    ];
    for field in state.visible_fields() {
        if field == FormField::Gender {
            lines.push(Line::raw(""));
            lines.push(Line::styled(" 2. 사주 정보", Style::default().fg(Color::Cyan)));
        }
        if field == FormField::Analyze {
            lines.push(Line::raw(""));
        }

        let focused = field == state.focus;
        let marker = if focused { "▶ " } else { "  " };
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let value = field_value(state, field);
        if field == FormField::Analyze {
            lines.push(Line::from(vec![Span::styled(marker, label_style), value]));
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{}{}: ", marker, field.label()), label_style),
                value,
            ]));
        }
    }

    let block = Block::default()
        .title(" 📝 사용자 정보 입력 ")
        .borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn level_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Blue,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

fn draw_notice(f: &mut Frame, state: &AppState, area: Rect) {
    let controller = &state.controller;
    let line = match (controller.progress_line(), controller.notice()) {
        // A newer notice (e.g. an ignored submit) wins over the progress line.
        (_, Some(n)) if n.level != NoticeLevel::Success => Line::styled(
            n.message.clone(),
            Style::default().fg(level_color(n.level)),
        ),
        (Some(progress), _) => Line::styled(progress, Style::default().fg(Color::Cyan)),
        (None, Some(n)) => Line::styled(
            n.message.clone(),
            Style::default().fg(level_color(n.level)),
        ),
        (None, None) => Line::styled(
            "왼쪽에 정보를 입력하고 Enter를 누르세요.",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let title = match controller.summary() {
        Some(summary) => format!(" {} ", summary),
        None => " 상태 ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_output(f: &mut Frame, state: &AppState, area: Rect) {
    let text = state.controller.output();
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize;
    let total = wrapped_height(text, inner_width);
    let max_scroll = total.saturating_sub(visible);

    let scroll = if state.follow_output {
        max_scroll
    } else {
        (state.output_scroll as usize).min(max_scroll)
    };

    let title = if total > visible {
        format!(" 분석 결과 [{}/{} lines] ", (scroll + visible).min(total), total)
    } else {
        " 분석 결과 ".to_string()
    };

    let para = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level {
                NoticeLevel::Error => Color::Red,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Info => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level.tag());
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Log ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let line = Line::from(vec![
        key("  [↑/↓]"),
        Span::raw(" 이동  "),
        key("[←/→]"),
        Span::raw(" 변경  "),
        key("[Enter]"),
        Span::raw(" 분석  "),
        key("[PgUp/PgDn]"),
        Span::raw(" 스크롤  "),
        key("[End]"),
        Span::raw(" 따라가기  "),
        key("[Esc]"),
        Span::raw(" 종료"),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Display width of one char: wide for anything outside ASCII.
fn char_width(c: char) -> usize {
    if c.is_ascii() {
        1
    } else {
        2
    }
}

/// Approximate number of rows `text` takes when wrapped at `width` columns.
fn wrapped_height(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.split('\n')
        .map(|line| {
            let w: usize = line.chars().map(char_width).sum();
            w.div_ceil(width).max(1)
        })
        .sum()
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
