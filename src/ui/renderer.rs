use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use tui_textarea::TextArea;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::constants::VERSION;
use crate::core::message::{Message, Speaker};
use crate::core::session::{ChatSession, Focus, Mode};
use crate::ui::theme::Theme;

const INPUT_HEIGHT: u16 = 5;
const WELCOME_TOP_PADDING: usize = 5;

pub fn ui(
    f: &mut Frame,
    session: &mut ChatSession,
    textarea: &mut TextArea<'static>,
    theme: &Theme,
    clock: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(f.area());

    let width = chunks[0].width as usize;
    f.render_widget(
        Paragraph::new(top_bar(width, clock)).style(theme.top_bar_style),
        chunks[0],
    );

    render_chat_pane(f, session, theme, chunks[1]);

    let input_focused = session.focus() == Focus::Input && session.mode() != Mode::Command;
    textarea.set_block(
        Block::bordered()
            .title(" Query Box ")
            .border_style(border_style(theme, input_focused)),
    );
    textarea.set_cursor_style(if input_focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&*textarea, chunks[2]);

    let (line, style) = bottom_bar(session, theme, chunks[3].width as usize);
    f.render_widget(Paragraph::new(line).style(style), chunks[3]);
}

fn border_style(theme: &Theme, focused: bool) -> Style {
    if focused {
        theme.focused_border_style
    } else {
        theme.unfocused_border_style
    }
}

fn render_chat_pane(f: &mut Frame, session: &mut ChatSession, theme: &Theme, area: Rect) {
    let history_focused = session.focus() == Focus::History && session.mode() != Mode::Command;
    let block = Block::bordered()
        .title(" Message Box ")
        .border_style(border_style(theme, history_focused));
    let inner = block.inner(area);
    let inner_width = inner.width as usize;

    let lines = if session.is_first_exchange() {
        welcome_lines(theme, inner_width)
    } else {
        transcript_lines(session, theme, inner_width)
    };
    let wrapped: Vec<Line<'static>> = lines
        .into_iter()
        .flat_map(|line| wrap_line(line, inner_width))
        .collect();

    let content_height = u16::try_from(wrapped.len()).unwrap_or(u16::MAX);
    let offset = session.scroll.resolve(content_height, inner.height);

    f.render_widget(
        Paragraph::new(wrapped).block(block).scroll((offset, 0)),
        area,
    );
}

pub fn top_bar(width: usize, clock: &str) -> Line<'static> {
    let left = format!("  voltx v{VERSION}");
    let center = "New Chat";
    let right = format!("{clock}  ");

    let center_start = width.saturating_sub(center.width()) / 2;
    let gap_left = center_start.saturating_sub(left.width()).max(1);
    let used = left.width() + gap_left + center.width() + right.width();
    let gap_right = width.saturating_sub(used).max(1);

    Line::from(format!(
        "{left}{}{center}{}{right}",
        " ".repeat(gap_left),
        " ".repeat(gap_right)
    ))
}

pub fn bottom_bar(session: &ChatSession, theme: &Theme, width: usize) -> (Line<'static>, Style) {
    if session.mode() == Mode::Command {
        return (
            Line::from(format!("  :{}", session.command_buffer())),
            theme.command_line_style,
        );
    }

    let left = format!(
        "  Messages: {}   --{}--",
        session.message_count(),
        session.mode().label()
    );
    let right = format!("{} ({})  ", session.model(), session.provider());

    let mut spans = vec![Span::raw(left.clone())];
    let mut used = left.width() + right.width();
    if let Some(status) = session.status() {
        let status = format!("   {status} ");
        used += status.width();
        spans.push(Span::styled(status, theme.status_hint_style));
    }
    spans.push(Span::raw(" ".repeat(width.saturating_sub(used).max(1))));
    spans.push(Span::raw(right));
    (Line::from(spans), theme.bottom_bar_style)
}

pub fn welcome_lines(theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let key_line = |key: &str, pad: &str, text: &str| {
        let verb = if key.starts_with(':') { "type " } else { "press" };
        Line::from(vec![
            Span::raw(format!("{verb} ")),
            Span::styled(key.to_string(), theme.welcome_key_style),
            Span::raw(format!("{pad} - {text}")),
        ])
    };

    let body = vec![
        Line::styled(format!("voltx v{VERSION}"), theme.welcome_title_style),
        Line::default(),
        key_line("Esc", " ", "Enter Normal mode / Exit Command mode"),
        key_line("Tab", " ", "Switch focus between Input and Chat"),
        key_line(":", "   ", "Enter Command mode (from Normal mode)"),
        key_line(":q", "  ", "Quit without saving"),
        key_line(":wq", " ", "Save and quit"),
        Line::default(),
        Line::styled("Start typing your query below.", theme.welcome_hint_style),
    ];

    let content_width = body.iter().map(Line::width).max().unwrap_or(0);
    let pad = " ".repeat(width.saturating_sub(content_width) / 2);

    let mut lines = vec![Line::default(); WELCOME_TOP_PADDING];
    for mut line in body {
        line.spans.insert(0, Span::raw(pad.clone()));
        lines.push(line);
    }
    lines
}

fn prefixed(tag: String, tag_style: Style, first: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("[{tag}]"), tag_style), Span::raw(": ")];
    spans.extend(first);
    Line::from(spans)
}

fn message_lines(message: &Message, provider: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match message.speaker() {
        Speaker::User | Speaker::SystemError => {
            let (tag_style, text_style) = if message.is_user() {
                (theme.user_prefix_style, theme.user_text_style)
            } else {
                (theme.system_error_style, theme.system_error_style)
            };
            let mut text_lines = message.text().lines();
            let first = text_lines.next().unwrap_or_default().to_string();
            lines.push(prefixed(
                message.speaker().tag(provider).to_string(),
                tag_style,
                vec![Span::styled(first, text_style)],
            ));
            lines.extend(text_lines.map(|l| Line::styled(l.to_string(), text_style)));
            if message.speaker() == Speaker::SystemError {
                lines.push(Line::default());
            }
        }
        Speaker::Assistant => {
            let mut rendered = message.rendered().iter().cloned();
            let first = rendered.next().map(|l| l.spans).unwrap_or_default();
            lines.push(prefixed(
                provider.to_string(),
                theme.provider_prefix_style(provider),
                first,
            ));
            lines.extend(rendered);
            lines.push(Line::styled(
                "─".repeat(width.saturating_sub(1)),
                theme.separator_style,
            ));
            lines.push(Line::default());
        }
    }
    lines
}

pub fn transcript_lines(session: &ChatSession, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = session
        .transcript()
        .iter()
        .flat_map(|m| message_lines(m, session.provider(), theme, width))
        .collect();
    if session.is_pending() {
        lines.push(Line::styled(
            format!("waiting for {}...", session.provider()),
            theme.pending_style,
        ));
    }
    lines
}

/// Break a line into rows of at most `width` columns, keeping span styles.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let line_style = line.style;
    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in line.spans {
        let style = span.style;
        let mut buf = String::new();
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width && used > 0 {
                if !buf.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut buf), style));
                }
                rows.push(Line::from(std::mem::take(&mut current)).style(line_style));
                used = 0;
            }
            buf.push(ch);
            used += ch_width;
        }
        if !buf.is_empty() {
            current.push(Span::styled(buf, style));
        }
    }
    if !current.is_empty() {
        rows.push(Line::from(current).style(line_style));
    }
    rows
}
