pub mod widgets;

use crate::app::{App, Page};
use crate::config::Theme;
use crate::state::OpState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Colors resolved from the active theme. Widgets take the palette
/// instead of matching on the theme themselves.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub error: Color,
    pub warn: Color,
    pub highlight_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                text: Color::Black,
                dim: Color::DarkGray,
                accent: Color::Blue,
                error: Color::Red,
                warn: Color::Yellow,
                highlight_bg: Color::Gray,
            },
            Theme::Dark => Self {
                text: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                error: Color::LightRed,
                warn: Color::Yellow,
                highlight_bg: Color::DarkGray,
            },
        }
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_tabs(frame, chunks[0], app, &palette);

    match app.page {
        Page::Generate => widgets::generate::render(frame, chunks[1], app, &palette),
        Page::Feed => widgets::feed::render(frame, chunks[1], app, &palette),
    }

    render_status_bar(frame, chunks[2], app, &palette);

    if let Some(modal) = &app.post_modal {
        widgets::post_modal::render(frame, frame.area(), modal, &palette);
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let tab = |label: &str, page: Page| {
        if app.page == page {
            Span::styled(
                format!(" {} ", label),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(palette.dim))
        }
    };

    let mut spans = vec![
        tab("Generate", Page::Generate),
        Span::styled("|", Style::default().fg(palette.dim)),
        tab("Feed", Page::Feed),
    ];
    spans.push(Span::raw("  "));
    spans.push(health_indicator(app, palette));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim))
        .title(" tweetgen ");
    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn health_indicator(app: &App, palette: &Palette) -> Span<'static> {
    match app.health.state() {
        OpState::Success(health) if health.is_healthy() => {
            Span::styled("● api up", Style::default().fg(Color::Green))
        }
        OpState::Success(health) => Span::styled(
            format!("● api {}", health.status),
            Style::default().fg(palette.warn),
        ),
        OpState::Failure(_) => Span::styled("○ api down", Style::default().fg(palette.error)),
        OpState::Pending => Span::styled("… api", Style::default().fg(palette.dim)),
        OpState::Idle => Span::raw(""),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(palette.accent),
        ))
    } else {
        let hints = match app.page {
            Page::Generate => "Enter generate | Ctrl+P post | Tab feed | Ctrl+T theme | Ctrl+C quit",
            Page::Feed => "r refresh | j/k move | d delete | Tab generate | t theme | q quit",
        };
        Line::from(Span::styled(hints, Style::default().fg(palette.dim)))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim));
    frame.render_widget(Paragraph::new(line).block(block), area);
}
