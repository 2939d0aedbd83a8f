use crate::app::App;
use crate::state::OpState;
use crate::ui::Palette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_prompt(frame, chunks[0], app, palette);
    render_result(frame, chunks[1], app, palette);
}

fn render_prompt(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let pending = app.generate.op.is_pending();
    let border = if pending { palette.dim } else { palette.accent };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Prompt ");

    let mut spans = vec![Span::styled(
        app.generate.prompt.as_str(),
        Style::default().fg(palette.text),
    )];
    if !pending {
        spans.push(Span::styled("█", Style::default().fg(palette.accent)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim))
        .title(" Generated Tweet ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.generate.op.state() {
        OpState::Idle => {
            let help = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "AI Tweet Generator",
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Type a prompt and press Enter to generate a tweet."),
                Line::from(""),
                Line::from("Keybindings:"),
                Line::from("  Enter  - generate"),
                Line::from("  Ctrl+P - post result to Twitter clone"),
                Line::from("  Tab    - switch to feed"),
            ];
            let paragraph = Paragraph::new(help).alignment(Alignment::Center);
            frame.render_widget(paragraph, inner);
        }
        OpState::Pending => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Generating...",
                Style::default().fg(palette.dim),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, inner);
        }
        OpState::Success(tweet) => {
            let text = vec![
                Line::from(Span::styled(
                    tweet.content.as_str(),
                    Style::default().fg(palette.text),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("prompt: {}", tweet.prompt),
                    Style::default().fg(palette.dim),
                )),
                Line::from(vec![
                    Span::styled(
                        format!("#{} ", tweet.id),
                        Style::default().fg(palette.accent),
                    ),
                    Span::styled(
                        tweet.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                        Style::default().fg(palette.dim),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "Ctrl+P to post this tweet to the Twitter clone",
                    Style::default().fg(palette.dim),
                )),
            ];
            let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, inner);
        }
        OpState::Failure(err) => {
            let text = vec![
                Line::from(Span::styled(
                    err.user_message(),
                    Style::default().fg(palette.error),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Esc to dismiss",
                    Style::default().fg(palette.dim),
                )),
            ];
            let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, inner);
        }
    }
}
