use crate::api::POST_CHAR_LIMIT;
use crate::app::PostModal;
use crate::state::OpState;
use crate::ui::widgets::center_rect;
use crate::ui::Palette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, modal: &PostModal, palette: &Palette) {
    let modal_area = center_rect(60, 50, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Post to Twitter Clone ");
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    render_draft(frame, chunks[0], modal, palette);
    render_counter(frame, chunks[1], modal, palette);
    render_op_state(frame, chunks[2], modal, palette);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Enter to post | Esc to cancel | type to edit",
        Style::default().fg(palette.dim),
    )));
    frame.render_widget(hints, chunks[3]);
}

fn render_draft(frame: &mut Frame, area: Rect, modal: &PostModal, palette: &Palette) {
    let mut spans = vec![Span::styled(
        modal.draft.as_str(),
        Style::default().fg(palette.text),
    )];
    if !modal.op.is_pending() {
        spans.push(Span::styled("█", Style::default().fg(palette.accent)));
    }
    let paragraph = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_counter(frame: &mut Frame, area: Rect, modal: &PostModal, palette: &Palette) {
    let len = modal.draft_len();
    let style = if len > POST_CHAR_LIMIT {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    } else if len > POST_CHAR_LIMIT - 20 {
        Style::default().fg(palette.warn)
    } else {
        Style::default().fg(palette.dim)
    };
    let counter = Paragraph::new(Line::from(Span::styled(
        format!("{}/{}", len, POST_CHAR_LIMIT),
        style,
    )));
    frame.render_widget(counter, area);
}

fn render_op_state(frame: &mut Frame, area: Rect, modal: &PostModal, palette: &Palette) {
    let line = match modal.op.state() {
        OpState::Pending => Line::from(Span::styled(
            "Posting...",
            Style::default().fg(palette.warn),
        )),
        OpState::Failure(err) => Line::from(Span::styled(
            err.user_message(),
            Style::default().fg(palette.error),
        )),
        _ => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}
