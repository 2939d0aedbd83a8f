use crate::app::App;
use crate::ui::widgets::center_rect;
use crate::ui::Palette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let collection = &app.feed.collection;
    let refreshing = collection.refresh_op().is_pending();

    let title = if refreshing {
        format!(" Feed ({}) [refreshing] ", collection.len())
    } else {
        format!(" Feed ({}) ", collection.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim))
        .title(title);

    if !collection.loaded_once() {
        if refreshing {
            let loading = List::new(vec![ListItem::new("Loading...")]).block(block);
            frame.render_widget(loading, area);
            return;
        }
        if let Some(err) = collection.refresh_op().error() {
            let text = List::new(vec![
                ListItem::new(Span::styled(
                    err.user_message(),
                    Style::default().fg(palette.error),
                )),
                ListItem::new(Span::styled(
                    "r to retry | Esc to dismiss",
                    Style::default().fg(palette.dim),
                )),
            ])
            .block(block);
            frame.render_widget(text, area);
            return;
        }
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let banners = banner_lines(app, palette);
    let (banner_area, list_area) = if banners.is_empty() {
        (None, inner)
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(banners.len() as u16), Constraint::Min(1)])
            .split(inner);
        (Some(chunks[0]), chunks[1])
    };

    if let Some(banner_area) = banner_area {
        frame.render_widget(Paragraph::new(banners), banner_area);
    }

    if collection.is_empty() {
        let empty = vec![
            Line::from(""),
            Line::from("No tweets yet."),
            Line::from(""),
            Line::from(Span::styled(
                "Tab to generate one | r to refresh",
                Style::default().fg(palette.dim),
            )),
        ];
        let paragraph = Paragraph::new(empty).alignment(Alignment::Center);
        frame.render_widget(paragraph, list_area);
    } else {
        render_list(frame, list_area, app, palette);
    }

    if let Some(id) = &app.feed.confirm_delete {
        render_confirm(frame, area, id, palette);
    }
}

fn banner_lines(app: &App, palette: &Palette) -> Vec<Line<'static>> {
    let collection = &app.feed.collection;
    let mut lines = Vec::new();
    // a failed refresh never clears the list, so stale items stay below
    if collection.loaded_once() {
        if let Some(err) = collection.refresh_op().error() {
            lines.push(Line::from(Span::styled(
                format!("Refresh failed: {}", err.user_message()),
                Style::default().fg(palette.error),
            )));
        }
    }
    if let Some(err) = collection.delete_error() {
        lines.push(Line::from(Span::styled(
            format!("Delete failed: {}", err.user_message()),
            Style::default().fg(palette.error),
        )));
    }
    lines
}

fn render_list(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let collection = &app.feed.collection;
    let wrap_width = area.width.saturating_sub(2).max(10) as usize;
    let items: Vec<ListItem> = collection
        .items()
        .iter()
        .map(|tweet| {
            let deleting = collection.is_delete_pending(&tweet.id);
            let content_style = if deleting {
                Style::default().fg(palette.dim)
            } else {
                Style::default().fg(palette.text)
            };

            let mut lines: Vec<Line> = textwrap::wrap(&tweet.content, wrap_width)
                .into_iter()
                .map(|row| Line::from(Span::styled(row.into_owned(), content_style)))
                .collect();

            let mut meta = vec![
                Span::styled(format!("  #{} ", tweet.id), Style::default().fg(palette.accent)),
                Span::styled(
                    format!("{} · ", tweet.prompt),
                    Style::default().fg(palette.dim),
                ),
                Span::styled(
                    tweet.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    Style::default().fg(palette.dim),
                ),
            ];
            if deleting {
                meta.push(Span::styled(
                    "  deleting...",
                    Style::default().fg(palette.warn),
                ));
            }
            lines.push(Line::from(meta));

            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(palette.highlight_bg)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(app.feed.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_confirm(frame: &mut Frame, area: Rect, id: &str, palette: &Palette) {
    let modal_area = center_rect(50, 20, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.warn))
        .title(" Delete Tweet ");
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let text = vec![
        Line::from(""),
        Line::from(format!("Delete tweet #{}?", id)),
        Line::from(""),
        Line::from(Span::styled(
            "y to delete | n or Esc to cancel",
            Style::default().fg(palette.dim),
        )),
    ];
    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
