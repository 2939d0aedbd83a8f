pub mod feed;
pub mod generate;
pub mod post_modal;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rect centered in `r`, sized as percentages of it.
pub fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rect_is_contained() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = center_rect(60, 50, outer);
        assert!(inner.x >= outer.x);
        assert!(inner.y >= outer.y);
        assert!(inner.right() <= outer.right());
        assert!(inner.bottom() <= outer.bottom());
    }
}
