use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use tilemerge_engine::LeaderboardEntry;

use crate::view::widgets::style;

/// Ranked best scores, with the current player's row highlighted.
#[derive(Debug)]
pub struct LeaderboardDisplay<'a> {
    entries: &'a [LeaderboardEntry],
    rows: usize,
    current_user: Option<&'a str>,
    message: Option<&'a str>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> LeaderboardDisplay<'a> {
    /// `rows` fixes the height so the layout does not jump as entries arrive.
    pub fn new(entries: &'a [LeaderboardEntry], rows: usize) -> Self {
        Self {
            entries,
            rows,
            current_user: None,
            message: None,
            block: None,
        }
    }

    pub fn current_user(self, user_id: Option<&'a str>) -> Self {
        Self {
            current_user: user_id,
            ..self
        }
    }

    /// Text shown instead of the table, e.g. when the store is unreadable.
    pub fn message(self, message: Option<&'a str>) -> Self {
        Self { message, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        22 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.rows.max(1)).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for LeaderboardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        if let Some(message) = self.message {
            Line::styled(message, style::DEFAULT).render(area, buf);
            return;
        }
        if self.entries.is_empty() {
            Line::styled("no scores yet", style::DEFAULT)
                .centered()
                .render(area, buf);
            return;
        }

        let rows = Layout::vertical((0..self.rows).map(|_| Constraint::Length(1))).split(area);
        for ((rank, entry), area) in self.entries.iter().enumerate().zip(rows.iter()) {
            let style = if self.current_user == Some(entry.user_id.as_str()) {
                style::HIGHLIGHT_ROW
            } else {
                style::DEFAULT
            };
            let [name_area, score_area] = area.layout(&Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(8),
            ]));
            Line::styled(format!("{:>2}. {}", rank + 1, entry.display_name), style)
                .left_aligned()
                .render(name_area, buf);
            Line::styled(entry.best_score.to_string(), style)
                .right_aligned()
                .render(score_area, buf);
        }
    }
}
