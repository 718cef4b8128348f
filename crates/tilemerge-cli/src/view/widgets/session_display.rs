use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use tilemerge_engine::{
    Coord, GameSession, GridState, LeaderboardEntry, MergeEvent, MoveOutcome, SessionState,
};

use crate::view::widgets::{
    GridDisplay, KeyBinding, KeyBindingDisplay, LeaderboardDisplay, ScoreDisplay, style,
};

/// Cells still holding a merged tile after the move.
///
/// A cascade can merge into a cell and then move the result further along,
/// leaving the cell empty.
fn merged_cells(grid: &GridState, events: &[MergeEvent]) -> Vec<Coord> {
    let mut cells: Vec<_> = events
        .iter()
        .map(MergeEvent::coord)
        .filter(|&coord| grid.get(coord).is_some_and(|value| value != 0))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// Full play screen: grid, score panel, leaderboard and key legend.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    leaderboard: &'a [LeaderboardEntry],
    leaderboard_rows: usize,
    leaderboard_message: Option<&'a str>,
    key_bindings: &'a [KeyBinding<'a>],
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession, key_bindings: &'a [KeyBinding<'a>]) -> Self {
        Self {
            session,
            leaderboard: &[],
            leaderboard_rows: 10,
            leaderboard_message: None,
            key_bindings,
        }
    }

    pub fn leaderboard(
        self,
        entries: &'a [LeaderboardEntry],
        rows: usize,
        message: Option<&'a str>,
    ) -> Self {
        Self {
            leaderboard: entries,
            leaderboard_rows: rows,
            leaderboard_message: message,
            ..self
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block_padding = Padding::horizontal(1);
        let border_style = match self.session.state() {
            SessionState::Playing => style::PLAYING_BORDER,
            SessionState::BoardFull => style::BOARD_FULL_BORDER,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let last = self.session.last_outcome();
        let merged = last
            .map(|o| merged_cells(self.session.grid(), o.events()))
            .unwrap_or_default();
        let spawned = last.map_or(&[][..], MoveOutcome::spawned);
        let grid = GridDisplay::new(self.session.grid())
            .highlights(&merged, spawned)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let scores = ScoreDisplay::new(self.session).block(panel("SCORE"));
        let user_id = self
            .session
            .persistence()
            .map(|p| p.identity().user_id());
        let leaderboard = LeaderboardDisplay::new(self.leaderboard, self.leaderboard_rows)
            .current_user(user_id)
            .message(self.leaderboard_message)
            .block(panel("TOP"));
        let keys = KeyBindingDisplay::new(self.key_bindings);

        let side_height = scores.height() + 1 + leaderboard.height();
        let [main_area, keys_area] = Layout::vertical([
            Constraint::Length(grid.height().max(side_height)),
            Constraint::Length(2),
        ])
        .flex(Flex::Center)
        .areas(area);
        let [grid_column, side_column] = Layout::horizontal([
            Constraint::Length(grid.width()),
            Constraint::Length(scores.width().max(leaderboard.width())),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(main_area);
        let [grid_area] = Layout::vertical([Constraint::Length(grid.height())]).areas(grid_column);
        let [scores_area, leaderboard_area] = Layout::vertical([
            Constraint::Length(scores.height()),
            Constraint::Length(leaderboard.height()),
        ])
        .spacing(1)
        .areas(side_column);

        let grid_width = grid.width();
        grid.render(grid_area, buf);
        scores.render(scores_area, buf);
        leaderboard.render(leaderboard_area, buf);
        keys.render(keys_area, buf);

        if self.session.state().is_board_full() {
            let banner = Block::new().style(style::BOARD_FULL_BANNER);
            let text = Text::styled("BOARD FULL - press r to restart", style::BOARD_FULL_BANNER)
                .centered();
            let area = grid_area.centered(Constraint::Length(grid_width), Constraint::Length(3));
            let inner = banner.inner(area);
            Clear.render(area, buf);
            banner.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use tilemerge_engine::{Direction, MergeRule, MoveResolver};

    use super::*;

    #[test]
    fn test_emptied_merge_cells_are_not_highlighted() {
        let mut grid =
            GridState::from_rows(&[[2, 2, 2, 2], [4, 4, 0, 0], [0; 4], [0; 4]]).unwrap();
        let events = MoveResolver::new(MergeRule::Cascade).resolve(&mut grid, Direction::Left);
        assert!(events.iter().any(|e| e.coord() == Coord::new(0, 1)));
        assert_eq!(grid.get(Coord::new(0, 1)), Some(0));

        let cells = merged_cells(&grid, &events);
        assert_eq!(cells, vec![Coord::new(0, 0), Coord::new(1, 0)]);
    }
}
