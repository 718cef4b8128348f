use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use tilemerge_engine::{Coord, GridState};

use crate::view::widgets::{TileDisplay, TileHighlight};

/// The grid, one [`TileDisplay`] per cell.
///
/// Geometry follows [`GridState::size`], so any grid size renders without
/// configuration.
#[derive(Debug)]
pub struct GridDisplay<'a> {
    grid: &'a GridState,
    merged: &'a [Coord],
    spawned: &'a [Coord],
    block: Option<BlockWidget<'a>>,
}

impl<'a> GridDisplay<'a> {
    pub fn new(grid: &'a GridState) -> Self {
        Self {
            grid,
            merged: &[],
            spawned: &[],
            block: None,
        }
    }

    /// Cells to mark as merged and spawned by the last move.
    pub fn highlights(self, merged: &'a [Coord], spawned: &'a [Coord]) -> Self {
        Self {
            merged,
            spawned,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn side(&self) -> u16 {
        u16::try_from(self.grid.size().get()).unwrap_or(u16::MAX)
    }

    pub fn width(&self) -> u16 {
        self.side() * (TileDisplay::width() + 1) - 1
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.side() * TileDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    fn highlight(&self, coord: Coord) -> TileHighlight {
        if self.spawned.contains(&coord) {
            TileHighlight::Spawned
        } else if self.merged.contains(&coord) {
            TileHighlight::Merged
        } else {
            TileHighlight::None
        }
    }
}

impl Widget for GridDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GridDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let n = self.grid.size().get();
        let horizontal = Layout::horizontal(iter::repeat_n(
            Constraint::Length(TileDisplay::width()),
            n,
        ))
        .spacing(1)
        .flex(Flex::Center);
        let vertical =
            Layout::vertical(iter::repeat_n(Constraint::Length(TileDisplay::height()), n));

        for (row_area, row) in iter::zip(vertical.split(area).iter(), self.grid.rows()) {
            for (cell_area, cell) in iter::zip(horizontal.split(*row_area).iter(), row) {
                TileDisplay::new(cell.value(), self.highlight(cell.coord()))
                    .render(*cell_area, buf);
            }
        }
    }
}
