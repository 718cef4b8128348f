use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget},
};

use crate::view::widgets::style;

/// How a cell took part in the last move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileHighlight {
    #[default]
    None,
    Merged,
    Spawned,
}

#[derive(Debug)]
pub struct TileDisplay {
    value: u32,
    highlight: TileHighlight,
}

impl TileDisplay {
    pub const fn new(value: u32, highlight: TileHighlight) -> Self {
        Self { value, highlight }
    }

    pub fn width() -> u16 {
        7
    }

    pub fn height() -> u16 {
        3
    }

    pub fn style(&self) -> Style {
        let base = style::tile(self.value);
        match self.highlight {
            TileHighlight::None => base,
            TileHighlight::Merged => base.add_modifier(style::MERGED),
            TileHighlight::Spawned => base.add_modifier(style::SPAWNED),
        }
    }

    pub fn label(&self) -> String {
        match self.value {
            0 => "·".to_owned(),
            v if v < 100_000 => v.to_string(),
            v => format!("2^{}", v.trailing_zeros()),
        }
    }
}

impl Widget for TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = self.style();
        // fill the whole tile, then put the value on the middle line
        Paragraph::new("").style(style).render(area, buf);
        Line::styled(self.label(), style)
            .centered()
            .render(area.centered_vertically(Constraint::Length(1)), buf);
    }
}
