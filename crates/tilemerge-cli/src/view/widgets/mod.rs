use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    grid_display::*, key_binding_display::*, leaderboard_display::*, score_display::*,
    session_display::*, tile_display::*,
};

mod grid_display;
mod key_binding_display;
mod leaderboard_display;
mod score_display;
mod session_display;
mod tile_display;

mod color {
    use ratatui::style::Color;

    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const DARK_TEXT: Color = Color::Rgb(119, 110, 101);
    pub const LIGHT_TEXT: Color = Color::Rgb(249, 246, 242);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);

    pub const EMPTY: Color = Color::Rgb(60, 58, 50);
    pub const TILE_2: Color = Color::Rgb(238, 228, 218);
    pub const TILE_4: Color = Color::Rgb(237, 224, 200);
    pub const TILE_8: Color = Color::Rgb(242, 177, 121);
    pub const TILE_16: Color = Color::Rgb(245, 149, 99);
    pub const TILE_32: Color = Color::Rgb(246, 124, 95);
    pub const TILE_64: Color = Color::Rgb(246, 94, 59);
    pub const TILE_128: Color = Color::Rgb(237, 207, 114);
    pub const TILE_256: Color = Color::Rgb(237, 204, 97);
    pub const TILE_512: Color = Color::Rgb(237, 200, 80);
    pub const TILE_1024: Color = Color::Rgb(237, 197, 63);
    pub const TILE_2048: Color = Color::Rgb(237, 194, 46);
    pub const TILE_SUPER: Color = Color::Rgb(60, 58, 50);
}

pub mod style {
    use ratatui::style::{Color, Modifier, Style};

    use super::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY_TILE: Style = fg_bg(color::GRAY, color::EMPTY);
    pub const MERGED: Modifier = Modifier::BOLD.union(Modifier::UNDERLINED);
    pub const SPAWNED: Modifier = Modifier::ITALIC;

    pub const PLAYING_BORDER: Color = color::WHITE;
    pub const BOARD_FULL_BORDER: Color = color::RED;
    pub const BOARD_FULL_BANNER: Style = fg_bg(color::WHITE, color::RED);
    pub const HIGHLIGHT_ROW: Style = fg_bg(color::YELLOW, color::BLACK);

    /// Background grows warmer with the value; small tiles use dark text.
    pub fn tile(value: u32) -> Style {
        let (bg, fg) = match value {
            0 => return EMPTY_TILE,
            2 => (color::TILE_2, color::DARK_TEXT),
            4 => (color::TILE_4, color::DARK_TEXT),
            8 => (color::TILE_8, color::LIGHT_TEXT),
            16 => (color::TILE_16, color::LIGHT_TEXT),
            32 => (color::TILE_32, color::LIGHT_TEXT),
            64 => (color::TILE_64, color::LIGHT_TEXT),
            128 => (color::TILE_128, color::LIGHT_TEXT),
            256 => (color::TILE_256, color::LIGHT_TEXT),
            512 => (color::TILE_512, color::LIGHT_TEXT),
            1024 => (color::TILE_1024, color::LIGHT_TEXT),
            2048 => (color::TILE_2048, color::LIGHT_TEXT),
            _ => (color::TILE_SUPER, color::LIGHT_TEXT),
        };
        fg_bg(fg, bg).add_modifier(Modifier::BOLD)
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
