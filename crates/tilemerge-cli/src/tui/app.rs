use crossterm::event::Event;
use ratatui::Frame;

/// Application driven by [`run`](super::run).
pub trait App {
    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, event: &Event);

    /// Draws the whole screen.
    fn draw(&self, frame: &mut Frame);
}
