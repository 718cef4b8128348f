use std::io;

use crossterm::event;

use super::event::TuiEvent;

/// Alternates between waiting for input and asking for a redraw.
#[derive(Debug)]
pub(super) struct EventLoop {
    dirty: bool,
}

impl EventLoop {
    /// The first event is always a render so the initial screen appears
    /// before any input.
    pub(super) fn new() -> Self {
        Self { dirty: true }
    }

    /// Blocks until the next event.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        if self.dirty {
            self.dirty = false;
            return Ok(TuiEvent::Render);
        }
        let event = event::read()?;
        self.dirty = true;
        Ok(event.into())
    }
}
