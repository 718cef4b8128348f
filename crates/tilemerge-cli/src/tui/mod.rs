//! Minimal turn-based terminal runtime.
//!
//! The game only changes in response to input, so there is no tick: the loop
//! redraws after every terminal event and otherwise blocks on input.

use std::io;

pub use self::app::App;
use self::{event::TuiEvent, event_loop::EventLoop};

mod app;
mod event;
mod event_loop;

/// Runs `app` on the alternate screen until [`App::should_exit`] is true.
///
/// The terminal is restored on return, including on error.
pub fn run<A>(app: &mut A) -> io::Result<()>
where
    A: App,
{
    let mut events = EventLoop::new();
    ratatui::run(|terminal| {
        while !app.should_exit() {
            match events.next()? {
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => app.handle_event(&event),
            }
        }
        Ok(())
    })
}
