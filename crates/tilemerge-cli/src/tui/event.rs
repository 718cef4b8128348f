use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// The screen is out of date.
    #[from(ignore)]
    Render,
    /// Key input, mouse and resize events.
    Crossterm(CrosstermEvent),
}
