use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tilemerge_engine::{
    Direction, GameSession, Leaderboard, LeaderboardEntry, PlayerIdentity, rank_entries,
};

use crate::{
    tui::App,
    view::widgets::{KeyBinding, SessionDisplay},
};

const LEADERBOARD_ROWS: usize = 10;

const KEY_BINDINGS: &[KeyBinding] = &[
    (&["←↑↓→", "wasd", "hjkl"], "Move"),
    (&["r"], "Restart"),
    (&["q", "Esc"], "Quit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Move(Direction),
    Restart,
    Quit,
}

impl Action {
    fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Self::Quit);
        }
        let action = match key.code {
            KeyCode::Up => Self::Move(Direction::Up),
            KeyCode::Down => Self::Move(Direction::Down),
            KeyCode::Left => Self::Move(Direction::Left),
            KeyCode::Right => Self::Move(Direction::Right),
            KeyCode::Esc => Self::Quit,
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'w' | 'k' => Self::Move(Direction::Up),
                's' | 'j' => Self::Move(Direction::Down),
                'a' | 'h' => Self::Move(Direction::Left),
                'd' | 'l' => Self::Move(Direction::Right),
                'r' => Self::Restart,
                'q' => Self::Quit,
                _ => return None,
            },
            _ => return None,
        };
        Some(action)
    }
}

/// Replaces the player's stored best with the live one when it is higher.
///
/// Saves run in the background, so a freshly read leaderboard may still show
/// the previous value.
fn with_live_best(
    entries: Vec<LeaderboardEntry>,
    identity: &PlayerIdentity,
    best: u64,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    if best == 0 {
        return entries;
    }
    let mut entries = entries;
    match entries.iter_mut().find(|e| e.user_id == identity.user_id()) {
        Some(entry) => entry.best_score = entry.best_score.max(best),
        None => entries.push(LeaderboardEntry {
            user_id: identity.user_id().to_owned(),
            display_name: identity.display_name().to_owned(),
            best_score: best,
        }),
    }
    rank_entries(entries, limit)
}

#[derive(Debug)]
pub struct PlayApp<L> {
    session: GameSession,
    leaderboard: L,
    entries: Vec<LeaderboardEntry>,
    leaderboard_error: Option<String>,
    is_exiting: bool,
}

impl<L> PlayApp<L>
where
    L: Leaderboard,
{
    pub fn new(session: GameSession, leaderboard: L) -> Self {
        let mut app = Self {
            session,
            leaderboard,
            entries: vec![],
            leaderboard_error: None,
            is_exiting: false,
        };
        app.refresh_leaderboard();
        app
    }

    pub fn into_session(self) -> GameSession {
        self.session
    }

    fn refresh_leaderboard(&mut self) {
        match self.leaderboard.top_scores(LEADERBOARD_ROWS) {
            Ok(entries) => {
                self.entries = match self.session.persistence() {
                    Some(p) => {
                        with_live_best(entries, p.identity(), self.session.best(), LEADERBOARD_ROWS)
                    }
                    None => entries,
                };
                self.leaderboard_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read leaderboard");
                self.leaderboard_error = Some("leaderboard unavailable".to_owned());
            }
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Move(direction) => match self.session.apply_move(direction) {
                Ok(outcome) => {
                    if outcome.new_best().is_some() {
                        self.refresh_leaderboard();
                    }
                }
                Err(e) => tracing::debug!(%direction, error = %e, "move ignored"),
            },
            Action::Restart => {
                self.session.restart();
                self.refresh_leaderboard();
            }
            Action::Quit => self.is_exiting = true,
        }
    }
}

impl<L> App for PlayApp<L>
where
    L: Leaderboard,
{
    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, event: &Event) {
        if let Some(key) = event.as_key_press_event()
            && let Some(action) = Action::from_key(&key)
        {
            self.perform(action);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let display = SessionDisplay::new(&self.session, KEY_BINDINGS).leaderboard(
            &self.entries,
            LEADERBOARD_ROWS,
            self.leaderboard_error.as_deref(),
        );
        frame.render_widget(display, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend};
    use tilemerge_engine::{
        BestScorePersistence, GameConfig, InMemoryScoreStore, ScoreStore as _, SpawnSeed,
    };

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn session() -> GameSession {
        GameSession::with_seed(GameConfig::default(), SpawnSeed::from_bytes([3; 16])).unwrap()
    }

    #[test]
    fn test_key_mapping() {
        let action = |code| Action::from_key(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(action(KeyCode::Up), Some(Action::Move(Direction::Up)));
        assert_eq!(action(KeyCode::Char('a')), Some(Action::Move(Direction::Left)));
        assert_eq!(action(KeyCode::Char('D')), Some(Action::Move(Direction::Right)));
        assert_eq!(action(KeyCode::Char('j')), Some(Action::Move(Direction::Down)));
        assert_eq!(action(KeyCode::Char('r')), Some(Action::Restart));
        assert_eq!(action(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action(KeyCode::Char('x')), None);
        assert_eq!(action(KeyCode::Enter), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(&ctrl_c), Some(Action::Quit));
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(&ctrl_a), None);
    }

    #[test]
    fn test_keys_drive_session() {
        let mut app = PlayApp::new(session(), InMemoryScoreStore::new());
        app.handle_event(&key(KeyCode::Left));
        app.handle_event(&key(KeyCode::Char('w')));
        assert_eq!(app.session.moves(), 2);

        app.handle_event(&key(KeyCode::Char('r')));
        assert_eq!(app.session.moves(), 0);
        assert!(!app.should_exit());

        app.handle_event(&key(KeyCode::Char('q')));
        assert!(app.should_exit());
    }

    #[test]
    fn test_live_best_overlays_leaderboard() {
        let ann = PlayerIdentity::new("ann", "Ann");
        let stored = vec![
            LeaderboardEntry {
                user_id: "bob".into(),
                display_name: "Bob".into(),
                best_score: 100,
            },
            LeaderboardEntry {
                user_id: "ann".into(),
                display_name: "Ann".into(),
                best_score: 50,
            },
        ];
        let entries = with_live_best(stored.clone(), &ann, 200, 10);
        assert_eq!(entries[0].user_id, "ann");
        assert_eq!(entries[0].best_score, 200);
        assert_eq!(entries.len(), 2);

        let entries = with_live_best(stored.clone(), &ann, 10, 10);
        assert_eq!(entries[1].best_score, 50);

        let newcomer = PlayerIdentity::new("cy", "Cy");
        let entries = with_live_best(stored, &newcomer, 60, 2);
        let ids: Vec<_> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, ["bob", "cy"]);
    }

    #[test]
    fn test_new_best_refreshes_leaderboard() {
        let store = Arc::new(InMemoryScoreStore::new());
        let ann = PlayerIdentity::new("ann", "Ann");
        let session =
            session().with_persistence(BestScorePersistence::new(ann, Arc::clone(&store)));
        let mut app = PlayApp::new(session, Arc::clone(&store));
        assert!(app.entries.is_empty());

        for code in [KeyCode::Left, KeyCode::Up, KeyCode::Right, KeyCode::Down]
            .into_iter()
            .cycle()
            .take(200)
        {
            if app.session.best() > 0 || app.session.state().is_board_full() {
                break;
            }
            app.handle_event(&key(code));
        }

        assert!(app.session.best() > 0);
        assert_eq!(app.entries[0].user_id, "ann");
        assert_eq!(app.entries[0].best_score, app.session.best());
        assert_eq!(
            store.load_best_score("ann").unwrap(),
            Some(app.session.best())
        );
    }

    #[test]
    fn test_draw_renders_panels() {
        let mut app = PlayApp::new(session(), InMemoryScoreStore::new());
        app.handle_event(&key(KeyCode::Left));

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("SCORE"));
        assert!(screen.contains("TOP"));
        assert!(screen.contains("no scores yet"));
        assert!(screen.contains("Restart"));
        assert!(!screen.contains("BOARD FULL"));
    }
}
