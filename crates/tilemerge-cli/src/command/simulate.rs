use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use tilemerge_engine::{BestScorePersistence, Direction, GameSession};

use crate::{
    command::{IdentityArg, SessionArg},
    logging,
    schema::summary::{GameSummary, TurnRecord},
    store::{BackgroundScoreStore, JsonScoreStore},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(super) session: SessionArg,
    #[clap(flatten)]
    pub(super) identity: IdentityArg,
    /// Comma separated moves, e.g. `up,left,down` (also u/d/l/r, wasd, hjkl)
    #[clap(long, value_delimiter = ',', required = true)]
    moves: Vec<String>,
    /// Output file for the JSON summary (stdout when omitted)
    #[clap(long)]
    output: Option<PathBuf>,
}

/// Parses every move up front so a bad token aborts before anything is played.
fn parse_moves(moves: &[String]) -> anyhow::Result<Vec<Direction>> {
    moves
        .iter()
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<Direction>()
                .with_context(|| format!("Invalid move #{}", i + 1))
        })
        .collect()
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        session,
        identity,
        moves,
        output,
    } = arg;

    logging::init_stderr()?;

    let directions = parse_moves(moves)?;
    // the session owns the store; dropping it at the end of this block waits
    // for pending saves
    let summary = {
        let mut session = session.start()?;
        if let Some(player) = identity.identity() {
            let scores_file = identity.store().scores_file();
            let store = BackgroundScoreStore::spawn(JsonScoreStore::new(scores_file))?;
            session = session.with_persistence(BestScorePersistence::new(player, Arc::new(store)));
        }
        let turns = play(&mut session, &directions);
        GameSummary::new(&session, directions.len(), turns)
    };

    tracing::info!(
        score = summary.score,
        best = summary.best,
        moves = summary.moves_applied,
        state = ?summary.state,
        "simulation finished"
    );
    Output::save_json(&summary, output.as_deref())
}

fn play(session: &mut GameSession, directions: &[Direction]) -> Vec<TurnRecord> {
    let mut turns = Vec::with_capacity(directions.len());
    for &direction in directions {
        let outcome = match session.apply_move(direction) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(%direction, error = %e, "move ignored");
                break;
            }
        };
        turns.push(TurnRecord::new(session.moves(), &outcome));
        if outcome.board_full().is_some() {
            tracing::info!(turn = session.moves(), "board full, skipping remaining moves");
            break;
        }
    }
    turns
}

#[cfg(test)]
mod tests {
    use tilemerge_engine::{GameConfig, GridSize, SpawnSeed};

    use super::*;

    fn tokens(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|&m| m.to_owned()).collect()
    }

    #[test]
    fn test_parse_moves() {
        let directions = parse_moves(&tokens(&["up", "L", " down ", "d", "k"])).unwrap();
        assert_eq!(
            directions,
            [
                Direction::Up,
                Direction::Left,
                Direction::Down,
                Direction::Down,
                Direction::Up
            ]
        );
    }

    #[test]
    fn test_invalid_move_aborts() {
        let err = parse_moves(&tokens(&["up", "sideways", "left"])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid move #2");
        assert!(format!("{err:#}").contains("sideways"));
    }

    #[test]
    fn test_play_records_every_turn() {
        let mut session =
            GameSession::with_seed(GameConfig::default(), SpawnSeed::from_bytes([9; 16]))
                .unwrap();
        let directions = [Direction::Left, Direction::Right, Direction::Up];
        let turns = play(&mut session, &directions);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].turn, 3);
        assert_eq!(
            turns.iter().map(|t| t.score_delta).sum::<u64>(),
            session.score()
        );

        let summary = GameSummary::new(&session, directions.len(), turns);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["moves_applied"], 3);
        assert_eq!(json["state"], "playing");
        assert_eq!(json["turns"][0]["direction"], "left");
        assert_eq!(json["seed"], "09090909090909090909090909090909");
        assert!(json.get("player").is_none());
    }

    #[test]
    fn test_play_stops_at_board_full() {
        // a full 2x2 of twos collapses to two 4s, after which left moves
        // only fill the right column
        let config = GameConfig::new(GridSize::new(2).unwrap()).with_initial_tiles(4);
        let mut session =
            GameSession::with_seed(config, SpawnSeed::from_bytes([1; 16])).unwrap();
        let turns = play(&mut session, &[Direction::Left; 10]);
        assert_eq!(turns.len(), 3);
        assert!(session.state().is_board_full());
        assert_eq!(session.grid().to_rows(), vec![vec![4, 2], vec![4, 2]]);

        let turns = play(&mut session, &[Direction::Right, Direction::Up]);
        assert!(turns.is_empty());
        assert_eq!(session.moves(), 3);
    }
}
