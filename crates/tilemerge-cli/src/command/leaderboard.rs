use tilemerge_engine::Leaderboard as _;

use crate::{command::StoreArg, logging, store::JsonScoreStore};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LeaderboardArg {
    #[clap(flatten)]
    store: StoreArg,
    /// Number of players to show
    #[clap(long, default_value_t = 10)]
    limit: usize,
}

pub(crate) fn run(arg: &LeaderboardArg) -> anyhow::Result<()> {
    let LeaderboardArg { store, limit } = arg;

    logging::init_stderr()?;

    let store = JsonScoreStore::new(store.scores_file());
    let entries = store.top_scores(*limit)?;
    if entries.is_empty() {
        println!("No scores in {}", store.path().display());
        return Ok(());
    }

    let name_width = entries
        .iter()
        .map(|e| e.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("PLAYER".len());
    println!("{:>4}  {:<name_width$}  {:>10}", "RANK", "PLAYER", "BEST");
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:>4}  {:<name_width$}  {:>10}",
            rank + 1,
            entry.display_name,
            entry.best_score
        );
    }
    Ok(())
}
