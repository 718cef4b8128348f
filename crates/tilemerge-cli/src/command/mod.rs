use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tilemerge_engine::{
    GameConfig, GameSession, GridSize, MergeRule, PlayerIdentity, SpawnPolicy, SpawnSeed,
};

use self::{leaderboard::LeaderboardArg, play::PlayArg, simulate::SimulateArg};

mod leaderboard;
mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
    /// Options of `play`, used when no mode is given
    #[clap(flatten)]
    play: PlayArg,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play interactively in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Play a scripted list of moves and print a JSON summary
    Simulate(#[clap(flatten)] SimulateArg),
    /// Show the best scores stored in the score file
    Leaderboard(#[clap(flatten)] LeaderboardArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(args.play)) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Leaderboard(arg) => leaderboard::run(&arg)?,
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum MergeRuleArg {
    Cascade,
    OncePerTile,
}

impl From<MergeRuleArg> for MergeRule {
    fn from(arg: MergeRuleArg) -> Self {
        match arg {
            MergeRuleArg::Cascade => Self::Cascade,
            MergeRuleArg::OncePerTile => Self::OncePerTile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SpawnPolicyArg {
    EveryMove,
    OnChange,
}

impl From<SpawnPolicyArg> for SpawnPolicy {
    fn from(arg: SpawnPolicyArg) -> Self {
        match arg {
            SpawnPolicyArg::EveryMove => Self::EveryMove,
            SpawnPolicyArg::OnChange => Self::OnChange,
        }
    }
}

/// Game rules shared by every mode that starts a session.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SessionArg {
    /// Side length of the grid (2 to 8)
    #[clap(long, default_value_t = 4)]
    size: usize,
    /// Seed for tile placement as 32 hex digits (random when omitted)
    #[clap(long)]
    seed: Option<SpawnSeed>,
    /// Number of tiles on the grid at the start of a game
    #[clap(long, default_value_t = GameConfig::DEFAULT_INITIAL_TILES)]
    initial_tiles: usize,
    /// Whether a merged tile may merge again in the same move
    #[clap(long, value_enum, default_value_t = MergeRuleArg::Cascade)]
    merge_rule: MergeRuleArg,
    /// When a new tile appears
    #[clap(long, value_enum, default_value_t = SpawnPolicyArg::EveryMove)]
    spawn_policy: SpawnPolicyArg,
}

impl SessionArg {
    pub(crate) fn config(&self) -> anyhow::Result<GameConfig> {
        let size = GridSize::new(self.size).context("Invalid --size")?;
        let config = GameConfig::new(size)
            .with_initial_tiles(self.initial_tiles)
            .with_merge_rule(self.merge_rule.into())
            .with_spawn_policy(self.spawn_policy.into());
        config.validate().context("Invalid --initial-tiles")?;
        Ok(config)
    }

    pub(crate) fn start(&self) -> anyhow::Result<GameSession> {
        let config = self.config()?;
        let session = match self.seed {
            Some(seed) => GameSession::with_seed(config, seed)?,
            None => GameSession::new(config)?,
        };
        tracing::info!(
            size = config.grid_size().get(),
            seed = %session.seed(),
            merge_rule = ?config.merge_rule(),
            spawn_policy = ?config.spawn_policy(),
            "session started"
        );
        Ok(session)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StoreArg {
    /// JSON file holding the best score of every player
    #[clap(long, default_value = "./data/scores.json")]
    scores_file: PathBuf,
}

impl StoreArg {
    pub(crate) fn scores_file(&self) -> &Path {
        &self.scores_file
    }
}

/// Who is playing. Best scores are only loaded and saved when a user id is given.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct IdentityArg {
    /// Player id the best score is stored under
    #[clap(long)]
    user_id: Option<String>,
    /// Name shown on the leaderboard (defaults to the user id)
    #[clap(long, requires = "user_id")]
    display_name: Option<String>,
    #[clap(flatten)]
    store: StoreArg,
}

impl IdentityArg {
    pub(crate) fn identity(&self) -> Option<PlayerIdentity> {
        let user_id = self.user_id.as_ref()?;
        let display_name = self.display_name.as_ref().unwrap_or(user_id);
        Some(PlayerIdentity::new(user_id, display_name))
    }

    pub(crate) fn store(&self) -> &StoreArg {
        &self.store
    }
}
