use std::{path::PathBuf, sync::Arc};

use tilemerge_engine::BestScorePersistence;

use crate::{
    command::{IdentityArg, SessionArg},
    logging,
    store::{BackgroundScoreStore, JsonScoreStore},
    tui,
};

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    pub(super) session: SessionArg,
    #[clap(flatten)]
    pub(super) identity: IdentityArg,
    /// Directory for the log file
    #[clap(long, default_value = "./data/logs/")]
    log_dir: PathBuf,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        session,
        identity,
        log_dir,
    } = arg;

    let _log_guard = logging::init_file(log_dir)?;

    let store = Arc::new(BackgroundScoreStore::spawn(JsonScoreStore::new(
        identity.store().scores_file(),
    ))?);
    let mut session = session.start()?;
    if let Some(identity) = identity.identity() {
        session = session.with_persistence(BestScorePersistence::new(identity, Arc::clone(&store)));
    }

    let mut app = PlayApp::new(session, store);
    tui::run(&mut app)?;
    let session = app.into_session();
    tracing::info!(
        score = session.score(),
        best = session.best(),
        moves = session.moves(),
        "quit"
    );
    Ok(())
}
