use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use crate::args::Cli;
use crate::snapshot::Observation;
use crate::snapshot::store::{ChangeWriter, Outcome, SnapshotStore, StoreErr};
use crate::util::env::{Env, EnvErr};
use crate::util::helix::{Helix, HelixErr};

#[derive(Debug, Error)]
pub enum RunnerErr {
    #[error(transparent)]
    Env(#[from] EnvErr),

    #[error(transparent)]
    Store(#[from] StoreErr),

    #[error("error getting access token: {0}")]
    Token(#[source] HelixErr),

    #[error("error getting stream data: {0}")]
    Stream(#[source] HelixErr),
}

pub type RunnerResult<T> = core::result::Result<T, RunnerErr>;

/// A single pass: read configuration, load the recorded snapshot, fetch a token, look up the
/// stream and record it if it changed.
///
/// Configuration is validated before anything else, so missing credentials never reach the
/// network.
#[instrument(skip_all, fields(login = args.login, output = %args.output.display()))]
pub async fn run<Iter>(args: &Cli, vars: Iter, helix: &Helix) -> RunnerResult<Outcome>
where
    Iter: IntoIterator<Item = (String, String)>,
{
    let env = Env::from_vars(vars)?;
    let skip_check = env.skip_check || args.skip_check;

    let store = SnapshotStore::new(&args.output);
    let reference = store.load().await?;

    let token = helix
        .fetch_app_token(&env.credentials)
        .await
        .map_err(RunnerErr::Token)?;

    let observation = helix
        .fetch_stream(&env.credentials.client_id, &token, &args.login)
        .await
        .map_err(RunnerErr::Stream)?;

    match &observation {
        Observation::Live(snapshot) => tracing::info!(
            title = snapshot.title,
            viewers = snapshot.viewer_count,
            uptime_mins = snapshot.uptime(Utc::now()).map(|d| d.num_minutes()),
            "channel is live"
        ),
        Observation::Offline => tracing::info!("channel is offline"),
    }

    ChangeWriter::new(store, reference, skip_check)
        .record(&observation)
        .await
        .map_err(RunnerErr::from)
}
