use std::process::ExitCode;

use crate::snapshot::store::{Outcome, Reference};
use crate::util::helix::Helix;
use crate::util::{env, telemetry};

mod args;
mod constants;
mod runner;
mod snapshot;
mod util;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    telemetry::register();
    let args = args::parse_cli_args();

    let result = match env::load_dotenv() {
        Ok(()) => runner::run(&args, env::process_vars(), &Helix::new()).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(outcome) => {
            match outcome {
                Outcome::Skipped { current } => {
                    tracing::info!(bytes = current.len(), "check skipped")
                }
                Outcome::Unchanged => tracing::info!("no change"),
                Outcome::Written { previous, current } => tracing::info!(
                    first_record = previous == Reference::NoneRecorded,
                    bytes = current.len(),
                    "snapshot updated"
                ),
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
