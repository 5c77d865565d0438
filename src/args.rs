use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_SNAPSHOT_PATH, DEFAULT_USER_LOGIN};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Records a Twitch stream snapshot when it changes")]
pub struct Cli {
    /// TTV channel login/username to look up
    #[arg(short, long, default_value = DEFAULT_USER_LOGIN)]
    pub login: String,

    /// File holding the most recently recorded snapshot
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub output: PathBuf,

    /// Log the current snapshot without comparing or writing it (same as `SKIP_CHECK=true`)
    #[arg(long)]
    pub skip_check: bool,
}

pub fn parse_cli_args() -> Cli {
    let args = Cli::parse();
    tracing::debug!(?args, "parsed command line");

    args
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Cli::try_parse_from(["live-snapshot"]).unwrap();
        assert_eq!(args.login, DEFAULT_USER_LOGIN);
        assert_eq!(args.output, PathBuf::from(DEFAULT_SNAPSHOT_PATH));
        assert!(!args.skip_check);
    }

    #[test]
    fn test_overrides() {
        let args = Cli::try_parse_from([
            "live-snapshot",
            "--login",
            "plss",
            "-o",
            "/tmp/snap.json",
            "--skip-check",
        ])
        .unwrap();

        assert_eq!(args.login, "plss");
        assert_eq!(args.output, PathBuf::from("/tmp/snap.json"));
        assert!(args.skip_check);
    }
}
