pub const ID_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const API_HELIX_URL: &str = "https://api.twitch.tv/helix";

/// Channel whose stream is tracked unless overridden with `--login`
pub const DEFAULT_USER_LOGIN: &str = "thealexlichter";
pub const DEFAULT_SNAPSHOT_PATH: &str = "./latest.json";

pub const VAR_CLIENT_ID: &str = "TWITCH_CLIENT_ID";
pub const VAR_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";
pub const VAR_SKIP_CHECK: &str = "SKIP_CHECK";

pub const DEFAULT_LOG_FILTER: &str = "live_snapshot=info,warn";
