use core::fmt;

use http::header::{AUTHORIZATION, InvalidHeaderValue};
use http::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::constants::{API_HELIX_URL, ID_TOKEN_URL};
use crate::snapshot::{Observation, StreamSnapshot};
use crate::util::env::Credentials;

pub const HELIX_URN_STREAMS: &str = "streams";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Thin client over the two Twitch endpoints we need: the OAuth token exchange and Helix'
/// `streams` lookup.
#[derive(Debug, Clone)]
pub struct Helix {
    client: reqwest::Client,
    token_url: String,
    helix_url: String,
}

impl Helix {
    pub fn new() -> Self {
        Self::with_base_urls(ID_TOKEN_URL, API_HELIX_URL)
    }

    /// Points the client at alternative endpoints, e.g. a local mock server.
    pub fn with_base_urls(token_url: impl Into<String>, helix_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: token_url.into(),
            helix_url: helix_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, credentials), fields(client_id = credentials.client_id))]
    /// Exchanges the application's client id + secret for an app access token.
    pub async fn fetch_app_token(&self, credentials: &Credentials) -> HelixResult<AccessToken> {
        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
        ];

        let res = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(HelixErr::ReqwestError)?;

        let token = Self::parse::<TokenResponse>(res).await?;

        if token.access_token.is_empty() {
            return Err(HelixErr::EmptyAccessToken);
        }

        tracing::debug!(
            expires_in = token.expires_in,
            token_type = token.token_type,
            "received app access token"
        );

        Ok(AccessToken(token.access_token))
    }

    #[instrument(skip(self, client_id, token))]
    /// Looks up the stream for a single channel login.
    ///
    /// Helix returns an empty `data` array when the channel isn't live, which maps to
    /// `Observation::Offline`. Otherwise only the first entry is considered.
    pub async fn fetch_stream(
        &self,
        client_id: &str,
        token: &AccessToken,
        login: &str,
    ) -> HelixResult<Observation> {
        let uri = format!("{}/{}", self.helix_url, HELIX_URN_STREAMS);
        let headers = auth_headers(client_id, token)?;

        let res = self
            .client
            .get(uri)
            .headers(headers)
            .query(&[("user_login", login)])
            .send()
            .await
            .map_err(HelixErr::ReqwestError)?;

        let body = Self::parse::<HelixDataResponse<HelixStream>>(res).await?;

        tracing::debug!(data_length = body.data.len(), "fetched stream data");

        Ok(match body.data.into_iter().next() {
            Some(stream) => Observation::Live(stream.into()),
            None => Observation::Offline,
        })
    }

    /// Checks the response status and parses the body according to the specified `T` output
    /// type.
    async fn parse<T>(res: reqwest::Response) -> HelixResult<T>
    where
        T: DeserializeOwned + fmt::Debug,
    {
        // if the request was unsuccessful, check to see whether the response contained extra
        // details about the error and return those if available
        if !res.status().is_success() {
            let status_code = res.status();
            tracing::error!(code = %status_code, "non-2xx response");

            return Err(match res.json::<Value>().await {
                Ok(body) => {
                    tracing::error!(?body, "error message in response");
                    HelixErr::FetchErrWithBody {
                        status: status_code.as_u16(),
                        body,
                    }
                }
                Err(_) => HelixErr::FetchErr(status_code.to_string()),
            });
        }

        let rl_remaining = res.headers().get("ratelimit-remaining");
        let rl_total = res.headers().get("ratelimit-limit");

        if let Some(remaining) = rl_remaining
            && let Some(total) = rl_total
        {
            tracing::debug!(ratelimit_available = ?remaining, ratelimit_total = ?total, "rate-limit bucket");
        }

        res.json::<T>().await.map_err(HelixErr::ReqwestError)
    }
}

fn auth_headers(client_id: &str, token: &AccessToken) -> HelixResult<HeaderMap> {
    let mut bearer_value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?;
    bearer_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer_value);
    headers.insert("Client-Id", HeaderValue::from_str(client_id)?);

    Ok(headers)
}

/// App access token returned by the client-credentials grant
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelixDataResponse<T> {
    data: Vec<T>,
}

/// The subset of a Helix stream object we record; every other field is ignored during
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixStream {
    pub title: String,
    // untagged streams have been observed to come back with `null` here
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub viewer_count: u64,
    pub started_at: String,
    pub thumbnail_url: String,
}

impl From<HelixStream> for StreamSnapshot {
    fn from(stream: HelixStream) -> Self {
        Self {
            title: stream.title,
            tags: stream.tags,
            viewer_count: stream.viewer_count,
            started_at: stream.started_at,
            thumbnail_url: stream.thumbnail_url,
        }
    }
}

pub type HelixResult<T> = core::result::Result<T, HelixErr>;

#[derive(Debug, Error)]
pub enum HelixErr {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("while creating a HeaderValue ({0})")]
    HeaderError(#[from] InvalidHeaderValue),

    #[error("token endpoint returned an empty access token")]
    EmptyAccessToken,

    #[error("error during helix fetch: {0}")]
    FetchErr(String),

    #[error("error (with detail) during helix fetch ({status}): {}", .body["message"].as_str().unwrap_or("no message"))]
    FetchErrWithBody { status: u16, body: Value },
}
