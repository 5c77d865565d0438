//! Start-up configuration read from the process environment.
//!
//! Variables are collected from an iterator of `(name, value)` pairs so the same parsing runs
//! against the process environment in production and a plain `Vec` in tests.

use std::collections::HashMap;
use std::ffi::OsString;

use thiserror::Error;

use crate::constants::{VAR_CLIENT_ID, VAR_CLIENT_SECRET, VAR_SKIP_CHECK};

/// Application credentials for the client-credentials grant
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

// keep the secret out of logs and error output
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Env {
    pub credentials: Credentials,
    pub skip_check: bool,
}

impl Env {
    pub fn from_vars<Iter>(iter: Iter) -> EnvResult<Self>
    where
        Iter: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = iter.into_iter().collect();
        let lookup = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        let client_id = lookup(VAR_CLIENT_ID);
        let client_secret = lookup(VAR_CLIENT_SECRET);

        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            (id, secret) => {
                let missing = [
                    (VAR_CLIENT_ID, id.is_none()),
                    (VAR_CLIENT_SECRET, secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, unset)| unset.then_some(name))
                .collect();

                return Err(EnvErr::MissingCredentials { missing });
            }
        };

        // only the exact string enables it, matching how the scheduler sets it
        let skip_check = vars.get(VAR_SKIP_CHECK).is_some_and(|v| v == "true");

        Ok(Self {
            credentials: Credentials {
                client_id,
                client_secret,
            },
            skip_check,
        })
    }
}

/// The process environment as UTF-8 pairs.
///
/// Unlike `dotenvy::vars()` this never panics: variables that aren't valid unicode are skipped,
/// so a broken unrelated variable can't take the run down and a broken credential reads as unset.
pub fn process_vars() -> impl Iterator<Item = (String, String)> {
    unicode_vars(std::env::vars_os())
}

fn unicode_vars<Iter>(iter: Iter) -> impl Iterator<Item = (String, String)>
where
    Iter: IntoIterator<Item = (OsString, OsString)>,
{
    iter.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (Ok(name), Err(_)) => {
                tracing::warn!(var = name, "skipping non-unicode environment variable");
                None
            }
            (Err(_), _) => None,
        })
}

/// Loads `.env` from the working directory into the process environment, if one exists.
pub fn load_dotenv() -> EnvResult<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(EnvErr::Dotenvy(e)),
    }
}

pub type EnvResult<T> = core::result::Result<T, EnvErr>;

#[derive(Debug, Error)]
pub enum EnvErr {
    #[error(transparent)]
    Dotenvy(#[from] dotenvy::Error),

    #[error("missing Twitch client id or secret (not set: {})", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },
}

#[cfg(test)]
mod test {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reads_credentials() {
        let env = Env::from_vars(vars(&[
            (VAR_CLIENT_ID, "abc"),
            (VAR_CLIENT_SECRET, "shh"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        assert_eq!(env.credentials.client_id, "abc");
        assert_eq!(env.credentials.client_secret, "shh");
        assert!(!env.skip_check);
    }

    #[test]
    fn test_missing_secret_is_named() {
        let err = Env::from_vars(vars(&[(VAR_CLIENT_ID, "abc")])).unwrap_err();
        match err {
            EnvErr::MissingCredentials { missing } => {
                assert_eq!(missing, vec![VAR_CLIENT_SECRET]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let err =
            Env::from_vars(vars(&[(VAR_CLIENT_ID, ""), (VAR_CLIENT_SECRET, "")])).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains(VAR_CLIENT_ID));
        assert!(msg.contains(VAR_CLIENT_SECRET));
    }

    #[test]
    fn test_skip_check_requires_exact_true() {
        let base = [(VAR_CLIENT_ID, "abc"), (VAR_CLIENT_SECRET, "shh")];

        for (value, expected) in [("true", true), ("TRUE", false), ("1", false), ("", false)] {
            let mut pairs = base.to_vec();
            pairs.push((VAR_SKIP_CHECK, value));

            let env = Env::from_vars(vars(&pairs)).unwrap();
            assert_eq!(env.skip_check, expected, "SKIP_CHECK={value:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_vars_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let pairs = vec![
            (OsString::from("LC_BROKEN"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![0xc3, 0x28]), OsString::from("value")),
            (OsString::from(VAR_CLIENT_ID), OsString::from("abc")),
            (OsString::from(VAR_CLIENT_SECRET), OsString::from("shh")),
        ];

        let env = Env::from_vars(unicode_vars(pairs)).unwrap();
        assert_eq!(env.credentials.client_id, "abc");
        assert_eq!(env.credentials.client_secret, "shh");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_credential_reads_as_unset() {
        use std::os::unix::ffi::OsStringExt;

        let pairs = vec![
            (OsString::from(VAR_CLIENT_ID), OsString::from("abc")),
            (OsString::from(VAR_CLIENT_SECRET), OsString::from_vec(vec![0xff])),
        ];

        match Env::from_vars(unicode_vars(pairs)).unwrap_err() {
            EnvErr::MissingCredentials { missing } => assert_eq!(missing, vec![VAR_CLIENT_SECRET]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            client_id: "abc".into(),
            client_secret: "hunter2".into(),
        };

        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
