use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use crate::snapshot::Observation;

/// The single file holding the most recently recorded snapshot text.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    /// Reads the previously recorded text. A missing file means nothing has been recorded yet.
    pub async fn load(&self) -> StoreResult<Reference> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                tracing::debug!(bytes = text.len(), "loaded recorded snapshot");
                Ok(Reference::Recorded(text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("no recorded snapshot found");
                Ok(Reference::NoneRecorded)
            }
            Err(e) => Err(StoreErr::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    #[instrument(skip(self, text), fields(path = %self.path.display(), bytes = text.len()))]
    pub async fn write(&self, text: &str) -> StoreResult<()> {
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| StoreErr::Write {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// The recorded text the current observation is compared against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    NoneRecorded,
    Recorded(String),
}

impl Reference {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Reference::NoneRecorded => false,
            Reference::Recorded(recorded) => recorded == text,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::NoneRecorded => f.write_str("[NONE_RECORDED]"),
            Reference::Recorded(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Skip-check mode: the snapshot was computed and logged, nothing compared or written
    Skipped { current: String },
    Unchanged,
    Written { previous: Reference, current: String },
}

/// Persists an observation only when its text differs from the recorded reference.
#[derive(Debug)]
pub struct ChangeWriter {
    store: SnapshotStore,
    reference: Reference,
    skip_check: bool,
}

impl ChangeWriter {
    pub fn new(store: SnapshotStore, reference: Reference, skip_check: bool) -> Self {
        Self {
            store,
            reference,
            skip_check,
        }
    }

    #[instrument(skip_all, fields(skip_check = self.skip_check, live = observation.is_live()))]
    pub async fn record(self, observation: &Observation) -> StoreResult<Outcome> {
        let current = observation.to_text()?;

        if self.skip_check {
            tracing::info!("skipping check");
            tracing::info!(new = %current, "new data");
            return Ok(Outcome::Skipped { current });
        }

        if self.reference.matches(&current) {
            tracing::debug!("snapshot unchanged");
            return Ok(Outcome::Unchanged);
        }

        tracing::info!(latest = %self.reference, "latest data");
        tracing::info!(new = %current, "new data");

        self.store.write(&current).await?;
        tracing::info!(path = %self.store.path().display(), "wrote new snapshot");

        Ok(Outcome::Written {
            previous: self.reference,
            current,
        })
    }
}

pub type StoreResult<T> = core::result::Result<T, StoreErr>;

#[derive(Debug, Error)]
pub enum StoreErr {
    #[error("while reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("while writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("while serializing snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
