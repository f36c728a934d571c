//! Run snapshots
//!
//! A run is one document check after the pipeline has been over it. Runs are
//! written as pretty JSON so independently produced runs can be compared by
//! the consistency analysis later.

use chrono::{DateTime, Utc};
use citeguard_domain::{DocumentCheck, ValidationJob};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot layout
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a run snapshot: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} has snapshot version {found}, expected {expected}", expected = SNAPSHOT_VERSION)]
    Version { path: PathBuf, found: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<ValidationJob>,
    pub check: DocumentCheck,
}

impl RunSnapshot {
    pub fn new(check: DocumentCheck, job: Option<ValidationJob>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            job,
            check,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let io = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io)
    }

    /// Read a snapshot, or a bare document check written by another tool.
    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = |source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        };

        let value: serde_json::Value = serde_json::from_str(&content).map_err(format)?;
        if value.get("check").is_none() {
            let check: DocumentCheck = serde_json::from_value(value).map_err(format)?;
            return Ok(Self::new(check, None));
        }

        let snapshot: RunSnapshot = serde_json::from_value(value).map_err(format)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                path: path.to_path_buf(),
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}
