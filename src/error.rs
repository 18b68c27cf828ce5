//! Error types for every component of the crate.
//!
//! Each component returns its own enum so callers can tell an item that was
//! skipped from an operation that was aborted, and both from the one
//! unrecoverable condition, [`UpgradeError::DoubleFault`].

use std::io;
use std::path::PathBuf;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::backup::SnapshotId;

/// Errors returned by [`crate::WorkoutStore`].
///
/// The HTTP layer is expected to map `NotFound` to 404, `Conflict` to 409
/// and everything else to 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Infrastructure(#[source] DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Conflict(msg),
            _ => Self::Infrastructure(err),
        }
    }
}

/// Why one exercise directory could not be parsed.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no content.json or metadata.json in {0}")]
    MissingContent(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed content file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort a whole import. Per-exercise problems never surface
/// here; they end up in [`crate::importer::ImportReport::skipped`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("assets directory not found at {0}")]
    MissingRoot(PathBuf),

    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to clear the exercise library: {0}")]
    Clear(#[source] DbErr),
}

/// Errors raised while taking or restoring a snapshot.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("snapshot i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {0} not found")]
    NotFound(SnapshotId),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot references unknown {kind} {id}")]
    UnknownReference { kind: &'static str, id: i32 },
}

/// Failure inside the transforming phase of a legacy upgrade.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("legacy workout {workout_id} exercise {entry_id} matches no unique exercise title")]
    UnresolvedExercise { workout_id: i32, entry_id: i32 },
}

/// Errors surfaced by [`crate::upgrade::LegacyUpgrade::run`].
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("failed to inspect the live schema: {0}")]
    Detect(#[source] DbErr),

    #[error("legacy `exercises` table is still attached; detach it before running migrations")]
    ExercisesNotDetached,

    #[error("safety backup failed, upgrade aborted: {0}")]
    Backup(#[source] BackupError),

    #[error("legacy upgrade rolled back and restored from snapshot {snapshot}: {reason}")]
    RolledBack { snapshot: SnapshotId, reason: String },

    #[error(
        "legacy upgrade failed ({upgrade}) and restoring snapshot {snapshot} also failed ({restore})"
    )]
    DoubleFault {
        snapshot: SnapshotId,
        upgrade: String,
        restore: String,
    },
}

/// Errors from the startup sequence in [`crate::bootstrap::prepare`].
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to apply schema migrations: {0}")]
    Schema(#[source] DbErr),

    #[error(transparent)]
    Upgrade(#[from] UpgradeError),

    #[error("initial asset import failed: {0}")]
    Import(#[from] ImportError),

    #[error("database error: {0}")]
    Database(#[source] DbErr),
}

/// Errors reading [`crate::Config`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
