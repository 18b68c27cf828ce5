//! Snapshot backup and restore of the workout data graph.
//!
//! A [`Snapshot`] holds every exercise, every template with its entries and
//! every session with its sets. Snapshots are persisted through a
//! [`SnapshotStore`]; [`FileSnapshotStore`] keeps them as pretty-printed JSON
//! files named after their creation time.
//!
//! Restore re-inserts rows with fresh primary keys and re-points children
//! through old-id to new-id maps. It runs in a single transaction: a
//! snapshot either comes back whole or not at all.
//!
//! While legacy tables are present, [`SnapshotManager::backup`] also copies
//! them verbatim into [`Snapshot::legacy`], and restore puts them back with
//! their original ids.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IntoActiveModel, NotSet, QueryOrder, Set, TransactionTrait,
};
use sea_orm_migration::SchemaManager;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entity::legacy::{
    exercise_asset, legacy_exercise, workout, workout_asset, LEGACY_EXERCISES,
};
use crate::entity::{
    exercise, workout_exercise, workout_session, workout_set, workout_template, Exercise,
    WorkoutExercise, WorkoutSession, WorkoutSet, WorkoutTemplate,
};
use crate::error::BackupError;
use crate::migration::create_legacy_tables;

/// Snapshot format written by this version of the crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Identifier of a stored snapshot, derived from its creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of a snapshot taken at `created_at`, with microsecond precision.
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self(created_at.format("%Y%m%d_%H%M%S_%6f").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A template together with its ordered entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    #[serde(flatten)]
    pub template: workout_template::Model,
    pub exercises: Vec<workout_exercise::Model>,
}

/// A session together with its sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub session: workout_session::Model,
    pub sets: Vec<workout_set::Model>,
}

/// The full workout object graph at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<exercise::Model>,
    pub templates: Vec<TemplateSnapshot>,
    pub sessions: Vec<SessionSnapshot>,
    /// Rows of the legacy tables, present only if any existed at backup time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacySnapshot>,
}

/// Verbatim copy of the legacy tables. A table that did not exist is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySnapshot {
    pub workout_assets: Vec<workout_asset::Model>,
    pub exercise_assets: Vec<exercise_asset::Model>,
    pub workouts: Vec<workout::Model>,
    pub exercises: Vec<legacy_exercise::Model>,
}

impl LegacySnapshot {
    /// Reads whichever legacy tables exist, or `None` if there are none.
    pub async fn capture(conn: &DatabaseConnection) -> Result<Option<Self>, DbErr> {
        let manager = SchemaManager::new(conn);
        let mut legacy = Self::default();
        let mut found = false;

        if manager.has_table("workout_assets").await? {
            found = true;
            legacy.workout_assets = workout_asset::Entity::find()
                .order_by_asc(workout_asset::Column::Id)
                .all(conn)
                .await?;
        }
        if manager.has_table("exercise_assets").await? {
            found = true;
            legacy.exercise_assets = exercise_asset::Entity::find()
                .order_by_asc(exercise_asset::Column::Id)
                .all(conn)
                .await?;
        }
        if manager.has_table("workouts").await? {
            found = true;
            legacy.workouts = workout::Entity::find()
                .order_by_asc(workout::Column::Id)
                .all(conn)
                .await?;
        }
        if manager.has_table(LEGACY_EXERCISES).await? {
            found = true;
            legacy.exercises = legacy_exercise::Entity::find()
                .order_by_asc(legacy_exercise::Column::Id)
                .all(conn)
                .await?;
        }

        Ok(found.then_some(legacy))
    }

    /// Total number of legacy rows held.
    pub fn rows(&self) -> usize {
        self.workout_assets.len()
            + self.exercise_assets.len()
            + self.workouts.len()
            + self.exercises.len()
    }
}

impl Snapshot {
    /// Reads the current workout data into memory.
    pub async fn capture<C>(db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let exercises = Exercise::find()
            .order_by_asc(exercise::Column::Id)
            .all(db)
            .await?;

        let mut entries: HashMap<i32, Vec<workout_exercise::Model>> = HashMap::new();
        for entry in WorkoutExercise::find()
            .order_by_asc(workout_exercise::Column::TemplateId)
            .order_by_asc(workout_exercise::Column::Position)
            .order_by_asc(workout_exercise::Column::Id)
            .all(db)
            .await?
        {
            entries.entry(entry.template_id).or_default().push(entry);
        }

        let templates = WorkoutTemplate::find()
            .order_by_asc(workout_template::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|template| TemplateSnapshot {
                exercises: entries.remove(&template.id).unwrap_or_default(),
                template,
            })
            .collect();

        let mut sets: HashMap<i32, Vec<workout_set::Model>> = HashMap::new();
        for set in WorkoutSet::find()
            .order_by_asc(workout_set::Column::SessionId)
            .order_by_asc(workout_set::Column::SetNumber)
            .order_by_asc(workout_set::Column::Id)
            .all(db)
            .await?
        {
            sets.entry(set.session_id).or_default().push(set);
        }

        let sessions = WorkoutSession::find()
            .order_by_asc(workout_session::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|session| SessionSnapshot {
                sets: sets.remove(&session.id).unwrap_or_default(),
                session,
            })
            .collect();

        Ok(Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            exercises,
            templates,
            sessions,
            legacy: None,
        })
    }
}

/// Row counts written by a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub exercises: usize,
    pub templates: usize,
    pub template_exercises: usize,
    pub sessions: usize,
    pub sets: usize,
    /// Legacy rows put back, across all legacy tables.
    pub legacy_rows: usize,
}

/// Persistence for snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persists `snapshot` and returns the id it can be loaded back with.
    async fn save(&self, snapshot: &Snapshot) -> Result<SnapshotId, BackupError>;

    /// Loads a previously saved snapshot.
    async fn load(&self, id: &SnapshotId) -> Result<Snapshot, BackupError>;

    /// Ids of all stored snapshots, oldest first.
    async fn list(&self) -> Result<Vec<SnapshotId>, BackupError>;
}

/// Stores snapshots as `backup_<id>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding snapshot `id`.
    pub fn path_for(&self, id: &SnapshotId) -> PathBuf {
        self.dir.join(format!("backup_{id}.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<SnapshotId, BackupError> {
        let id = SnapshotId::at(snapshot.created_at);
        let path = self.path_for(&id);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| BackupError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(BackupError::Encode)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| BackupError::Io { path, source })?;

        Ok(id)
    }

    async fn load(&self, id: &SnapshotId) -> Result<Snapshot, BackupError> {
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackupError::NotFound(id.clone()))
            }
            Err(source) => return Err(BackupError::Io { path, source }),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|source| BackupError::Decode { path, source })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(BackupError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    async fn list(&self) -> Result<Vec<SnapshotId>, BackupError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(BackupError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| BackupError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };

            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(id) = name
                .strip_prefix("backup_")
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                ids.push(SnapshotId::new(id));
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Takes and restores snapshots of one database through one store.
#[derive(Debug, Clone)]
pub struct SnapshotManager<S = FileSnapshotStore> {
    conn: DatabaseConnection,
    store: S,
}

impl<S: SnapshotStore> SnapshotManager<S> {
    pub fn new(conn: DatabaseConnection, store: S) -> Self {
        Self { conn, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Captures the current data, legacy tables included, and persists it.
    pub async fn backup(&self) -> Result<SnapshotId, BackupError> {
        let mut snapshot = Snapshot::capture(&self.conn).await?;
        snapshot.legacy = LegacySnapshot::capture(&self.conn).await?;
        let id = self.store.save(&snapshot).await?;
        info!(
            snapshot = %id,
            exercises = snapshot.exercises.len(),
            templates = snapshot.templates.len(),
            sessions = snapshot.sessions.len(),
            legacy_rows = snapshot.legacy.as_ref().map_or(0, LegacySnapshot::rows),
            "backup written"
        );
        Ok(id)
    }

    /// Loads snapshot `id` and restores it. See [`restore_snapshot`].
    pub async fn restore(&self, id: &SnapshotId) -> Result<RestoreReport, BackupError> {
        let snapshot = self.store.load(id).await?;
        let report = restore_snapshot(&self.conn, &snapshot).await?;
        info!(snapshot = %id, ?report, "snapshot restored");
        Ok(report)
    }

    /// The most recent snapshot id, if any.
    pub async fn latest(&self) -> Result<Option<SnapshotId>, BackupError> {
        Ok(self.store.list().await?.pop())
    }
}

/// Re-inserts every row of `snapshot` inside one transaction.
///
/// The target workout tables are expected to be empty, or at least not to
/// clash with the snapshot. Surrogate ids are reassigned; every other field,
/// timestamps included, is written back as captured. Legacy rows replace
/// the current legacy table contents with their ids kept, and missing
/// legacy tables are recreated. Any failure rolls the whole restore back.
pub async fn restore_snapshot(
    conn: &DatabaseConnection,
    snapshot: &Snapshot,
) -> Result<RestoreReport, BackupError> {
    let txn = conn.begin().await?;
    let restored = match restore_into(&txn, snapshot).await {
        Ok(mut report) => match &snapshot.legacy {
            Some(legacy) => restore_legacy(&txn, legacy).await.map(|rows| {
                report.legacy_rows = rows;
                report
            }),
            None => Ok(report),
        },
        Err(e) => Err(e),
    };
    match restored {
        Ok(report) => {
            txn.commit().await?;
            Ok(report)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                warn!(error = %rollback, "rollback of failed restore also failed");
            }
            Err(e)
        }
    }
}

async fn restore_into<C>(db: &C, snapshot: &Snapshot) -> Result<RestoreReport, BackupError>
where
    C: ConnectionTrait,
{
    let mut report = RestoreReport::default();

    let mut exercise_ids = HashMap::with_capacity(snapshot.exercises.len());
    for exercise in &snapshot.exercises {
        let mut row = exercise.clone().into_active_model().reset_all();
        row.id = NotSet;
        let inserted = row.insert(db).await?;
        exercise_ids.insert(exercise.id, inserted.id);
        report.exercises += 1;
    }
    let exercise_id = |old: i32| {
        exercise_ids
            .get(&old)
            .copied()
            .ok_or(BackupError::UnknownReference {
                kind: "exercise",
                id: old,
            })
    };

    let mut template_ids = HashMap::with_capacity(snapshot.templates.len());
    for entry in &snapshot.templates {
        let mut row = entry.template.clone().into_active_model().reset_all();
        row.id = NotSet;
        let template = row.insert(db).await?;
        template_ids.insert(entry.template.id, template.id);
        report.templates += 1;

        for child in &entry.exercises {
            let mut row = child.clone().into_active_model().reset_all();
            row.id = NotSet;
            row.template_id = Set(template.id);
            row.exercise_id = Set(exercise_id(child.exercise_id)?);
            row.insert(db).await?;
            report.template_exercises += 1;
        }
    }

    for entry in &snapshot.sessions {
        let template_id = entry
            .session
            .template_id
            .map(|old| {
                template_ids
                    .get(&old)
                    .copied()
                    .ok_or(BackupError::UnknownReference {
                        kind: "template",
                        id: old,
                    })
            })
            .transpose()?;

        let mut row = entry.session.clone().into_active_model().reset_all();
        row.id = NotSet;
        row.template_id = Set(template_id);
        let session = row.insert(db).await?;
        report.sessions += 1;

        for set in &entry.sets {
            let mut row = set.clone().into_active_model().reset_all();
            row.id = NotSet;
            row.session_id = Set(session.id);
            row.exercise_id = Set(exercise_id(set.exercise_id)?);
            row.insert(db).await?;
            report.sets += 1;
        }
    }

    Ok(report)
}

async fn restore_legacy(
    txn: &DatabaseTransaction,
    legacy: &LegacySnapshot,
) -> Result<usize, BackupError> {
    create_legacy_tables(&SchemaManager::new(txn)).await?;

    legacy_exercise::Entity::delete_many().exec(txn).await?;
    workout::Entity::delete_many().exec(txn).await?;
    exercise_asset::Entity::delete_many().exec(txn).await?;
    workout_asset::Entity::delete_many().exec(txn).await?;

    // parents first, ids as captured
    for row in &legacy.workout_assets {
        workout_asset::Entity::insert(row.clone().into_active_model().reset_all())
            .exec_without_returning(txn)
            .await?;
    }
    for row in &legacy.exercise_assets {
        exercise_asset::Entity::insert(row.clone().into_active_model().reset_all())
            .exec_without_returning(txn)
            .await?;
    }
    for row in &legacy.workouts {
        workout::Entity::insert(row.clone().into_active_model().reset_all())
            .exec_without_returning(txn)
            .await?;
    }
    for row in &legacy.exercises {
        legacy_exercise::Entity::insert(row.clone().into_active_model().reset_all())
            .exec_without_returning(txn)
            .await?;
    }

    Ok(legacy.rows())
}

/// Deletes all workout data (sets, sessions, template entries, templates
/// and exercises) in dependency order. Users are kept.
pub async fn clear_workout_data<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    WorkoutSet::delete_many().exec(db).await?;
    WorkoutSession::delete_many().exec(db).await?;
    WorkoutExercise::delete_many().exec(db).await?;
    WorkoutTemplate::delete_many().exec(db).await?;
    Exercise::delete_many().exec(db).await?;
    Ok(())
}
