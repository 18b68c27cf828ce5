//! One-shot upgrade of a legacy database to the template/session schema.
//!
//! The upgrade walks a small state machine:
//!
//! ```text
//! Detecting ──▶ NotNeeded
//!     │
//!     ▼
//! BackingUp ──▶ Transforming ──▶ Committed
//!                    │
//!                    ▼
//!               RollingBack
//! ```
//!
//! The old schema stored workout exercises in a table named `exercises`.
//! [`detach_legacy_exercises`] must rename it before [`crate::Migrator`]
//! creates the current library table; [`crate::bootstrap::migrate`] does both
//! in that order.
//!
//! A safety snapshot of the current tables and of every legacy table is
//! taken before anything is written. The transformation itself runs in one transaction. If it fails,
//! the transaction is rolled back, the workout tables are recreated and the
//! snapshot is restored; if that restore fails too, the result is
//! [`UpgradeError::DoubleFault`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm_migration::prelude::{Alias, SchemaManager, Table};
use tracing::{error, info, warn};

use crate::backup::{FileSnapshotStore, RestoreReport, SnapshotId, SnapshotManager, SnapshotStore};
use crate::config::LegacyTablePolicy;
use crate::entity::exercise::{self, DEFAULT_DIFFICULTY};
use crate::entity::legacy::{
    legacy_exercise, workout, workout_asset, LEGACY_EXERCISES, LEGACY_TABLES,
};
use crate::entity::{workout_exercise, workout_session, workout_set, workout_template, Exercise};
use crate::error::{BackupError, TransformError, UpgradeError};
use crate::migration::recreate_workout_tables;

/// States of the upgrade, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    NotNeeded,
    Detecting,
    BackingUp,
    Transforming,
    RollingBack,
    Committed,
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotNeeded => "not-needed",
            Self::Detecting => "detecting",
            Self::BackingUp => "backing-up",
            Self::Transforming => "transforming",
            Self::RollingBack => "rolling-back",
            Self::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Rows written by a committed upgrade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    pub exercises: usize,
    pub templates: usize,
    pub template_exercises: usize,
    pub sessions: usize,
    pub sets: usize,
}

/// How a successful [`LegacyUpgrade::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// No legacy tables, or the upgrade already ran.
    NotNeeded,
    /// Legacy data was transformed and committed.
    Committed {
        snapshot: SnapshotId,
        report: UpgradeReport,
    },
}

/// Upgrades a legacy database in place.
///
/// Must not run concurrently with itself, the importer or a restore.
#[derive(Debug, Clone)]
pub struct LegacyUpgrade<S = FileSnapshotStore> {
    conn: DatabaseConnection,
    snapshots: SnapshotManager<S>,
    policy: LegacyTablePolicy,
}

impl<S: SnapshotStore> LegacyUpgrade<S> {
    pub fn new(conn: DatabaseConnection, store: S) -> Self {
        Self {
            snapshots: SnapshotManager::new(conn.clone(), store),
            conn,
            policy: LegacyTablePolicy::default(),
        }
    }

    /// Sets what happens to the legacy tables after a successful upgrade.
    pub fn with_legacy_tables(mut self, policy: LegacyTablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether any legacy table exists in the live schema, detached or not.
    pub async fn has_old_schema(&self) -> Result<bool, DbErr> {
        let manager = SchemaManager::new(&self.conn);
        for table in LEGACY_TABLES {
            if manager.has_table(table).await? {
                return Ok(true);
            }
        }
        legacy_exercises_attached(&manager).await
    }

    /// Runs the upgrade to completion.
    ///
    /// # Errors
    ///
    /// * [`UpgradeError::ExercisesNotDetached`] if the legacy `exercises`
    ///   table still occupies the library table's name.
    /// * [`UpgradeError::Backup`] if the safety snapshot could not be taken.
    ///   Nothing has been written at that point.
    /// * [`UpgradeError::RolledBack`] if the transformation failed and the
    ///   snapshot was restored.
    /// * [`UpgradeError::DoubleFault`] if the transformation failed and the
    ///   restore failed as well.
    pub async fn run(&self) -> Result<UpgradeOutcome, UpgradeError> {
        enter(UpgradeState::Detecting);
        if !self.needs_upgrade().await? {
            enter(UpgradeState::NotNeeded);
            return Ok(UpgradeOutcome::NotNeeded);
        }

        enter(UpgradeState::BackingUp);
        let snapshot = self.snapshots.backup().await.map_err(UpgradeError::Backup)?;

        enter(UpgradeState::Transforming);
        match self.transform_and_commit().await {
            Ok(report) => {
                enter(UpgradeState::Committed);
                info!(?report, policy = ?self.policy, "legacy upgrade committed");
                Ok(UpgradeOutcome::Committed { snapshot, report })
            }
            Err(cause) => {
                enter(UpgradeState::RollingBack);
                error!(error = %cause, %snapshot, "legacy upgrade failed, restoring snapshot");

                match self.recover(&snapshot).await {
                    Ok(restored) => {
                        warn!(?restored, %snapshot, "pre-upgrade state restored");
                        Err(UpgradeError::RolledBack {
                            snapshot,
                            reason: cause.to_string(),
                        })
                    }
                    Err(restore) => {
                        error!(
                            upgrade = %cause,
                            restore = %restore,
                            %snapshot,
                            "restore after failed upgrade also failed"
                        );
                        Err(UpgradeError::DoubleFault {
                            snapshot,
                            upgrade: cause.to_string(),
                            restore: restore.to_string(),
                        })
                    }
                }
            }
        }
    }

    async fn needs_upgrade(&self) -> Result<bool, UpgradeError> {
        if legacy_exercises_attached(&SchemaManager::new(&self.conn))
            .await
            .map_err(UpgradeError::Detect)?
        {
            return Err(UpgradeError::ExercisesNotDetached);
        }
        if !self.has_old_schema().await.map_err(UpgradeError::Detect)? {
            info!("no legacy tables found");
            return Ok(false);
        }
        let existing = Exercise::find()
            .count(&self.conn)
            .await
            .map_err(UpgradeError::Detect)?;
        if existing > 0 {
            info!(exercises = existing, "legacy tables present but already upgraded");
            return Ok(false);
        }
        Ok(true)
    }

    async fn transform_and_commit(&self) -> Result<UpgradeReport, TransformError> {
        let txn = self.conn.begin().await?;
        match transform(&txn, self.policy).await {
            Ok(report) => {
                txn.commit().await?;
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "rollback of failed upgrade also failed");
                }
                Err(e)
            }
        }
    }

    async fn recover(&self, snapshot: &SnapshotId) -> Result<RestoreReport, BackupError> {
        recreate_workout_tables(&SchemaManager::new(&self.conn)).await?;
        self.snapshots.restore(snapshot).await
    }
}

/// Renames a legacy-shaped `exercises` table to
/// [`LEGACY_EXERCISES`](crate::entity::legacy::LEGACY_EXERCISES).
///
/// Returns whether a table was renamed. Does nothing on a fresh database or
/// one whose `exercises` table already has the current shape.
pub async fn detach_legacy_exercises(conn: &DatabaseConnection) -> Result<bool, DbErr> {
    let manager = SchemaManager::new(conn);
    if !legacy_exercises_attached(&manager).await? {
        return Ok(false);
    }
    manager
        .rename_table(
            Table::rename()
                .table(Alias::new("exercises"), Alias::new(LEGACY_EXERCISES))
                .to_owned(),
        )
        .await?;
    info!(to = LEGACY_EXERCISES, "detached legacy exercises table");
    Ok(true)
}

/// An `exercises` table with a `workout_id` column and no `category` is the
/// old embedded-exercise table.
async fn legacy_exercises_attached(manager: &SchemaManager<'_>) -> Result<bool, DbErr> {
    Ok(manager.has_table("exercises").await?
        && manager.has_column("exercises", "workout_id").await?
        && !manager.has_column("exercises", "category").await?)
}

fn enter(state: UpgradeState) {
    info!(%state, "legacy upgrade");
}

/// Copies the legacy rows into the current tables.
async fn transform(
    txn: &DatabaseTransaction,
    policy: LegacyTablePolicy,
) -> Result<UpgradeReport, TransformError> {
    let mut report = UpgradeReport::default();

    // title -> exercise id, None once the title turns out to be ambiguous
    let mut titles: HashMap<String, Option<i32>> = HashMap::new();

    for asset in workout_asset::Entity::find()
        .order_by_asc(workout_asset::Column::Id)
        .all(txn)
        .await?
    {
        let title = asset.title.unwrap_or_default();
        let row = exercise::ActiveModel {
            title: Set(title.clone()),
            description: Set(asset.description.unwrap_or_default()),
            category: Set(asset.category.unwrap_or_default()),
            difficulty: Set(asset
                .difficulty
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string())),
            instructions: Set(asset.instructions.unwrap_or_default()),
            benefits: Set(asset.benefits.unwrap_or_default()),
            muscles_worked: Set(asset.muscles_worked.unwrap_or_default()),
            variations: Set(asset.variations.unwrap_or_default()),
            image_path: Set(asset.image_path),
            animation_path: Set(asset.animation_path),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        titles
            .entry(title.trim().to_string())
            .and_modify(|id| *id = None)
            .or_insert(Some(row.id));
        report.exercises += 1;
    }

    for legacy in workout::Entity::find()
        .order_by_asc(workout::Column::Id)
        .all(txn)
        .await?
    {
        let date: DateTime<Utc> = legacy.date.map(|d| d.and_utc()).unwrap_or_else(Utc::now);

        let template = workout_template::ActiveModel {
            user_id: Set(legacy.user_id),
            title: Set(legacy.title.unwrap_or_default()),
            description: Set(legacy.description),
            created_at: Set(date),
            updated_at: Set(date),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        report.templates += 1;

        let entries = legacy_exercise::Entity::find()
            .filter(legacy_exercise::Column::WorkoutId.eq(legacy.id))
            .order_by_asc(legacy_exercise::Column::Id)
            .all(txn)
            .await?;

        let mut resolved = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            let exercise_id = entry
                .title
                .as_deref()
                .and_then(|title| titles.get(title.trim()).copied().flatten())
                .ok_or(TransformError::UnresolvedExercise {
                    workout_id: legacy.id,
                    entry_id: entry.id,
                })?;

            workout_exercise::ActiveModel {
                template_id: Set(template.id),
                exercise_id: Set(exercise_id),
                position: Set(position as i32),
                notes: Set(entry.description),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            report.template_exercises += 1;
            resolved.push(exercise_id);
        }

        if legacy.completed != Some(true) {
            continue;
        }

        let session = workout_session::ActiveModel {
            template_id: Set(Some(template.id)),
            user_id: Set(legacy.user_id),
            start_time: Set(date),
            end_time: Set(Some(date)),
            completed: Set(true),
            created_at: Set(date),
            updated_at: Set(date),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        report.sessions += 1;

        // the old schema recorded no per-set values: one completed set per entry
        for exercise_id in resolved {
            workout_set::ActiveModel {
                session_id: Set(session.id),
                exercise_id: Set(exercise_id),
                set_number: Set(1),
                completed: Set(true),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            report.sets += 1;
        }
    }

    if policy == LegacyTablePolicy::Drop {
        let manager = SchemaManager::new(txn);
        for table in LEGACY_TABLES {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        info!(tables = ?LEGACY_TABLES, "dropped legacy tables");
    }

    Ok(report)
}
