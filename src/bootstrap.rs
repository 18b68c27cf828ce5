//! Startup sequence run once before the service accepts requests.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::backup::FileSnapshotStore;
use crate::entity::Exercise;
use crate::error::StartupError;
use crate::importer::{AssetImporter, ImportReport};
use crate::migration::Migrator;
use crate::upgrade::{detach_legacy_exercises, LegacyUpgrade, UpgradeOutcome};
use crate::Config;

/// What [`prepare`] did.
#[derive(Debug)]
pub struct StartupReport {
    pub upgrade: UpgradeOutcome,
    /// `None` when the library already had exercises and import was skipped.
    pub import: Option<ImportReport>,
}

/// Applies pending schema migrations.
///
/// A legacy `exercises` table is detached first so the migrator can create
/// the current library table under that name.
pub async fn migrate(conn: &DatabaseConnection) -> Result<(), StartupError> {
    detach_legacy_exercises(conn)
        .await
        .map_err(StartupError::Schema)?;
    Migrator::up(conn, None).await.map_err(StartupError::Schema)?;
    info!("schema migrations applied");
    Ok(())
}

/// Brings the database up to date.
///
/// 1. Applies pending schema migrations (see [`migrate`]).
/// 2. Runs the legacy upgrade if legacy tables are present.
/// 3. Imports the exercise library from `config.assets_dir` if it is empty.
///
/// Every failure is fatal for startup. An upgrade that rolled back leaves
/// the database as it was and is reported as [`StartupError::Upgrade`].
pub async fn prepare(
    conn: &DatabaseConnection,
    config: &Config,
) -> Result<StartupReport, StartupError> {
    migrate(conn).await?;

    let upgrade = LegacyUpgrade::new(conn.clone(), FileSnapshotStore::new(&config.backup_dir))
        .with_legacy_tables(config.legacy_tables)
        .run()
        .await?;

    let existing = Exercise::find()
        .count(conn)
        .await
        .map_err(StartupError::Database)?;
    let import = if existing == 0 {
        info!(root = %config.assets_dir.display(), "exercise library empty, importing");
        Some(
            AssetImporter::new(conn.clone(), &config.assets_dir)
                .import()
                .await?,
        )
    } else {
        info!(exercises = existing, "exercise library present, skipping import");
        None
    };

    Ok(StartupReport { upgrade, import })
}
