mod common;

use common::{open_legacy_db, seed_legacy_data, setup_db, write_asset};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use sea_orm_migration::SchemaManager;
use workout_tracker_store::entity::legacy::legacy_exercise;
use workout_tracker_store::entity::{exercise, Exercise, WorkoutSession, WorkoutSet};
use workout_tracker_store::upgrade::{UpgradeOutcome, UpgradeReport};
use workout_tracker_store::{bootstrap, Config, ImportError, StartupError, WorkoutStore};

fn config(assets: &std::path::Path, backups: &std::path::Path) -> Config {
    let mut config = Config::new("sqlite::memory:");
    config.assets_dir = assets.to_path_buf();
    config.backup_dir = backups.to_path_buf();
    config
}

#[tokio::test]
async fn first_start_imports_and_later_starts_skip() {
    let conn = setup_db().await;
    let assets = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    write_asset(
        assets.path(),
        "Cardio_Exercises",
        "Burpee",
        "content.json",
        r#"{"title": "Burpee"}"#,
    );
    let config = config(assets.path(), backups.path());

    let first = bootstrap::prepare(&conn, &config).await.unwrap();
    assert_eq!(first.upgrade, UpgradeOutcome::NotNeeded);
    assert_eq!(first.import.map(|r| r.imported), Some(1));

    let second = bootstrap::prepare(&conn, &config).await.unwrap();
    assert!(second.import.is_none());

    let store = WorkoutStore::new(conn);
    assert_eq!(store.exercise_count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_assets_on_first_start_is_fatal() {
    let conn = setup_db().await;
    let backups = tempfile::tempdir().unwrap();
    let config = config(&backups.path().join("missing"), backups.path());

    let err = bootstrap::prepare(&conn, &config).await.unwrap_err();
    assert!(matches!(
        err,
        StartupError::Import(ImportError::MissingRoot(_))
    ));
}

#[tokio::test]
async fn upgraded_library_is_not_reimported() {
    let conn = open_legacy_db().await;
    seed_legacy_data(&conn).await;
    let backups = tempfile::tempdir().unwrap();
    // no asset tree at all: the upgraded exercises are enough
    let config = config(&backups.path().join("missing"), backups.path());

    let report = bootstrap::prepare(&conn, &config).await.unwrap();
    assert!(matches!(report.upgrade, UpgradeOutcome::Committed { .. }));
    assert!(report.import.is_none());
    assert_eq!(
        WorkoutStore::new(conn).exercise_count().await.unwrap(),
        2
    );
}

#[tokio::test]
async fn old_service_database_upgrades_on_first_start() {
    let conn = open_legacy_db().await;
    seed_legacy_data(&conn).await;
    let backups = tempfile::tempdir().unwrap();
    let config = config(&backups.path().join("missing"), backups.path());

    let startup = bootstrap::prepare(&conn, &config).await.unwrap();
    let UpgradeOutcome::Committed { snapshot, report } = &startup.upgrade else {
        panic!("expected a committed upgrade, got {:?}", startup.upgrade);
    };
    assert!(startup.import.is_none());
    assert_eq!(
        *report,
        UpgradeReport {
            exercises: 2,
            templates: 2,
            template_exercises: 3,
            sessions: 1,
            sets: 2,
        }
    );
    assert!(backups
        .path()
        .join(format!("backup_{snapshot}.json"))
        .exists());

    let titles: Vec<String> = Exercise::find()
        .order_by_asc(exercise::Column::Id)
        .all(&conn)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["Squat", "Push Up"]);
    assert_eq!(WorkoutSession::find().count(&conn).await.unwrap(), 1);
    assert_eq!(WorkoutSet::find().count(&conn).await.unwrap(), 2);

    // the old embedded-exercise rows are kept under their new name
    assert!(SchemaManager::new(&conn)
        .has_table("legacy_exercises")
        .await
        .unwrap());
    assert_eq!(legacy_exercise::Entity::find().count(&conn).await.unwrap(), 3);

    // the old users table is reused as is
    let store = WorkoutStore::new(conn.clone());
    assert_eq!(store.get_user(1).await.unwrap().username, "ana");

    let again = bootstrap::prepare(&conn, &config).await.unwrap();
    assert_eq!(again.upgrade, UpgradeOutcome::NotNeeded);
    assert!(again.import.is_none());
}
