mod common;

use chrono::Utc;
use common::{seed_exercise, setup_db};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use workout_tracker_store::backup::{
    clear_workout_data, FileSnapshotStore, SnapshotId, SnapshotManager, SnapshotStore,
    Snapshot, TemplateSnapshot, SNAPSHOT_VERSION,
};
use workout_tracker_store::entity::{
    workout_exercise, workout_template, Exercise, WorkoutExercise, WorkoutSession, WorkoutSet,
    WorkoutTemplate,
};
use workout_tracker_store::{BackupError, NewSet, NewTemplate, NewTemplateExercise, WorkoutStore};

async fn populate(conn: &DatabaseConnection) {
    let squat = seed_exercise(conn, "Squat", "Strength").await;
    let plank = seed_exercise(conn, "Plank", "Core").await;
    let store = WorkoutStore::new(conn.clone());

    let template = store
        .create_template(NewTemplate {
            title: "Full Body".into(),
            description: Some("Twice a week".into()),
            estimated_duration: Some(45),
            exercises: vec![
                NewTemplateExercise {
                    exercise_id: squat.id,
                    sets: Some(3),
                    reps: Some(5),
                    weight: Some(102.5),
                    ..Default::default()
                },
                NewTemplateExercise {
                    exercise_id: plank.id,
                    duration: Some(60),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
        .await
        .unwrap();

    let session = store.start_session(template.template.id).await.unwrap();
    for exercise_id in [squat.id, squat.id, plank.id] {
        store
            .record_set(
                session.id,
                NewSet {
                    exercise_id,
                    set_number: None,
                    reps: Some(5),
                    weight: None,
                    duration: None,
                    distance: None,
                    completed: true,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }
    store
        .complete_session(session.id, Some("felt strong".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn backup_clear_restore_round_trip() {
    let conn = setup_db().await;
    populate(&conn).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = SnapshotManager::new(conn.clone(), FileSnapshotStore::new(dir.path()));

    let before = Snapshot::capture(&conn).await.unwrap();
    let id = manager.backup().await.unwrap();
    assert!(manager.store().path_for(&id).exists());
    assert_eq!(manager.latest().await.unwrap(), Some(id.clone()));

    clear_workout_data(&conn).await.unwrap();
    assert_eq!(Exercise::find().count(&conn).await.unwrap(), 0);
    assert_eq!(WorkoutSet::find().count(&conn).await.unwrap(), 0);

    let report = manager.restore(&id).await.unwrap();
    assert_eq!(report.exercises, 2);
    assert_eq!(report.templates, 1);
    assert_eq!(report.template_exercises, 2);
    assert_eq!(report.sessions, 1);
    assert_eq!(report.sets, 3);

    let after = Snapshot::capture(&conn).await.unwrap();
    assert_eq!(after.exercises.len(), before.exercises.len());
    for (old, new) in before.exercises.iter().zip(&after.exercises) {
        assert_eq!(new.title, old.title);
        assert_eq!(new.category, old.category);
        assert_eq!(new.created_at, old.created_at);
    }

    let (old, new) = (&before.templates[0], &after.templates[0]);
    assert_eq!(new.template.title, old.template.title);
    assert_eq!(new.template.description, old.template.description);
    assert_eq!(new.template.created_at, old.template.created_at);
    assert_eq!(new.template.updated_at, old.template.updated_at);
    assert_eq!(new.exercises.len(), old.exercises.len());
    assert_eq!(new.exercises[0].weight, Some(102.5));
    assert_eq!(new.exercises[1].duration, Some(60));

    let (old, new) = (&before.sessions[0], &after.sessions[0]);
    assert_eq!(new.session.template_id, Some(after.templates[0].template.id));
    assert!(new.session.completed);
    assert_eq!(new.session.notes.as_deref(), Some("felt strong"));
    assert_eq!(new.session.end_time, old.session.end_time);
    assert_eq!(new.sets.len(), old.sets.len());
    let numbers: Vec<i32> = new.sets.iter().map(|s| s.set_number).collect();
    // ordered by set number within the session
    assert_eq!(numbers, vec![1, 1, 2]);
}

#[tokio::test]
async fn restore_is_all_or_nothing() {
    let conn = setup_db().await;
    let exercise = seed_exercise(&conn, "Row", "Back").await;
    let template = workout_template::Model {
        id: 7,
        user_id: None,
        title: "Pull".into(),
        description: None,
        difficulty: None,
        estimated_duration: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let entry = |id, exercise_id| workout_exercise::Model {
        id,
        template_id: 7,
        exercise_id,
        position: 0,
        sets: None,
        reps: None,
        weight: None,
        duration: None,
        distance: None,
        notes: None,
    };
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        created_at: Utc::now(),
        exercises: vec![exercise.clone()],
        templates: vec![TemplateSnapshot {
            template,
            // the second entry points at an exercise the snapshot does not hold
            exercises: vec![entry(1, exercise.id), entry(2, 999)],
        }],
        sessions: Vec::new(),
        legacy: None,
    };
    clear_workout_data(&conn).await.unwrap();

    let err = workout_tracker_store::backup::restore_snapshot(&conn, &snapshot)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BackupError::UnknownReference {
            kind: "exercise",
            id: 999
        }
    ));
    assert_eq!(Exercise::find().count(&conn).await.unwrap(), 0);
    assert_eq!(WorkoutTemplate::find().count(&conn).await.unwrap(), 0);
    assert_eq!(WorkoutExercise::find().count(&conn).await.unwrap(), 0);
    assert_eq!(WorkoutSession::find().count(&conn).await.unwrap(), 0);
}

#[tokio::test]
async fn snapshot_files_are_listed_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path());
    assert!(store.list().await.unwrap().is_empty());

    let mut snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        created_at: Utc::now(),
        exercises: Vec::new(),
        templates: Vec::new(),
        sessions: Vec::new(),
        legacy: None,
    };
    let first = store.save(&snapshot).await.unwrap();
    snapshot.created_at += chrono::Duration::seconds(1);
    let second = store.save(&snapshot).await.unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.list().await.unwrap(), vec![first.clone(), second]);
    assert_eq!(store.load(&first).await.unwrap().exercises.len(), 0);
}

#[tokio::test]
async fn unknown_and_malformed_snapshots_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path());

    let missing = SnapshotId::new("20200101_000000_000000");
    assert!(matches!(
        store.load(&missing).await,
        Err(BackupError::NotFound(id)) if id == missing
    ));

    let garbled = SnapshotId::new("20200101_000000_000001");
    std::fs::write(store.path_for(&garbled), "{").unwrap();
    assert!(matches!(
        store.load(&garbled).await,
        Err(BackupError::Decode { .. })
    ));

    let future = SnapshotId::new("20200101_000000_000002");
    std::fs::write(
        store.path_for(&future),
        r#"{"version": 99, "created_at": "2020-01-01T00:00:00Z",
            "exercises": [], "templates": [], "sessions": []}"#,
    )
    .unwrap();
    assert!(matches!(
        store.load(&future).await,
        Err(BackupError::UnsupportedVersion(99))
    ));
}
