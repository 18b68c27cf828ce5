mod common;

use common::{seed_exercise, setup_db, write_asset};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use workout_tracker_store::entity::{exercise, Exercise};
use workout_tracker_store::importer::AssetImporter;
use workout_tracker_store::{ImportError, NewTemplate, NewTemplateExercise, WorkoutStore};

const SQUAT: &str = r#"{
    "title": "Barbell Squat",
    "content": [
        {"type": "section", "title": "Barbell Squat Instructions",
         "content": {"type": "steps", "items": ["Unrack", "Sit back", "Drive up"]}},
        {"type": "section", "title": "Barbell Squat Benefits",
         "content": {"type": "list", "items": ["Leg strength"]}}
    ]
}"#;

const PLANK: &str = r#"{"title": "Plank", "difficulty": "Beginner", "description": "Hold it"}"#;

fn asset_tree() -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    write_asset(root.path(), "Strength_Exercises", "Squat", "content.json", SQUAT);
    write_asset(root.path(), "Strength_Exercises", "Squat", "squat front.jpg", "");
    write_asset(root.path(), "Strength_Exercises", "Squat", "squat.gif", "");
    write_asset(root.path(), "Strength_Exercises", "Broken", "content.json", "{not json");
    write_asset(root.path(), "Core_Exercises", "Plank", "metadata.json", PLANK);
    std::fs::create_dir_all(root.path().join("Core_Exercises").join("Empty"))
        .expect("Failed to create empty exercise dir");
    root
}

#[tokio::test]
async fn malformed_directories_are_skipped_not_fatal() {
    let conn = setup_db().await;
    let root = asset_tree();

    let report = AssetImporter::new(conn.clone(), root.path())
        .import()
        .await
        .unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(Exercise::find().count(&conn).await.unwrap(), 2);
}

#[tokio::test]
async fn imported_rows_carry_parsed_fields() {
    let conn = setup_db().await;
    let root = asset_tree();
    AssetImporter::new(conn.clone(), root.path())
        .import()
        .await
        .unwrap();

    let rows = Exercise::find()
        .order_by_asc(exercise::Column::Title)
        .all(&conn)
        .await
        .unwrap();

    let squat = &rows[0];
    assert_eq!(squat.title, "Barbell Squat");
    assert_eq!(squat.category, "Strength");
    assert_eq!(squat.difficulty, "Intermediate");
    assert_eq!(squat.instructions, "1. Unrack\n2. Sit back\n3. Drive up");
    assert_eq!(squat.benefits, "• Leg strength");
    assert_eq!(squat.muscles_worked, "");
    assert_eq!(
        squat.image_path.as_deref(),
        Some("/assets/Strength_Exercises/Squat/squat-front.jpg")
    );
    assert_eq!(
        squat.animation_path.as_deref(),
        Some("/assets/Strength_Exercises/Squat/squat.gif")
    );

    let plank = &rows[1];
    assert_eq!(plank.title, "Plank");
    assert_eq!(plank.category, "Core");
    assert_eq!(plank.difficulty, "Beginner");
    assert_eq!(plank.description, "Hold it");
    assert_eq!(plank.image_path, None);
}

#[tokio::test]
async fn reimport_replaces_the_library() {
    let conn = setup_db().await;
    seed_exercise(&conn, "Stale", "Old").await;
    let root = asset_tree();
    let importer = AssetImporter::new(conn.clone(), root.path());

    importer.import().await.unwrap();
    importer.import().await.unwrap();

    let titles: Vec<String> = Exercise::find()
        .all(&conn)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(!titles.contains(&"Stale".to_string()));
}

#[tokio::test]
async fn missing_root_fails_without_clearing() {
    let conn = setup_db().await;
    seed_exercise(&conn, "Keep Me", "Core").await;
    let dir = tempfile::tempdir().unwrap();

    let err = AssetImporter::new(conn.clone(), dir.path().join("nope"))
        .import()
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::MissingRoot(_)));
    assert_eq!(Exercise::find().count(&conn).await.unwrap(), 1);
}

#[tokio::test]
async fn referenced_exercises_block_the_clear_step() {
    let conn = setup_db().await;
    let squat = seed_exercise(&conn, "Squat", "Strength").await;
    WorkoutStore::new(conn.clone())
        .create_template(NewTemplate {
            title: "Legs".into(),
            exercises: vec![NewTemplateExercise {
                exercise_id: squat.id,
                ..Default::default()
            }],
            ..Default::default()
        })
        .await
        .unwrap();
    let root = asset_tree();

    let err = AssetImporter::new(conn.clone(), root.path())
        .import()
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Clear(_)));
    assert_eq!(Exercise::find().count(&conn).await.unwrap(), 1);
}
