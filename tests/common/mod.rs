#![allow(dead_code)]

use std::path::Path;

use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Set,
};
use sea_orm_migration::MigratorTrait;
use workout_tracker_store::entity::exercise;
use workout_tracker_store::Migrator;

/// A migrated in-memory SQLite database.
///
/// One connection only: every pooled connection to `sqlite::memory:` would
/// otherwise see its own empty database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let conn = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&conn, None)
        .await
        .expect("Failed to run migrations");
    conn
}

pub async fn seed_exercise(conn: &DatabaseConnection, title: &str, category: &str) -> exercise::Model {
    exercise::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("{title} description")),
        category: Set(category.to_string()),
        difficulty: Set("Beginner".to_string()),
        instructions: Set(String::new()),
        benefits: Set(String::new()),
        muscles_worked: Set(String::new()),
        variations: Set(String::new()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("Failed to insert exercise")
}

/// Writes `<root>/<category>/<exercise>/<file>`.
pub fn write_asset(root: &Path, category: &str, exercise: &str, file: &str, contents: &str) {
    let dir = root.join(category).join(exercise);
    std::fs::create_dir_all(&dir).expect("Failed to create asset dir");
    std::fs::write(dir.join(file), contents).expect("Failed to write asset file");
}

/// An in-memory database holding only the old schema, exactly as the old
/// service created it. Not migrated.
pub async fn open_legacy_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    create_legacy_tables(&conn).await;
    conn
}

/// The old schema's DDL, including its own `exercises` table.
pub async fn create_legacy_tables(conn: &DatabaseConnection) {
    conn.execute_unprepared(
        "CREATE TABLE users (
            id INTEGER NOT NULL,
            email VARCHAR,
            username VARCHAR,
            hashed_password VARCHAR,
            is_active BOOLEAN,
            PRIMARY KEY (id)
        );
        CREATE UNIQUE INDEX ix_users_email ON users (email);
        CREATE UNIQUE INDEX ix_users_username ON users (username);
        CREATE INDEX ix_users_id ON users (id);
        CREATE TABLE workout_assets (
            id INTEGER NOT NULL,
            title VARCHAR,
            description TEXT,
            category VARCHAR,
            difficulty VARCHAR,
            instructions TEXT,
            benefits TEXT,
            muscles_worked TEXT,
            variations TEXT,
            image_path VARCHAR,
            animation_path VARCHAR,
            PRIMARY KEY (id)
        );
        CREATE INDEX ix_workout_assets_id ON workout_assets (id);
        CREATE TABLE accountability_partners (
            user_id INTEGER NOT NULL,
            partner_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, partner_id),
            FOREIGN KEY(user_id) REFERENCES users (id),
            FOREIGN KEY(partner_id) REFERENCES users (id)
        );
        CREATE TABLE workouts (
            id INTEGER NOT NULL,
            title VARCHAR,
            description VARCHAR,
            date DATETIME,
            completed BOOLEAN,
            user_id INTEGER,
            PRIMARY KEY (id),
            FOREIGN KEY(user_id) REFERENCES users (id)
        );
        CREATE INDEX ix_workouts_title ON workouts (title);
        CREATE INDEX ix_workouts_id ON workouts (id);
        CREATE TABLE exercise_assets (
            id INTEGER NOT NULL,
            title VARCHAR,
            instructions VARCHAR,
            benefits VARCHAR,
            image_paths VARCHAR,
            workout_id INTEGER,
            PRIMARY KEY (id),
            FOREIGN KEY(workout_id) REFERENCES workout_assets (id)
        );
        CREATE INDEX ix_exercise_assets_title ON exercise_assets (title);
        CREATE INDEX ix_exercise_assets_id ON exercise_assets (id);
        CREATE TABLE exercises (
            id INTEGER NOT NULL,
            title VARCHAR,
            description VARCHAR,
            workout_id INTEGER,
            PRIMARY KEY (id),
            FOREIGN KEY(workout_id) REFERENCES workouts (id)
        );
        CREATE INDEX ix_exercises_title ON exercises (title);
        CREATE INDEX ix_exercises_id ON exercises (id);",
    )
    .await
    .expect("Failed to create legacy tables");
}

/// One user, two assets, a completed workout using both and an open one
/// using one.
pub async fn seed_legacy_data(conn: &DatabaseConnection) {
    conn.execute_unprepared(
        "INSERT INTO users (id, email, username, hashed_password, is_active)
            VALUES (1, 'ana@example.com', 'ana', 'hash', 1);
        INSERT INTO workout_assets (id, title, description, category, difficulty, instructions)
            VALUES (1, 'Squat', 'Sit back', 'Strength', 'Intermediate', '1. Stand'),
                   (2, 'Push Up', 'Plank and press', 'Strength', NULL, NULL);
        INSERT INTO exercise_assets (id, title, image_paths, workout_id)
            VALUES (1, 'Wide Squat', '[\"/assets/wide.jpg\"]', 1);
        INSERT INTO workouts (id, title, description, date, completed, user_id)
            VALUES (1, 'Leg Day', 'Heavy', '2024-01-15 07:30:00.000000', 1, 1),
                   (2, 'Upper', NULL, '2024-01-16 18:00:00.000000', 0, 1);
        INSERT INTO exercises (id, title, description, workout_id)
            VALUES (1, 'Squat', 'Heavy triples', 1),
                   (2, 'Push Up', NULL, 1),
                   (3, 'Push Up', 'To failure', 2);",
    )
    .await
    .expect("Failed to seed legacy data");
}

/// A seeded old-schema database brought to the current schema, with the
/// legacy rows still untransformed.
pub async fn migrated_legacy_db() -> DatabaseConnection {
    let conn = open_legacy_db().await;
    seed_legacy_data(&conn).await;
    workout_tracker_store::bootstrap::migrate(&conn)
        .await
        .expect("Failed to migrate legacy database");
    conn
}
