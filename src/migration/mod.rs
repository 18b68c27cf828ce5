//! Schema migrations for the current table layout.
//!
//! [`Migrator`] creates the user tables and the workout tables with
//! `IF NOT EXISTS`, so it can run against a fresh database as well as one
//! that still carries the legacy tables next to a shared `users` table.
//! On such a database the legacy `exercises` table has to be detached
//! first; see [`crate::upgrade::detach_legacy_exercises`].

pub use sea_orm_migration::prelude::*;

mod legacy_tables;
mod m20240101_000001_create_users;
mod m20240101_000002_create_workout_tables;

pub(crate) use legacy_tables::create_legacy_tables;
pub(crate) use m20240101_000002_create_workout_tables::recreate_workout_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Keep our bookkeeping apart from anything else sharing the database
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("workout_tracker_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_workout_tables::Migration),
        ]
    }
}
