use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

/// Creates any missing legacy table in the shape the old schema used, so a
/// snapshot carrying legacy rows can be put back after the tables were
/// dropped. Not part of [`super::Migrator`].
pub(crate) async fn create_legacy_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(WorkoutAssets::Table)
                .if_not_exists()
                .col(ColumnDef::new(WorkoutAssets::Id).integer().not_null().primary_key())
                .col(ColumnDef::new(WorkoutAssets::Title).string().null())
                .col(ColumnDef::new(WorkoutAssets::Description).text().null())
                .col(ColumnDef::new(WorkoutAssets::Category).string().null())
                .col(ColumnDef::new(WorkoutAssets::Difficulty).string().null())
                .col(ColumnDef::new(WorkoutAssets::Instructions).text().null())
                .col(ColumnDef::new(WorkoutAssets::Benefits).text().null())
                .col(ColumnDef::new(WorkoutAssets::MusclesWorked).text().null())
                .col(ColumnDef::new(WorkoutAssets::Variations).text().null())
                .col(ColumnDef::new(WorkoutAssets::ImagePath).string().null())
                .col(ColumnDef::new(WorkoutAssets::AnimationPath).string().null())
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(ExerciseAssets::Table)
                .if_not_exists()
                .col(ColumnDef::new(ExerciseAssets::Id).integer().not_null().primary_key())
                .col(ColumnDef::new(ExerciseAssets::Title).string().null())
                .col(ColumnDef::new(ExerciseAssets::Instructions).string().null())
                .col(ColumnDef::new(ExerciseAssets::Benefits).string().null())
                .col(ColumnDef::new(ExerciseAssets::ImagePaths).string().null())
                .col(ColumnDef::new(ExerciseAssets::WorkoutId).integer().null())
                .foreign_key(
                    ForeignKey::create()
                        .from(ExerciseAssets::Table, ExerciseAssets::WorkoutId)
                        .to(WorkoutAssets::Table, WorkoutAssets::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Workouts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Workouts::Id).integer().not_null().primary_key())
                .col(ColumnDef::new(Workouts::Title).string().null())
                .col(ColumnDef::new(Workouts::Description).string().null())
                .col(ColumnDef::new(Workouts::Date).date_time().null())
                .col(ColumnDef::new(Workouts::Completed).boolean().null())
                .col(ColumnDef::new(Workouts::UserId).integer().null())
                .foreign_key(
                    ForeignKey::create()
                        .from(Workouts::Table, Workouts::UserId)
                        .to(Users::Table, Users::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(LegacyExercises::Table)
                .if_not_exists()
                .col(ColumnDef::new(LegacyExercises::Id).integer().not_null().primary_key())
                .col(ColumnDef::new(LegacyExercises::Title).string().null())
                .col(ColumnDef::new(LegacyExercises::Description).string().null())
                .col(ColumnDef::new(LegacyExercises::WorkoutId).integer().null())
                .foreign_key(
                    ForeignKey::create()
                        .from(LegacyExercises::Table, LegacyExercises::WorkoutId)
                        .to(Workouts::Table, Workouts::Id),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum WorkoutAssets {
    Table,
    Id,
    Title,
    Description,
    Category,
    Difficulty,
    Instructions,
    Benefits,
    MusclesWorked,
    Variations,
    ImagePath,
    AnimationPath,
}

#[derive(DeriveIden)]
enum ExerciseAssets {
    Table,
    Id,
    Title,
    Instructions,
    Benefits,
    ImagePaths,
    WorkoutId,
}

#[derive(DeriveIden)]
enum Workouts {
    Table,
    Id,
    Title,
    Description,
    Date,
    Completed,
    UserId,
}

#[derive(DeriveIden)]
enum LegacyExercises {
    Table,
    Id,
    Title,
    Description,
    WorkoutId,
}
