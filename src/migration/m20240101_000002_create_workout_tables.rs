use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_workout_tables(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_workout_tables(manager).await
    }
}

/// Drops and recreates every workout table, leaving `users` and any legacy
/// tables untouched.
pub(crate) async fn recreate_workout_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    drop_workout_tables(manager).await?;
    create_workout_tables(manager).await
}

async fn drop_workout_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    // children first so foreign keys never dangle
    for table in [
        WorkoutSets::Table.into_iden(),
        WorkoutSessions::Table.into_iden(),
        WorkoutExercises::Table.into_iden(),
        WorkoutTemplates::Table.into_iden(),
        Exercises::Table.into_iden(),
    ] {
        manager
            .drop_table(Table::drop().table(table).if_exists().to_owned())
            .await?;
    }
    Ok(())
}

async fn create_workout_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Exercises::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Exercises::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Exercises::Title).string().not_null())
                .col(ColumnDef::new(Exercises::Description).text().not_null())
                .col(ColumnDef::new(Exercises::Category).string().not_null())
                .col(ColumnDef::new(Exercises::Difficulty).string().not_null())
                .col(ColumnDef::new(Exercises::Instructions).text().not_null())
                .col(ColumnDef::new(Exercises::Benefits).text().not_null())
                .col(ColumnDef::new(Exercises::MusclesWorked).text().not_null())
                .col(ColumnDef::new(Exercises::Variations).text().not_null())
                .col(ColumnDef::new(Exercises::ImagePath).string().null())
                .col(ColumnDef::new(Exercises::AnimationPath).string().null())
                .col(
                    ColumnDef::new(Exercises::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name("idx_exercises_category")
                .table(Exercises::Table)
                .col(Exercises::Category)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(WorkoutTemplates::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(WorkoutTemplates::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(WorkoutTemplates::UserId).integer().null())
                .col(ColumnDef::new(WorkoutTemplates::Title).string().not_null())
                .col(ColumnDef::new(WorkoutTemplates::Description).text().null())
                .col(ColumnDef::new(WorkoutTemplates::Difficulty).string().null())
                .col(
                    ColumnDef::new(WorkoutTemplates::EstimatedDuration)
                        .integer()
                        .null(),
                )
                .col(
                    ColumnDef::new(WorkoutTemplates::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(WorkoutTemplates::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_templates_user")
                        .from(WorkoutTemplates::Table, WorkoutTemplates::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(WorkoutExercises::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(WorkoutExercises::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(WorkoutExercises::TemplateId)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(WorkoutExercises::ExerciseId)
                        .integer()
                        .not_null(),
                )
                .col(ColumnDef::new(WorkoutExercises::Position).integer().not_null())
                .col(ColumnDef::new(WorkoutExercises::Sets).integer().null())
                .col(ColumnDef::new(WorkoutExercises::Reps).integer().null())
                .col(ColumnDef::new(WorkoutExercises::Weight).double().null())
                .col(ColumnDef::new(WorkoutExercises::Duration).integer().null())
                .col(ColumnDef::new(WorkoutExercises::Distance).double().null())
                .col(ColumnDef::new(WorkoutExercises::Notes).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_exercises_template")
                        .from(WorkoutExercises::Table, WorkoutExercises::TemplateId)
                        .to(WorkoutTemplates::Table, WorkoutTemplates::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_exercises_exercise")
                        .from(WorkoutExercises::Table, WorkoutExercises::ExerciseId)
                        .to(Exercises::Table, Exercises::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name("idx_workout_exercises_template")
                .table(WorkoutExercises::Table)
                .col(WorkoutExercises::TemplateId)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(WorkoutSessions::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(WorkoutSessions::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(WorkoutSessions::TemplateId).integer().null())
                .col(ColumnDef::new(WorkoutSessions::UserId).integer().null())
                .col(
                    ColumnDef::new(WorkoutSessions::StartTime)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(WorkoutSessions::EndTime)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(WorkoutSessions::Completed)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(WorkoutSessions::Notes).text().null())
                .col(
                    ColumnDef::new(WorkoutSessions::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(WorkoutSessions::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_sessions_template")
                        .from(WorkoutSessions::Table, WorkoutSessions::TemplateId)
                        .to(WorkoutTemplates::Table, WorkoutTemplates::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_sessions_user")
                        .from(WorkoutSessions::Table, WorkoutSessions::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(WorkoutSets::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(WorkoutSets::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(WorkoutSets::SessionId).integer().not_null())
                .col(ColumnDef::new(WorkoutSets::ExerciseId).integer().not_null())
                .col(ColumnDef::new(WorkoutSets::SetNumber).integer().not_null())
                .col(ColumnDef::new(WorkoutSets::Reps).integer().null())
                .col(ColumnDef::new(WorkoutSets::Weight).double().null())
                .col(ColumnDef::new(WorkoutSets::Duration).integer().null())
                .col(ColumnDef::new(WorkoutSets::Distance).double().null())
                .col(
                    ColumnDef::new(WorkoutSets::Completed)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(WorkoutSets::Notes).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_sets_session")
                        .from(WorkoutSets::Table, WorkoutSets::SessionId)
                        .to(WorkoutSessions::Table, WorkoutSessions::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_workout_sets_exercise")
                        .from(WorkoutSets::Table, WorkoutSets::ExerciseId)
                        .to(Exercises::Table, Exercises::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name("idx_workout_sets_session")
                .table(WorkoutSets::Table)
                .col(WorkoutSets::SessionId)
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Exercises {
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
    CreatedAt,
}

#[derive(DeriveIden)]
enum WorkoutTemplates {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Difficulty,
    EstimatedDuration,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkoutExercises {
    Table,
    Id,
    TemplateId,
    ExerciseId,
    Position,
    Sets,
    Reps,
    Weight,
    Duration,
    Distance,
    Notes,
}

#[derive(DeriveIden)]
enum WorkoutSessions {
    Table,
    Id,
    TemplateId,
    UserId,
    StartTime,
    EndTime,
    Completed,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkoutSets {
    Table,
    Id,
    SessionId,
    ExerciseId,
    SetNumber,
    Reps,
    Weight,
    Duration,
    Distance,
    Completed,
    Notes,
}
