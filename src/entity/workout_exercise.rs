//! Template entry entity model.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One prescribed exercise inside a workout template.
///
/// Entries are ordered by `position` within their template. The exercise
/// reference is `ON DELETE RESTRICT`: an exercise that is still planned
/// somewhere cannot be deleted out from under the template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_exercises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub template_id: i32,
    pub exercise_id: i32,
    pub position: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    /// Duration in seconds.
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workout_template::Entity",
        from = "Column::TemplateId",
        to = "super::workout_template::Column::Id",
        on_delete = "Cascade"
    )]
    WorkoutTemplate,
    #[sea_orm(
        belongs_to = "super::exercise::Entity",
        from = "Column::ExerciseId",
        to = "super::exercise::Column::Id",
        on_delete = "Restrict"
    )]
    Exercise,
}

impl Related<super::workout_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutTemplate.def()
    }
}

impl Related<super::exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exercise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
