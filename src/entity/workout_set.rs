//! Tracked set entity model.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Actual values recorded for one `(exercise, set_number)` pair of a session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_sets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub session_id: i32,
    pub exercise_id: i32,
    pub set_number: i32,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    pub completed: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workout_session::Entity",
        from = "Column::SessionId",
        to = "super::workout_session::Column::Id",
        on_delete = "Cascade"
    )]
    WorkoutSession,
    #[sea_orm(
        belongs_to = "super::exercise::Entity",
        from = "Column::ExerciseId",
        to = "super::exercise::Column::Id",
        on_delete = "Restrict"
    )]
    Exercise,
}

impl Related<super::workout_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutSession.def()
    }
}

impl Related<super::exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exercise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
