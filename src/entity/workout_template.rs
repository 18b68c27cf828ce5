//! Workout template entity model.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// A reusable, user-authored workout plan.
///
/// A template exclusively owns its [`super::workout_exercise`] rows; deleting
/// the template cascades to them. Sessions started from a template keep their
/// history when the template goes away (`template_id` is set to NULL).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning user. Optional because upgraded legacy workouts may have none.
    pub user_id: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub difficulty: Option<String>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::workout_exercise::Entity")]
    WorkoutExercise,
    #[sea_orm(has_many = "super::workout_session::Entity")]
    WorkoutSession,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::workout_exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutExercise.def()
    }
}

impl Related<super::workout_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutSession.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Stamps `created_at` once and refreshes `updated_at` on every write.
    ///
    /// Values the caller already set on insert are kept, which lets a
    /// snapshot restore reproduce the original timestamps.
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.updated_at.is_not_set() {
                self.updated_at = Set(now);
            }
        } else {
            self.updated_at = Set(now);
        }
        Ok(self)
    }
}
