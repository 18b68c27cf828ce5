//! Exercise library entity model.
//!
//! Exercises are reference data. They are created by the asset importer
//! (or by the legacy upgrade), read by everyone and only removed when the
//! library is re-imported.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Difficulty stored when the source document does not name one.
pub const DEFAULT_DIFFICULTY: &str = "Intermediate";

/// Sea-ORM entity model representing one exercise library entry.
///
/// # Database Schema
///
/// | Column         | Type               | Description                              |
/// |----------------|--------------------|------------------------------------------|
/// | id             | INTEGER (PK)       | Surrogate id                             |
/// | title          | TEXT               | Display title, not unique                |
/// | description    | TEXT               | Form and visual notes                    |
/// | category       | TEXT               | Category directory with suffix stripped  |
/// | difficulty     | TEXT               | Beginner / Intermediate / Advanced ...   |
/// | instructions   | TEXT               | Rendered instructions section            |
/// | benefits       | TEXT               | Rendered benefits section                |
/// | muscles_worked | TEXT               | Rendered muscles section                 |
/// | variations     | TEXT               | Rendered variations section              |
/// | image_path     | TEXT NULL          | Public URL of the still image            |
/// | animation_path | TEXT NULL          | Public URL of the animation              |
/// | created_at     | TIMESTAMPTZ        | Set once on insert                       |
///
/// Titles are deliberately not unique: legacy libraries contain duplicates,
/// so rows are always addressed by `id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exercises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub difficulty: String,
    #[sea_orm(column_type = "Text")]
    pub instructions: String,
    #[sea_orm(column_type = "Text")]
    pub benefits: String,
    #[sea_orm(column_type = "Text")]
    pub muscles_worked: String,
    #[sea_orm(column_type = "Text")]
    pub variations: String,
    pub image_path: Option<String>,
    pub animation_path: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workout_exercise::Entity")]
    WorkoutExercise,
    #[sea_orm(has_many = "super::workout_set::Entity")]
    WorkoutSet,
}

impl Related<super::workout_exercise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutExercise.def()
    }
}

impl Related<super::workout_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutSet.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(Utc::now());
        }
        Ok(self)
    }
}
