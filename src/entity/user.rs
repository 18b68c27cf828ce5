//! User entity model.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Users own workout templates and workout sessions. The accountability
/// partner relation lives in [`super::accountability_partner`] and is
/// looked up symmetrically by [`crate::WorkoutStore::partners_of`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    /// Credential hash produced by the authentication layer. Never serialized.
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workout_template::Entity")]
    WorkoutTemplate,
    #[sea_orm(has_many = "super::workout_session::Entity")]
    WorkoutSession,
}

impl Related<super::workout_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutTemplate.def()
    }
}

impl Related<super::workout_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkoutSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
