//! Deprecated table shapes.
//!
//! These entities describe the schema used before workout templates and
//! sessions existed. Nothing writes to them any more; they are read once by
//! [`crate::upgrade::LegacyUpgrade`] and then either kept or dropped.
//! Every column is nullable because the old schema enforced nothing.
//!
//! The old schema kept the exercises embedded in a workout in a table named
//! `exercises`, which clashes with the current library table. Before
//! migrations run, [`crate::upgrade::detach_legacy_exercises`] renames it to
//! [`LEGACY_EXERCISES`].

/// Name the legacy embedded-exercise table lives under once detached.
pub const LEGACY_EXERCISES: &str = "legacy_exercises";

/// Table names that signal a legacy schema, in drop order (children first).
pub const LEGACY_TABLES: [&str; 4] = [
    LEGACY_EXERCISES,
    "workouts",
    "exercise_assets",
    "workout_assets",
];

/// Library entries of the old schema. Maps field for field onto `exercises`.
pub mod workout_asset {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "workout_assets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub title: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub category: Option<String>,
        pub difficulty: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub instructions: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub benefits: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub muscles_worked: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub variations: Option<String>,
        pub image_path: Option<String>,
        pub animation_path: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::exercise_asset::Entity")]
        ExerciseAsset,
    }

    impl Related<super::exercise_asset::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ExerciseAsset.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sub-exercises of a legacy asset. Backed up, never transformed.
pub mod exercise_asset {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "exercise_assets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub title: Option<String>,
        pub instructions: Option<String>,
        pub benefits: Option<String>,
        /// JSON array of image paths.
        pub image_paths: Option<String>,
        pub workout_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::workout_asset::Entity",
            from = "Column::WorkoutId",
            to = "super::workout_asset::Column::Id"
        )]
        WorkoutAsset,
    }

    impl Related<super::workout_asset::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::WorkoutAsset.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// A user's workout in the old schema, with its exercises in
/// [`legacy_exercise`]. Becomes a template, plus a session when completed.
pub mod workout {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "workouts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub title: Option<String>,
        pub description: Option<String>,
        pub date: Option<DateTime>,
        pub completed: Option<bool>,
        pub user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::legacy_exercise::Entity")]
        LegacyExercise,
    }

    impl Related<super::legacy_exercise::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::LegacyExercise.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// An exercise embedded in a legacy workout.
///
/// It names its library entry only by `title`; there is no reference to
/// `workout_assets`.
pub mod legacy_exercise {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "legacy_exercises")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub title: Option<String>,
        pub description: Option<String>,
        pub workout_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::workout::Entity",
            from = "Column::WorkoutId",
            to = "super::workout::Column::Id"
        )]
        Workout,
    }

    impl Related<super::workout::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Workout.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
